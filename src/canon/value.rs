//! Leaf value canonicalizer (spec.md §4.B).
//!
//! Applied to every leaf value during serialization, except along the
//! timestamp path, which is exclusive: an element whose name contains
//! "time" (case-insensitive) and not "offset" is rewritten as a
//! timestamp instead of going through CBV/numeric/identifier rewriting.

use chrono::{DateTime, TimeZone, Utc};

use crate::canon::identifier;

const BIZSTEP_PREFIX: &str = "https://ref.gs1.org/cbv/BizStep-";
const DISP_PREFIX: &str = "https://ref.gs1.org/cbv/Disp-";
const BTT_PREFIX: &str = "https://ref.gs1.org/cbv/BTT-";
const SDT_PREFIX: &str = "https://ref.gs1.org/cbv/SDT-";
const ER_PREFIX: &str = "https://ref.gs1.org/cbv/ER-";

const CBV_URN_PREFIXES: &[(&str, &str)] = &[
	("urn:epcglobal:cbv:bizstep:", BIZSTEP_PREFIX),
	("urn:epcglobal:cbv:disp:", DISP_PREFIX),
	("urn:epcglobal:cbv:btt:", BTT_PREFIX),
	("urn:epcglobal:cbv:sdt:", SDT_PREFIX),
	("urn:epcglobal:cbv:er:", ER_PREFIX),
];

/// Returns the CBV vocabulary base URL a bare (colon-free) JSON-LD term
/// should be prefixed with, given the name of its enclosing element
/// (`parent_name`) and its own field name (`field_name`) — the
/// `@vocab`-style shorthand JSON-LD convention where `bizStep: "shipping"`
/// means `bizStep: "https://ref.gs1.org/cbv/BizStep-shipping"` (spec.md
/// §4.C, "JSON-LD adapter"). `None` for fields that never carry a CBV
/// term.
pub fn cbv_vocab_prefix_for_field(parent_name: &str, field_name: &str) -> Option<&'static str> {
	match field_name {
		"bizStep" => Some(BIZSTEP_PREFIX),
		"disposition" => Some(DISP_PREFIX),
		"type" if parent_name == "bizTransactionList" => Some(BTT_PREFIX),
		"type" if parent_name == "sourceList" || parent_name == "destinationList" => Some(SDT_PREFIX),
		"set" | "unset" if parent_name == "persistentDisposition" => Some(DISP_PREFIX),
		"reason" if parent_name == "errorDeclaration" => Some(ER_PREFIX),
		_ => None,
	}
}

/// True when `element_name` should take the timestamp path rather than
/// the CBV/numeric/identifier path (spec.md §4.B.4).
pub fn is_timestamp_element(element_name: &str) -> bool {
	let lower = element_name.to_ascii_lowercase();
	lower.contains("time") && !lower.contains("offset")
}

/// Rewrites old-style CBV URNs to their web-vocabulary URL equivalents.
fn rewrite_cbv_urn(text: &str) -> String {
	let mut out = text.to_string();
	for (urn_prefix, url_prefix) in CBV_URN_PREFIXES {
		if out.starts_with(urn_prefix) {
			out = format!("{}{}", url_prefix, &out[urn_prefix.len()..]);
			break;
		}
	}
	out
}

/// Strips leading zeros/plus signs and trailing `.0` from numeric
/// literals; non-numeric text passes through unchanged.
fn canonicalize_numeric(text: &str) -> String {
	match text.trim().parse::<f64>() {
		Ok(n) if n.is_finite() => {
			if n.fract() == 0.0 && n.abs() < 1e15 {
				format!("{}", n as i64)
			} else {
				format!("{}", n)
			}
		}
		_ => text.to_string(),
	}
}

/// Runs a non-timestamp leaf value through CBV rewrite, numeric
/// stripping, then identifier normalization, in that order (spec.md
/// §4.B, "Order of application matters").
pub fn canonicalize_value(text: &str) -> String {
	let rewritten = rewrite_cbv_urn(text);
	let numeric = canonicalize_numeric(&rewritten);
	identifier::normalize(&numeric).unwrap_or(numeric)
}

/// Rounds to millisecond precision, converts to UTC, and emits
/// `YYYY-MM-DDTHH:MM:SS.sssZ`. Falls back to the original text,
/// unchanged, when it cannot be parsed as an ISO 8601 timestamp
/// (spec.md §7, `UnparseableTimestamp`: passthrough + warn).
pub fn canonicalize_timestamp(text: &str) -> String {
	let trimmed = text.trim();
	match DateTime::parse_from_rfc3339(trimmed) {
		Ok(dt) => {
			let utc = round_to_millis(dt.with_timezone(&Utc));
			utc.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
		}
		Err(_) => {
			tracing::warn!(timestamp = trimmed, "timestamp-labelled value does not match ISO 8601; passing through");
			text.to_string()
		}
	}
}

fn round_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
	let secs = dt.timestamp();
	let nanos = i64::from(dt.timestamp_subsec_nanos());
	let millis_from_nanos = (nanos + 500_000) / 1_000_000;
	let total_millis = secs * 1000 + millis_from_nanos;
	Utc.timestamp_millis_opt(total_millis).single().unwrap_or(dt)
}

/// Canonicalizes one leaf value given the name of its enclosing
/// element, dispatching to the timestamp or the CBV/numeric/identifier
/// path as appropriate.
pub fn canonicalize_leaf(element_name: &str, value: &str) -> String {
	if is_timestamp_element(element_name) {
		canonicalize_timestamp(value)
	} else {
		canonicalize_value(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cbv_urn_rewritten_to_web_vocabulary() {
		let out = canonicalize_value("urn:epcglobal:cbv:bizstep:shipping");
		assert_eq!(out, "https://ref.gs1.org/cbv/BizStep-shipping");
	}

	#[test]
	fn numeric_literals_collapse_to_same_token() {
		for s in ["3", "+3", "003", "3.0"] {
			assert_eq!(canonicalize_numeric(s), "3");
		}
	}

	#[test]
	fn non_numeric_text_is_untouched() {
		assert_eq!(canonicalize_numeric("OBSERVE"), "OBSERVE");
	}

	#[test]
	fn identifier_normalization_applied_last() {
		let out = canonicalize_value("urn:epc:id:sscc:0614141.1234567890");
		assert!(out.starts_with("https://id.gs1.org/00/"));
	}

	#[test]
	fn timestamp_equivalence_across_offsets() {
		let a = canonicalize_timestamp("2020-03-04T11:00:30.000+01:00");
		let b = canonicalize_timestamp("2020-03-04T10:00:30.000Z");
		let c = canonicalize_timestamp("2020-03-04T10:00:30Z");
		assert_eq!(a, "2020-03-04T10:00:30.000Z");
		assert_eq!(a, b);
		assert_eq!(b, c);
	}

	#[test]
	fn unparseable_timestamp_passes_through() {
		assert_eq!(canonicalize_timestamp("not-a-date"), "not-a-date");
	}

	#[test]
	fn element_name_matching() {
		assert!(is_timestamp_element("eventTime"));
		assert!(is_timestamp_element("startTime"));
		assert!(!is_timestamp_element("eventTimeZoneOffset"));
		assert!(!is_timestamp_element("action"));
	}

	#[test]
	fn cbv_vocab_prefix_covers_known_fields() {
		assert_eq!(cbv_vocab_prefix_for_field("ObjectEvent", "bizStep"), Some(BIZSTEP_PREFIX));
		assert_eq!(cbv_vocab_prefix_for_field("ObjectEvent", "disposition"), Some(DISP_PREFIX));
		assert_eq!(cbv_vocab_prefix_for_field("bizTransactionList", "type"), Some(BTT_PREFIX));
		assert_eq!(cbv_vocab_prefix_for_field("sourceList", "type"), Some(SDT_PREFIX));
		assert_eq!(cbv_vocab_prefix_for_field("destinationList", "type"), Some(SDT_PREFIX));
		assert_eq!(cbv_vocab_prefix_for_field("persistentDisposition", "set"), Some(DISP_PREFIX));
		assert_eq!(cbv_vocab_prefix_for_field("persistentDisposition", "unset"), Some(DISP_PREFIX));
		assert_eq!(cbv_vocab_prefix_for_field("errorDeclaration", "reason"), Some(ER_PREFIX));
	}

	#[test]
	fn cbv_vocab_prefix_ignores_unrelated_fields() {
		assert_eq!(cbv_vocab_prefix_for_field("ObjectEvent", "action"), None);
		assert_eq!(cbv_vocab_prefix_for_field("bizTransactionList", "bizTransaction"), None);
		assert_eq!(cbv_vocab_prefix_for_field("ObjectEvent", "type"), None);
	}
}
