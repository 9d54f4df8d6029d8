//! Top-level orchestration (spec.md, tying components A–H together).
//!
//! Grounded on `hash_generator.py`'s `compute_prehash_from_*`/
//! `epcis_hash_from_*` functions: read → (reconcile if JSON) →
//! serialize → hash, one event at a time, with an unparseable event
//! logged and skipped rather than aborting the whole document.

use std::path::Path;

use crate::canon::context_loader::ContextLoader;
use crate::canon::error::CanonError;
use crate::canon::hash::{calculate_hash, HashAlgorithm};
use crate::canon::json_adapter;
use crate::canon::reconcile::reconcile_event;
use crate::canon::serializer::serialize_event;
use crate::canon::tree::Node;
use crate::canon::xml_adapter;

/// Format hint for [`compute_prehash_from_file`]/[`compute_prehash_from_str`];
/// `Guess` infers from the file suffix (spec.md §6, `-e/--enforce`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
	Xml,
	Json,
	Guess,
}

fn guess_format(path: &Path) -> Option<DocumentFormat> {
	let lower = path.to_string_lossy().to_ascii_lowercase();
	if lower.ends_with(".xml") {
		Some(DocumentFormat::Xml)
	} else if lower.ends_with(".json") || lower.ends_with(".jsonld") {
		Some(DocumentFormat::Json)
	} else {
		None
	}
}

/// Parses `xml` and returns each event's pre-hash string, in document
/// order, joined internally with `join_by`.
pub fn compute_prehash_from_xml_str(xml: &str, join_by: &str) -> Result<Vec<String>, CanonError> {
	let events = xml_adapter::parse_xml_events(xml)?;
	Ok(prehash_strings(events, join_by))
}

/// As [`compute_prehash_from_xml_str`], for a JSON-LD document. Runs
/// the structural reconciler on every event before serialization.
pub async fn compute_prehash_from_json_str(
	json: &str,
	loader: &impl ContextLoader,
	join_by: &str,
) -> Result<Vec<String>, CanonError> {
	let mut events = json_adapter::parse_json_events_with_loader(json, loader).await?;
	for event in events.iter_mut() {
		reconcile_event(event);
	}
	Ok(prehash_strings(events, join_by))
}

/// Reads an EPCIS document from `path`, dispatching on `format`
/// (inferring from the file suffix when `format` is [`DocumentFormat::Guess`]).
pub async fn compute_prehash_from_file(
	path: &Path,
	format: DocumentFormat,
	loader: &impl ContextLoader,
	join_by: &str,
) -> Result<Vec<String>, CanonError> {
	let resolved = match format {
		DocumentFormat::Guess => guess_format(path)
			.ok_or_else(|| CanonError::UnparseableDocument(format!("cannot infer format from filename '{}'", path.display())))?,
		other => other,
	};

	let contents = std::fs::read_to_string(path)
		.map_err(|e| CanonError::UnparseableDocument(format!("reading {}: {}", path.display(), e)))?;

	match resolved {
		DocumentFormat::Xml => compute_prehash_from_xml_str(&contents, join_by),
		DocumentFormat::Json => compute_prehash_from_json_str(&contents, loader, join_by).await,
		DocumentFormat::Guess => unreachable!("resolved above"),
	}
}

fn prehash_strings(mut events: Vec<Node>, join_by: &str) -> Vec<String> {
	let total = events.len();
	tracing::info!(events = total, "computing pre-hash strings");
	events
		.iter_mut()
		.enumerate()
		.map(|(index, event)| {
			tracing::debug!(index, event = event.name.as_str(), "serializing event");
			serialize_event(event, join_by)
		})
		.collect()
}

/// Computes the final `ni://…` hash for each event in `xml`.
pub fn epcis_hash_from_xml(xml: &str, algorithm: HashAlgorithm, join_by: &str) -> Result<Vec<String>, CanonError> {
	let prehashes = compute_prehash_from_xml_str(xml, join_by)?;
	Ok(prehashes.iter().map(|p| calculate_hash(p, algorithm)).collect())
}

/// Computes the final `ni://…` hash for each event in `json`.
pub async fn epcis_hash_from_json(
	json: &str,
	loader: &impl ContextLoader,
	algorithm: HashAlgorithm,
	join_by: &str,
) -> Result<Vec<String>, CanonError> {
	let prehashes = compute_prehash_from_json_str(json, loader, join_by).await?;
	Ok(prehashes.iter().map(|p| calculate_hash(p, algorithm)).collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::canon::context_loader::BundledContextLoader;

	#[test]
	fn xml_pipeline_produces_one_prehash_per_event() {
		let xml = r#"<EPCISDocument><EPCISBody><EventList>
			<ObjectEvent>
				<eventTime>2020-03-04T10:00:30Z</eventTime>
				<eventTimeZoneOffset>+00:00</eventTimeZoneOffset>
				<epcList><epc>urn:epc:id:sscc:0614141.1234567890</epc></epcList>
				<action>OBSERVE</action>
				<bizStep>urn:epcglobal:cbv:bizstep:shipping</bizStep>
			</ObjectEvent>
			<AggregationEvent><action>ADD</action></AggregationEvent>
		</EventList></EPCISBody></EPCISDocument>"#;
		let prehashes = compute_prehash_from_xml_str(xml, "").unwrap();
		assert_eq!(prehashes.len(), 2);
		assert!(prehashes[0].starts_with("eventType=ObjectEvent"));
		assert!(prehashes[0].contains("https://ref.gs1.org/cbv/BizStep-shipping"));
	}

	#[tokio::test]
	async fn json_pipeline_matches_xml_pipeline_for_equivalent_event() {
		let xml = r#"<EPCISDocument><EPCISBody><EventList><ObjectEvent>
			<eventTime>2020-03-04T10:00:30Z</eventTime>
			<eventTimeZoneOffset>+00:00</eventTimeZoneOffset>
			<epcList><epc>urn:epc:id:sscc:0614141.1234567890</epc></epcList>
			<action>OBSERVE</action>
		</ObjectEvent></EventList></EPCISBody></EPCISDocument>"#;
		let json = r#"{
			"epcisBody": { "eventList": [
				{ "type": "ObjectEvent",
				  "eventTime": "2020-03-04T10:00:30Z",
				  "eventTimeZoneOffset": "+00:00",
				  "epcList": ["urn:epc:id:sscc:0614141.1234567890"],
				  "action": "OBSERVE" }
			]}
		}"#;
		let loader = BundledContextLoader::new();
		let from_xml = compute_prehash_from_xml_str(xml, "").unwrap();
		let from_json = compute_prehash_from_json_str(json, &loader, "").await.unwrap();
		assert_eq!(from_xml, from_json);
	}

	#[test]
	fn epcis_hash_from_xml_emits_ni_uris() {
		let xml = r#"<EPCISDocument><EPCISBody><EventList><ObjectEvent>
			<action>OBSERVE</action>
		</ObjectEvent></EventList></EPCISBody></EPCISDocument>"#;
		let hashes = epcis_hash_from_xml(xml, HashAlgorithm::Sha256, "").unwrap();
		assert_eq!(hashes.len(), 1);
		assert!(hashes[0].starts_with("ni:///sha-256;"));
	}

	#[tokio::test]
	async fn compute_prehash_from_file_guesses_format_from_suffix() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("event.xml");
		std::fs::write(
			&path,
			r#"<EPCISDocument><EPCISBody><EventList><ObjectEvent>
				<action>OBSERVE</action>
			</ObjectEvent></EventList></EPCISBody></EPCISDocument>"#,
		)
		.unwrap();

		let loader = BundledContextLoader::new();
		let prehashes = compute_prehash_from_file(&path, DocumentFormat::Guess, &loader, "").await.unwrap();
		assert_eq!(prehashes.len(), 1);
	}

	#[tokio::test]
	async fn compute_prehash_from_file_rejects_unknown_suffix() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("event.txt");
		std::fs::write(&path, "not an epcis document").unwrap();

		let loader = BundledContextLoader::new();
		let err = compute_prehash_from_file(&path, DocumentFormat::Guess, &loader, "").await.unwrap_err();
		assert!(matches!(err, CanonError::UnparseableDocument(_)));
	}
}
