//! Canonical serializer (spec.md §4.E).
//!
//! Walks a reconciled event tree guided by [`PROP_ORDER`], draining
//! matched children from the tree as it goes, then serializes whatever
//! is left over as generic user-extension content. The walk is
//! destructive: a caller that needs the tree afterward must clone it
//! first (spec.md §5, "Shared resources").

use crate::canon::schema::{SchemaEntry, IGNORE_ALWAYS, IGNORE_TOP_LEVEL_ONLY, PROP_ORDER};
use crate::canon::tree::Node;
use crate::canon::value;

/// Builds the full pre-hash string for one event:
/// `"eventType=" + name + JOIN + serialize(schema) + JOIN + generic(remainder)`.
pub fn serialize_event(event: &mut Node, join_by: &str) -> String {
	strip_ignored(&mut event.children, IGNORE_ALWAYS);
	strip_ignored(&mut event.children, IGNORE_TOP_LEVEL_ONLY);

	let schema_part = serialize_schema(&mut event.children, PROP_ORDER, join_by);
	let generic_part = serialize_generic(&mut event.children, join_by);

	format!(
		"eventType={}{}{}{}{}",
		event.name, join_by, schema_part, join_by, generic_part
	)
}

fn strip_ignored(children: &mut Vec<Node>, names: &[&str]) {
	children.retain(|c| !names.contains(&c.name.as_str()));
}

/// Step 1 of spec.md §4.E: walk `schema` in declared order, draining
/// matched children out of `children` and building their pieces.
fn serialize_schema(children: &mut Vec<Node>, schema: &[SchemaEntry], join_by: &str) -> String {
	let mut pre_hash = String::new();

	for entry in schema {
		let mut matched = Vec::new();
		let mut i = 0;
		while i < children.len() {
			if children[i].name == entry.name {
				matched.push(children.remove(i));
			} else {
				i += 1;
			}
		}

		if matched.is_empty() {
			continue;
		}

		let mut pieces: Vec<String> = matched
			.iter_mut()
			.map(|child| build_piece(child, entry, join_by))
			.filter(|p| !p.is_empty())
			.collect();

		if pieces.is_empty() {
			continue;
		}

		// Pieces from a `paired` entry (bizTransaction/source/destination
		// items) keep document order; every other repeated sibling sorts
		// lexicographically, which is the order-insensitivity rule for
		// ordinary lists (epcList, quantityElement, ...).
		if !entry.paired {
			pieces.sort();
		}

		let joined = if pre_hash.is_empty() {
			pieces.join(join_by)
		} else {
			let mut with_prefix = vec![pre_hash.clone()];
			with_prefix.extend(pieces);
			with_prefix.join(join_by)
		};
		pre_hash = joined;
	}

	pre_hash
}

fn build_piece(child: &mut Node, entry: &SchemaEntry, join_by: &str) -> String {
	let schema_text = match entry.sub_schema {
		Some(sub_schema) => serialize_schema(&mut child.children, sub_schema, join_by),
		None => String::new(),
	};
	// Anything `serialize_schema` didn't consume (a vendor element nested
	// inside readPoint/bizLocation/quantityElement/sensorReport, say) is a
	// user extension at this sub-level and still has to contribute to the
	// hash, the same as it would at the event's own top level.
	let extension_text = serialize_generic(&mut child.children, join_by);
	let grand_child_text = match (schema_text.is_empty(), extension_text.is_empty()) {
		(true, true) => String::new(),
		(false, true) => schema_text,
		(true, false) => extension_text,
		(false, false) => format!("{}{}{}", schema_text, join_by, extension_text),
	};

	let mut text = String::new();
	if !child.value.is_empty() {
		let trimmed = child.value.trim();
		let v = value::canonicalize_leaf(&child.name, trimmed);
		if !v.is_empty() {
			text = format!("={}", v);
		}
	}

	if text.is_empty() && grand_child_text.is_empty() {
		String::new()
	} else {
		format!("{}{}{}", child.name, text, grand_child_text)
	}
}

/// Step 2 of spec.md §4.E: whatever is left after schema processing is
/// a user extension. Serialized generically, with same-name siblings
/// sorted lexicographically (the bizTransaction/source/destination
/// exception does not arise here — those are always schema-known).
fn serialize_generic(children: &mut [Node], join_by: &str) -> String {
	let mut pieces: Vec<String> = children
		.iter_mut()
		.map(|child| {
			let mut text = String::new();
			if !child.value.is_empty() {
				let trimmed = child.value.trim();
				let v = value::canonicalize_leaf(&child.name, trimmed);
				if !v.is_empty() {
					text = format!("={}", v);
				}
			}
			let descendants = serialize_generic(&mut child.children, join_by);
			format!("{}{}{}", child.name, text, descendants)
		})
		.collect();

	pieces.sort();
	pieces.join(join_by)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sibling_epc_order_does_not_affect_hash() {
		let epc_list = |order: [&str; 2]| Node::branch(
			"epcList",
			order
				.iter()
				.map(|v| Node::leaf("epc", v.to_string()))
				.collect(),
		);

		let mut a = Node::branch(
			"ObjectEvent",
			vec![epc_list(["urn:epc:id:sscc:0614141.1234567890", "urn:epc:id:sscc:0614141.0987654321"])],
		);
		let mut b = Node::branch(
			"ObjectEvent",
			vec![epc_list(["urn:epc:id:sscc:0614141.0987654321", "urn:epc:id:sscc:0614141.1234567890"])],
		);

		assert_eq!(serialize_event(&mut a, ""), serialize_event(&mut b, ""));
	}

	#[test]
	fn ignore_set_does_not_affect_hash() {
		let mut with_record_time = Node::branch(
			"ObjectEvent",
			vec![Node::leaf("action", "OBSERVE"), Node::leaf("recordTime", "2020-01-01T00:00:00Z")],
		);
		let mut without = Node::branch("ObjectEvent", vec![Node::leaf("action", "OBSERVE")]);

		assert_eq!(
			serialize_event(&mut with_record_time, ""),
			serialize_event(&mut without, "")
		);
	}

	#[test]
	fn paired_items_preserve_document_order() {
		fn transaction(t: &str, v: &str) -> Node {
			Node::branch(
				"bizTransaction",
				vec![Node::leaf("type", t), Node::leaf("bizTransaction", v)],
			)
		}

		let mut forward = Node::branch(
			"ObjectEvent",
			vec![Node::branch(
				"bizTransactionList",
				vec![transaction("po", "http://a"), transaction("desadv", "http://b")],
			)],
		);
		let mut reversed = Node::branch(
			"ObjectEvent",
			vec![Node::branch(
				"bizTransactionList",
				vec![transaction("desadv", "http://b"), transaction("po", "http://a")],
			)],
		);

		assert_ne!(serialize_event(&mut forward, ""), serialize_event(&mut reversed, ""));
	}

	#[test]
	fn extension_nested_inside_schema_container_is_hashed() {
		let mut with_ext = Node::branch(
			"ObjectEvent",
			vec![Node::branch(
				"readPoint",
				vec![
					Node::leaf("id", "urn:epc:id:sgln:4012345.00011.987"),
					Node::leaf("{http://example.com/ext}vendorField", "abc"),
				],
			)],
		);
		let mut without_ext = Node::branch(
			"ObjectEvent",
			vec![Node::branch("readPoint", vec![Node::leaf("id", "urn:epc:id:sgln:4012345.00011.987")])],
		);

		let with_hash = serialize_event(&mut with_ext, "");
		let without_hash = serialize_event(&mut without_ext, "");
		assert_ne!(with_hash, without_hash);
		assert!(with_hash.contains("vendorField"));
	}

	#[test]
	fn extension_sibling_order_does_not_affect_hash() {
		let mut a = Node::branch(
			"ObjectEvent",
			vec![
				Node::leaf("{http://example.com/ext}foo", "1"),
				Node::leaf("{http://example.com/ext}bar", "2"),
			],
		);
		let mut b = Node::branch(
			"ObjectEvent",
			vec![
				Node::leaf("{http://example.com/ext}bar", "2"),
				Node::leaf("{http://example.com/ext}foo", "1"),
			],
		);

		assert_eq!(serialize_event(&mut a, ""), serialize_event(&mut b, ""));
	}
}
