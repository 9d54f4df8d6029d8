//! Structural reconciler (spec.md §4.D).
//!
//! Rewrites a JSON-derived event tree, depth-first, until it matches
//! the shape the XML adapter would have produced for the same event.
//! Grounded on `json_xml_model_mismatch_correction.py`'s
//! `deep_structure_correction`, reworked around owned [`Node`] trees
//! instead of Python tuples.

use std::collections::HashMap;

use crate::canon::tree::Node;

/// Individual-node renames applied after recursion (spec.md §4.D.4).
/// `quantity` is handled separately since its rename is conditional on
/// having children.
const NODE_RENAMES: &[(&str, &str)] = &[
	("inputEPC", "epc"),
	("outputEPC", "epc"),
	("inputQuantity", "quantityElement"),
	("outputQuantity", "quantityElement"),
	("childQuantity", "quantityElement"),
];

/// Reconciles one JSON-derived event node in place into XML shape.
pub fn reconcile_event(event: &mut Node) {
	reconcile_node(event);
}

fn reconcile_node(node: &mut Node) {
	group_list_children(&mut node.children);
	reshape_child_epcs(&mut node.children);

	for child in node.children.iter_mut() {
		promote_identifier_child(child);
	}

	for child in node.children.iter_mut() {
		reconcile_node(child);
	}

	for child in node.children.iter_mut() {
		rename_node(child);
	}
}

/// Rule 1+2: every child whose name ends in `List` is a JSON array that
/// was flattened to repeated same-named siblings by the JSON adapter.
/// Groups them under one container keyed by that name, with each item
/// renamed to the name minus its `List` suffix. This also produces the
/// pair-node shape for `bizTransactionList`/`sourceList`/`destinationList`
/// items for free: their JSON form already nests `type` alongside the
/// value field, so stripping `List` from the item's borrowed name is
/// all that's needed to match the XML adapter's pair nodes.
fn group_list_children(children: &mut Vec<Node>) {
	let mut order: Vec<String> = Vec::new();
	let mut groups: HashMap<String, Vec<Node>> = HashMap::new();

	let mut i = 0;
	while i < children.len() {
		if children[i].name.ends_with("List") {
			let mut item = children.remove(i);
			let group_name = item.name.clone();
			item.name = group_name.strip_suffix("List").unwrap_or(&group_name).to_string();
			if !groups.contains_key(&group_name) {
				order.push(group_name.clone());
			}
			groups.entry(group_name).or_default().push(item);
		} else {
			i += 1;
		}
	}

	for group_name in order {
		if let Some(items) = groups.remove(&group_name) {
			children.push(Node::branch(group_name, items));
		}
	}
}

/// Rule 5: `childEPCs` doesn't end in `List`, so rule 1 doesn't catch
/// it; its repeated leaf siblings are collapsed into one container
/// with `epc` children.
fn reshape_child_epcs(children: &mut Vec<Node>) {
	let mut epcs = Vec::new();
	let mut i = 0;
	while i < children.len() {
		if children[i].name == "childEPCs" {
			let child = children.remove(i);
			epcs.push(Node::leaf("epc", child.value));
		} else {
			i += 1;
		}
	}
	if !epcs.is_empty() {
		children.push(Node::branch("childEPCs", epcs));
	}
}

/// Rule 3: `readPoint`/`bizLocation` carry the identifier as a bare
/// value in JSON; the XML shape nests it under a synthesized `id`.
fn promote_identifier_child(node: &mut Node) {
	if (node.name == "readPoint" || node.name == "bizLocation") && node.children.is_empty() && !node.value.is_empty() {
		let id_value = std::mem::take(&mut node.value);
		node.children.push(Node::leaf("id", id_value));
	}
}

/// Rule 4: fixes up the inconsistent/omitted child names JSON uses for
/// list items relative to XML.
fn rename_node(node: &mut Node) {
	if let Some((_, to)) = NODE_RENAMES.iter().find(|(from, _)| *from == node.name) {
		node.name = (*to).to_string();
		return;
	}
	if node.name == "quantity" && !node.children.is_empty() {
		node.name = "quantityElement".to_string();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn epc_list_item(name: &str, value: &str) -> Node {
		Node::leaf(name, value)
	}

	#[test]
	fn epc_list_items_grouped_and_renamed() {
		let mut event = Node::branch(
			"ObjectEvent",
			vec![
				epc_list_item("epcList", "urn:epc:id:sscc:1"),
				epc_list_item("epcList", "urn:epc:id:sscc:2"),
			],
		);
		reconcile_event(&mut event);
		let list = event.children.iter().find(|c| c.name == "epcList").unwrap();
		assert_eq!(list.children.len(), 2);
		assert!(list.children.iter().all(|c| c.name == "epc"));
	}

	#[test]
	fn input_epc_list_items_renamed_to_epc() {
		let mut event = Node::branch("TransformationEvent", vec![epc_list_item("inputEPCList", "urn:epc:id:sscc:1")]);
		reconcile_event(&mut event);
		let list = event.children.iter().find(|c| c.name == "inputEPCList").unwrap();
		assert_eq!(list.children[0].name, "epc");
	}

	#[test]
	fn biz_transaction_list_items_keep_pair_shape() {
		let item = Node::branch(
			"bizTransactionList",
			vec![Node::leaf("type", "urn:epcglobal:cbv:btt:po"), Node::leaf("bizTransaction", "http://example.com/po/1")],
		);
		let mut event = Node::branch("ObjectEvent", vec![item]);
		reconcile_event(&mut event);
		let list = event.children.iter().find(|c| c.name == "bizTransactionList").unwrap();
		let pair = &list.children[0];
		assert_eq!(pair.name, "bizTransaction");
		assert!(pair.children.iter().any(|c| c.name == "type"));
		assert!(pair.children.iter().any(|c| c.name == "bizTransaction"));
	}

	#[test]
	fn read_point_bare_value_gets_synthesized_id() {
		let mut event = Node::branch("ObjectEvent", vec![Node::leaf("readPoint", "urn:epc:id:sgln:1")]);
		reconcile_event(&mut event);
		let read_point = event.children.iter().find(|c| c.name == "readPoint").unwrap();
		assert_eq!(read_point.children[0].name, "id");
		assert_eq!(read_point.children[0].value, "urn:epc:id:sgln:1");
	}

	#[test]
	fn quantity_list_items_renamed_to_quantity_element() {
		let item = Node::branch(
			"quantityList",
			vec![Node::leaf("epcClass", "urn:epc:class:1"), Node::leaf("quantity", "200")],
		);
		let mut event = Node::branch("ObjectEvent", vec![item]);
		reconcile_event(&mut event);
		let list = event.children.iter().find(|c| c.name == "quantityList").unwrap();
		assert_eq!(list.children[0].name, "quantityElement");
	}

	#[test]
	fn multiple_child_epcs_collapse_into_one_container() {
		let mut event = Node::branch(
			"AggregationEvent",
			vec![Node::leaf("childEPCs", "urn:epc:id:sscc:1"), Node::leaf("childEPCs", "urn:epc:id:sscc:2")],
		);
		reconcile_event(&mut event);
		let list = event.children.iter().find(|c| c.name == "childEPCs").unwrap();
		assert_eq!(list.children.len(), 2);
		assert!(list.children.iter().all(|c| c.name == "epc"));
	}
}
