//! The declarative property-order schema (spec.md component F).
//!
//! A static, ordered list of `(element-name, sub-schema)` entries
//! describing every element of an EPCIS event whose position in the
//! pre-hash string matters. Anything a node carries that isn't named
//! here is a user extension (spec.md §4.E.2).
//!
//! Grounded on `epcis_event_hash_generator/__init__.py::PROP_ORDER` in
//! the original Python implementation; `paired` marks the repeated
//! item entries under `bizTransactionList`/`sourceList`/`destinationList`
//! whose siblings CBV 2.0 requires to stay in document order rather
//! than being lexicographically sorted (spec.md §4.E.1.d, §8 property 3).

/// One entry of the property-order schema.
pub struct SchemaEntry {
	pub name: &'static str,
	pub sub_schema: Option<&'static [SchemaEntry]>,
	/// True for `bizTransactionList`/`sourceList`/`destinationList`: their
	/// items are pair nodes and must not be lexicographically resorted.
	pub paired: bool,
}

const fn entry(name: &'static str, sub_schema: Option<&'static [SchemaEntry]>) -> SchemaEntry {
	SchemaEntry {
		name,
		sub_schema,
		paired: false,
	}
}

const fn paired_entry(name: &'static str, sub_schema: &'static [SchemaEntry]) -> SchemaEntry {
	SchemaEntry {
		name,
		sub_schema: Some(sub_schema),
		paired: true,
	}
}

const EPC_LIST: &[SchemaEntry] = &[entry("epc", None)];

const QUANTITY_ELEMENT: &[SchemaEntry] = &[
	entry("epcClass", None),
	entry("quantity", None),
	entry("uom", None),
];

const QUANTITY_LIST: &[SchemaEntry] = &[entry("quantityElement", Some(QUANTITY_ELEMENT))];

// Each *ITEM schema describes one pair node's two fields, in CBV 2.0's
// mandated attribute-then-value order; neither field is ever repeated,
// so sorting them is moot. The list-level entries below (BIZ_TRANSACTION_LIST
// etc.) mark the repeated item itself `paired`, which tells the
// serializer to keep successive items in document order instead of
// lexicographically resorting them (spec.md §4.E.d, §8 property 3).
const BIZ_TRANSACTION_ITEM: &[SchemaEntry] = &[entry("type", None), entry("bizTransaction", None)];
const SOURCE_ITEM: &[SchemaEntry] = &[entry("type", None), entry("source", None)];
const DESTINATION_ITEM: &[SchemaEntry] = &[entry("type", None), entry("destination", None)];

const BIZ_TRANSACTION_LIST: &[SchemaEntry] = &[paired_entry("bizTransaction", BIZ_TRANSACTION_ITEM)];
const SOURCE_LIST: &[SchemaEntry] = &[paired_entry("source", SOURCE_ITEM)];
const DESTINATION_LIST: &[SchemaEntry] = &[paired_entry("destination", DESTINATION_ITEM)];

const SENSOR_METADATA: &[SchemaEntry] = &[
	entry("time", None),
	entry("startTime", None),
	entry("endTime", None),
	entry("deviceID", None),
	entry("deviceMetadata", None),
	entry("rawData", None),
	entry("dataProcessingMethod", None),
	entry("bizRules", None),
];

const SENSOR_REPORT: &[SchemaEntry] = &[
	entry("type", None),
	entry("exception", None),
	entry("deviceID", None),
	entry("deviceMetadata", None),
	entry("rawData", None),
	entry("dataProcessingMethod", None),
	entry("time", None),
	entry("microorganism", None),
	entry("chemicalSubstance", None),
	entry("value", None),
	entry("component", None),
	entry("stringValue", None),
	entry("booleanValue", None),
	entry("hexBinaryValue", None),
	entry("uriValue", None),
	entry("minValue", None),
	entry("maxValue", None),
	entry("meanValue", None),
	entry("sDev", None),
	entry("percRank", None),
	entry("percValue", None),
	entry("uom", None),
	entry("coordinateReferenceSystem", None),
];

const SENSOR_ELEMENT: &[SchemaEntry] = &[
	entry("sensorMetadata", Some(SENSOR_METADATA)),
	entry("sensorReport", Some(SENSOR_REPORT)),
];

const SENSOR_ELEMENT_LIST: &[SchemaEntry] = &[entry("sensorElement", Some(SENSOR_ELEMENT))];

const ID_ONLY: &[SchemaEntry] = &[entry("id", None)];

const PERSISTENT_DISPOSITION: &[SchemaEntry] = &[entry("set", None), entry("unset", None)];

/// The ordered list of event-level elements, in the order their
/// contributions are concatenated into the pre-hash string.
pub const PROP_ORDER: &[SchemaEntry] = &[
	entry("eventTime", None),
	entry("eventTimeZoneOffset", None),
	entry("certificationInfo", None),
	entry("parentID", None),
	entry("epcList", Some(EPC_LIST)),
	entry("inputEPCList", Some(EPC_LIST)),
	entry("childEPCs", Some(EPC_LIST)),
	entry("quantityList", Some(QUANTITY_LIST)),
	entry("childQuantityList", Some(QUANTITY_LIST)),
	entry("inputQuantityList", Some(QUANTITY_LIST)),
	entry("outputEPCList", Some(EPC_LIST)),
	entry("outputQuantityList", Some(QUANTITY_LIST)),
	entry("action", None),
	entry("transformationID", None),
	entry("bizStep", None),
	entry("disposition", None),
	entry("persistentDisposition", Some(PERSISTENT_DISPOSITION)),
	entry("readPoint", Some(ID_ONLY)),
	entry("bizLocation", Some(ID_ONLY)),
	entry("bizTransactionList", Some(BIZ_TRANSACTION_LIST)),
	entry("sourceList", Some(SOURCE_LIST)),
	entry("destinationList", Some(DESTINATION_LIST)),
	entry("sensorElementList", Some(SENSOR_ELEMENT_LIST)),
];

/// Elements dropped before hashing regardless of schema position
/// (spec.md §4.E.3). `recordTime`/`eventID` are ignored at every level;
/// `type`/`errorDeclaration` only at the top level of an event.
pub const IGNORE_ALWAYS: &[&str] = &["recordTime", "eventID"];
pub const IGNORE_TOP_LEVEL_ONLY: &[&str] = &["type", "errorDeclaration"];

/// List names whose items are pair nodes: sibling order is significant
/// and they must never be lexicographically resorted, even when they
/// show up as unrecognized/generic extension children.
pub const PAIRED_LIST_NAMES: &[&str] = &["bizTransaction", "source", "destination"];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prop_order_lists_bizstep_before_disposition() {
		let names: Vec<&str> = PROP_ORDER.iter().map(|e| e.name).collect();
		let biz = names.iter().position(|n| *n == "bizStep").unwrap();
		let disp = names.iter().position(|n| *n == "disposition").unwrap();
		assert!(biz < disp);
	}

	#[test]
	fn paired_list_items_are_marked_unsortable() {
		for list_name in ["bizTransactionList", "sourceList", "destinationList"] {
			let list_entry = PROP_ORDER.iter().find(|e| e.name == list_name).unwrap();
			let item_entry = &list_entry.sub_schema.unwrap()[0];
			assert!(item_entry.paired, "{} items should be paired", list_name);
		}
	}
}
