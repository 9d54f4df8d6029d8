//! JSON-LD input adapter (spec.md §4.C).
//!
//! A minimal JSON-LD expansion: rather than running a full expansion
//! algorithm, it builds a flat term map from `@context` (and any
//! `@xmlns:` declarations found inline in the body, mirroring
//! `json_to_py.py`'s `_namespaces` dictionary) and uses it for two
//! narrow substitutions — prefixed keys (`cbv:foo` → `{iri}foo`) and
//! bare-string CBV/vocabulary shorthand values (`"shipping"` →
//! `https://ref.gs1.org/cbv/BizStep-shipping`) — rather than expanding
//! every node into full IRIs. This is sufficient for canonicalization,
//! whose only use of the context is recognizing those two shorthand
//! forms (spec.md §4.C, "JSON-LD adapter").
//!
//! Bare-string shorthand is resolved two ways, in order: an explicit
//! per-value alias in `@context` (`{"shipping": "https://…"}`) wins if
//! present; otherwise a bare value in a known CBV-bearing field
//! (`bizStep`, `disposition`, a `bizTransactionList`/`sourceList`/
//! `destinationList` item's `type`, `persistentDisposition`'s `set`/
//! `unset`, `errorDeclaration`'s `reason`) is expanded via the
//! `@vocab`-style field→prefix mapping in [`crate::canon::value`] — the
//! standard EPCIS JSON-LD mechanism, which doesn't depend on the
//! context spelling out every term by name.

use std::collections::HashMap;

use serde_json::Value;

use crate::canon::context_loader::ContextLoader;
use crate::canon::error::CanonError;
use crate::canon::tree::Node;
use crate::canon::value::cbv_vocab_prefix_for_field;

/// Term/prefix map collected from `@context` and inline `@xmlns:` keys.
#[derive(Default)]
struct TermMap {
	/// `prefix -> iri-base`, from `@xmlns:prefix` entries.
	namespaces: HashMap<String, String>,
	/// `term -> full value`, from plain string entries in `@context`.
	terms: HashMap<String, String>,
}

impl TermMap {
	fn resolve_key(&self, key: &str) -> String {
		match key.split_once(':') {
			Some((prefix, local)) if prefix != "http" && prefix != "https" => match self.namespaces.get(prefix) {
				Some(iri) => format!("{{{}}}{}", iri, local),
				None => key.to_string(),
			},
			_ => key.to_string(),
		}
	}

	/// Expands a bare term value (no `:` suggesting it's already a URI)
	/// to its full form: an explicit `@context` alias first, then the
	/// `@vocab`-style field-based CBV prefix for `field_name` within
	/// `parent_name`, else passes it through unchanged.
	fn resolve_bare_value(&self, value: &str, parent_name: &str, field_name: &str) -> String {
		if value.contains(':') {
			return value.to_string();
		}
		if let Some(term) = self.terms.get(value) {
			return term.clone();
		}
		match cbv_vocab_prefix_for_field(parent_name, field_name) {
			Some(prefix) => format!("{}{}", prefix, value),
			None => value.to_string(),
		}
	}
}

fn collect_context(context: &Value, terms: &mut HashMap<String, String>) {
	match context {
		Value::Array(entries) => {
			for entry in entries {
				collect_context(entry, terms);
			}
		}
		Value::Object(map) => {
			for (key, val) in map {
				if let Value::String(s) = val {
					terms.insert(key.clone(), s.clone());
				}
			}
		}
		_ => {}
	}
}

fn collect_xmlns(value: &Value, namespaces: &mut HashMap<String, String>) {
	if let Value::Object(map) = value {
		for (key, val) in map {
			if let Some(prefix) = key.strip_prefix("@xmlns:") {
				if let Value::String(s) = val {
					namespaces.insert(prefix.to_string(), s.clone());
				}
			}
		}
		for val in map.values() {
			collect_xmlns(val, namespaces);
		}
	} else if let Value::Array(entries) = value {
		for entry in entries {
			collect_xmlns(entry, namespaces);
		}
	}
}

/// Converts one JSON-LD event value into a [`Node`], following
/// `json_to_py.py`'s `isA`/`#text`/array-flattening rules. `parent_name`
/// is the enclosing element's name, used to resolve bare-string CBV
/// shorthand for fields like `type` whose vocabulary depends on
/// whether it sits inside `bizTransactionList`, `sourceList`, etc.
fn json_to_node(value: &Value, name: &str, parent_name: &str, terms: &TermMap) -> Node {
	match value {
		Value::Array(_) | Value::Object(_) => {
			let mut node = Node {
				name: terms.resolve_key(name),
				value: String::new(),
				children: Vec::new(),
			};
			build_children(value, &mut node, name, parent_name, terms);
			node
		}
		Value::String(s) => Node::leaf(terms.resolve_key(name), terms.resolve_bare_value(s, parent_name, name)),
		Value::Null => Node::leaf(terms.resolve_key(name), ""),
		other => Node::leaf(terms.resolve_key(name), scalar_to_string(other)),
	}
}

fn scalar_to_string(value: &Value) -> String {
	match value {
		Value::Number(n) => n.to_string(),
		Value::Bool(b) => b.to_string(),
		_ => String::new(),
	}
}

fn build_children(value: &Value, node: &mut Node, own_name: &str, parent_name: &str, terms: &TermMap) {
	match value {
		Value::Array(items) => {
			for item in items {
				node.children.push(json_to_node(item, &node.name, parent_name, terms));
			}
		}
		Value::Object(map) => {
			if let Some(Value::String(text)) = map.get("#text") {
				node.value = terms.resolve_bare_value(text, parent_name, own_name);
			}
			for (key, val) in map {
				// `type` is only a name substitution at the root of an
				// event (applied by `event_node_from_value` before this
				// runs); everywhere else — bizTransaction/source/destination
				// items, sensorReport — it's an ordinary business field
				// and must stay a plain child, matching the XML adapter's
				// treatment of the `type` attribute as a leaf child.
				if key == "#text" || key.starts_with("@xmlns") || key == "@context" {
					continue;
				}
				match val {
					Value::Array(items) => {
						for item in items {
							node.children.push(json_to_node(item, key, own_name, terms));
						}
					}
					_ => node.children.push(json_to_node(val, key, own_name, terms)),
				}
			}
		}
		_ => {}
	}
}

/// Builds one event's root [`Node`], resolving its `type`/`isA` key to
/// the node's name (spec.md §4.C, "JSON-LD adapter") — the only place
/// that substitution applies; nested `type` fields (bizTransaction,
/// source, destination, sensorReport) remain ordinary children.
fn event_node_from_value(value: &Value, terms: &TermMap) -> Node {
	let name = match value.get("isA").or_else(|| value.get("type")) {
		Some(Value::String(s)) => s.clone(),
		_ => String::new(),
	};
	let resolved_name = terms.resolve_key(&name);
	let mut node = Node {
		name: resolved_name.clone(),
		value: String::new(),
		children: Vec::new(),
	};
	if let Value::Object(map) = value {
		if let Some(Value::String(text)) = map.get("#text") {
			node.value = terms.resolve_bare_value(text, "", &resolved_name);
		}
		for (key, val) in map {
			if key == "isA" || key == "type" || key == "#text" || key.starts_with("@xmlns") || key == "@context" {
				continue;
			}
			match val {
				Value::Array(items) => {
					for item in items {
						node.children.push(json_to_node(item, key, &resolved_name, terms));
					}
				}
				_ => node.children.push(json_to_node(val, key, &resolved_name, terms)),
			}
		}
	}
	node
}

/// Parses an EPCIS JSON-LD document string and returns its events, in
/// document order, each as an unreconciled [`Node`] (JSON shape).
///
/// Only inline `@context` objects are consulted; a referenced context
/// URL is skipped (bare-string expansion for its terms is simply
/// unavailable). Use [`parse_json_events_with_loader`] when the
/// document's `@context` may be a URL that needs fetching.
pub fn parse_json_events(json: &str) -> Result<Vec<Node>, CanonError> {
	let doc: Value = serde_json::from_str(json).map_err(|e| CanonError::UnparseableDocument(e.to_string()))?;
	let mut term_entries = HashMap::new();
	if let Some(context) = doc.get("@context") {
		collect_context(context, &mut term_entries);
	}
	build_events(&doc, term_entries)
}

/// As [`parse_json_events`], but resolves `@context` URL entries via
/// `loader` (spec.md §4.H), merging any `@context` object the fetched
/// document itself carries.
pub async fn parse_json_events_with_loader(json: &str, loader: &impl ContextLoader) -> Result<Vec<Node>, CanonError> {
	let doc: Value = serde_json::from_str(json).map_err(|e| CanonError::UnparseableDocument(e.to_string()))?;
	let mut term_entries = HashMap::new();

	if let Some(context) = doc.get("@context") {
		collect_context(context, &mut term_entries);
		for url in context_urls(context) {
			let fetched = loader.load(&url).await?;
			let fetched_doc: Value = serde_json::from_str(&fetched.document)
				.map_err(|e| CanonError::ContextUnavailable(format!("parsing context {}: {}", url, e)))?;
			if let Some(nested) = fetched_doc.get("@context") {
				collect_context(nested, &mut term_entries);
			}
		}
	}

	build_events(&doc, term_entries)
}

fn context_urls(context: &Value) -> Vec<String> {
	match context {
		Value::String(s) => vec![s.clone()],
		Value::Array(entries) => entries.iter().flat_map(context_urls).collect(),
		_ => Vec::new(),
	}
}

fn build_events(doc: &Value, term_entries: HashMap<String, String>) -> Result<Vec<Node>, CanonError> {
	let mut namespaces = HashMap::new();
	collect_xmlns(doc, &mut namespaces);
	let terms = TermMap {
		namespaces,
		terms: term_entries,
	};

	let body = doc
		.get("epcisBody")
		.ok_or_else(|| CanonError::UnparseableDocument("missing epcisBody".to_string()))?;

	let events: Vec<&Value> = if let Some(Value::Array(list)) = body.get("eventList") {
		list.iter().collect()
	} else if let Some(event) = body.get("event") {
		vec![event]
	} else {
		return Err(CanonError::UnparseableDocument("epcisBody has neither eventList nor event".to_string()));
	};

	Ok(events.iter().map(|e| event_node_from_value(e, &terms)).collect())
}
