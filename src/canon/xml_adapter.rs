//! XML input adapter (spec.md §4.C).
//!
//! Strips the presentation-only `<extension>`/`<baseExtension>`
//! wrappers, then parses the remainder with `quick-xml`, producing one
//! [`Node`] per event under `EventList`, in document order. Namespace
//! resolution is tracked by hand across a scope stack rather than via
//! `quick_xml`'s `NsReader`, since EPCIS core elements are normally
//! unprefixed and only vendor extensions carry a namespace — a small
//! explicit prefix map is both sufficient and easy to audit.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::canon::error::CanonError;
use crate::canon::tree::Node;

const SHORT_PREFIXES: &[(&str, &str)] = &[
	("gs1:", "https://gs1.org/voc/"),
	("cbv:", "https://ref.gs1.org/cbv/"),
];

/// Expands a known short vocabulary prefix in an attribute value
/// (spec.md §4.C, "Short prefix expansion").
fn expand_short_prefix(value: &str) -> String {
	for (short, full) in SHORT_PREFIXES {
		if let Some(rest) = value.strip_prefix(short) {
			return format!("{}{}", full, rest);
		}
	}
	value.to_string()
}

fn strip_extension_wrappers(xml: &str) -> String {
	xml.replace("<extension>", "")
		.replace("</extension>", "")
		.replace("<baseExtension>", "")
		.replace("</baseExtension>", "")
}

#[derive(Clone, Default)]
struct Scope {
	prefixes: HashMap<String, String>,
	default_ns: Option<String>,
}

impl Scope {
	fn resolve(&self, qname: &str) -> String {
		match qname.split_once(':') {
			Some((prefix, local)) => match self.prefixes.get(prefix) {
				Some(uri) => format!("{{{}}}{}", uri, local),
				None => qname.to_string(),
			},
			None => match &self.default_ns {
				Some(uri) => format!("{{{}}}{}", uri, qname),
				None => qname.to_string(),
			},
		}
	}
}

struct Frame {
	name: String,
	children: Vec<Node>,
	text: String,
	has_attribute_children: bool,
}

/// Parses an EPCIS XML document string and returns the events found
/// under its `EventList` element, in document order.
pub fn parse_xml_events(xml: &str) -> Result<Vec<Node>, CanonError> {
	let cleaned = strip_extension_wrappers(xml);
	let mut reader = Reader::from_str(&cleaned);
	reader.config_mut().trim_text(true);

	let mut scopes: Vec<Scope> = vec![Scope::default()];
	let mut stack: Vec<Frame> = Vec::new();
	let mut event_list: Option<Vec<Node>> = None;
	let mut buf = Vec::new();

	loop {
		let event = reader
			.read_event_into(&mut buf)
			.map_err(|e| CanonError::UnparseableDocument(e.to_string()))?;
		match event {
			Event::Eof => break,
			Event::Start(e) => {
				let scope = push_scope(&scopes, &e)?;
				let frame = open_frame(&scope, &e)?;
				scopes.push(scope);
				stack.push(frame);
			}
			Event::Empty(e) => {
				let scope = push_scope(&scopes, &e)?;
				let frame = open_frame(&scope, &e)?;
				close_frame(&mut stack, frame, &mut event_list);
			}
			Event::Text(t) => {
				if let Some(frame) = stack.last_mut() {
					let text = t
						.unescape()
						.map_err(|e| CanonError::UnparseableDocument(e.to_string()))?;
					frame.text.push_str(text.trim());
				}
			}
			Event::End(_) => {
				scopes.pop();
				let frame = stack
					.pop()
					.ok_or_else(|| CanonError::UnparseableDocument("unbalanced XML element".to_string()))?;
				close_frame(&mut stack, frame, &mut event_list);
			}
			_ => {}
		}
		buf.clear();
	}

	event_list.ok_or_else(|| CanonError::UnparseableDocument("no EventList element found".to_string()))
}

fn push_scope(scopes: &[Scope], start: &BytesStart) -> Result<Scope, CanonError> {
	let mut scope = scopes.last().cloned().unwrap_or_default();
	for attr in start.attributes() {
		let attr = attr.map_err(|e| CanonError::UnparseableDocument(e.to_string()))?;
		let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
		let value = attr
			.unescape_value()
			.map_err(|e| CanonError::UnparseableDocument(e.to_string()))?
			.into_owned();
		if key == "xmlns" {
			scope.default_ns = Some(value);
		} else if let Some(prefix) = key.strip_prefix("xmlns:") {
			scope.prefixes.insert(prefix.to_string(), value);
		}
	}
	Ok(scope)
}

fn open_frame(scope: &Scope, start: &BytesStart) -> Result<Frame, CanonError> {
	let raw_name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
	let name = scope.resolve(&raw_name);

	let mut children = Vec::new();
	for attr in start.attributes() {
		let attr = attr.map_err(|e| CanonError::UnparseableDocument(e.to_string()))?;
		let raw_key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
		if raw_key == "xmlns" || raw_key.starts_with("xmlns:") {
			continue;
		}
		let value = attr
			.unescape_value()
			.map_err(|e| CanonError::UnparseableDocument(e.to_string()))?;
		let aname = scope.resolve(&raw_key);
		children.push(Node::leaf(aname, expand_short_prefix(&value)));
	}

	let has_attribute_children = !children.is_empty();
	Ok(Frame {
		name,
		children,
		text: String::new(),
		has_attribute_children,
	})
}

fn close_frame(stack: &mut Vec<Frame>, frame: Frame, event_list: &mut Option<Vec<Node>>) {
	let node = finish_frame(frame);

	if local_name(&node.name) == "EventList" {
		*event_list = Some(node.children);
		return;
	}

	match stack.last_mut() {
		Some(parent) => parent.children.push(node),
		None => {
			// Root element closed without finding an EventList as a direct child;
			// search one level down (EventList is commonly nested under EPCISBody).
			if event_list.is_none() {
				*event_list = find_event_list(&node);
			}
		}
	}
}

fn local_name(qualified: &str) -> &str {
	match qualified.rfind('}') {
		Some(idx) => &qualified[idx + 1..],
		None => qualified,
	}
}

fn find_event_list(node: &Node) -> Option<Vec<Node>> {
	if local_name(&node.name) == "EventList" {
		return Some(node.children.clone());
	}
	for child in &node.children {
		if let Some(found) = find_event_list(child) {
			return Some(found);
		}
	}
	None
}

fn finish_frame(frame: Frame) -> Node {
	if frame.children.is_empty() {
		Node::leaf(frame.name, frame.text)
	} else if frame.has_attribute_children && !frame.text.is_empty() {
		// An element with both attributes and text content (e.g.
		// `<bizTransaction type="...">value</bizTransaction>`) cannot be
		// represented by a single node carrying both a value and
		// children. Synthesize a same-named child to carry the text,
		// producing the pair-node shape the serializer expects for
		// bizTransaction/source/destination (spec.md §4.C).
		let mut children = frame.children;
		children.push(Node::leaf(frame.name.clone(), frame.text));
		Node::branch(frame.name, children)
	} else {
		Node::branch(frame.name, frame.children)
	}
}
