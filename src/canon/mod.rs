//! EPCIS 2.0 event-hash canonicalization.
//!
//! `xml_adapter`/`json_adapter` parse a document into [`tree::Node`]
//! trees; `reconcile` brings the JSON shape in line with the XML one;
//! `serializer` walks the reconciled tree guided by `schema` into a
//! pre-hash string, applying `value` canonicalization (which in turn
//! uses `identifier` for GS1 identifier normalization) to every leaf;
//! `hash` turns the pre-hash string into the final `ni://…` digest URI.
//! `pipeline` wires these into the read-to-hash entry points, and
//! `context_loader` resolves JSON-LD `@context` URLs for the JSON path.

pub mod context_loader;
pub mod error;
pub mod hash;
pub mod identifier;
pub mod json_adapter;
pub mod pipeline;
pub mod reconcile;
pub mod schema;
pub mod serializer;
pub mod tree;
pub mod value;
pub mod xml_adapter;

pub use error::CanonError;
pub use hash::HashAlgorithm;
pub use pipeline::{compute_prehash_from_file, compute_prehash_from_json_str, compute_prehash_from_xml_str, epcis_hash_from_json, epcis_hash_from_xml, DocumentFormat};
pub use tree::Node;
