//! Context loader contract (spec.md §4.H).
//!
//! Grounded on `file_document_loader.py`: a bundled set of well-known
//! EPCIS JSON-LD contexts is tried first, keyed by URL, and only a
//! cache miss falls through to the network. The bundled set is checked
//! against its SHA-256 content hash at startup so a corrupted or
//! accidentally-edited bundle fails loudly instead of silently serving
//! stale vocabulary.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::canon::error::CanonError;

/// A loaded JSON-LD context document.
pub struct ContextDocument {
	pub content_type: &'static str,
	pub document_url: String,
	pub document: String,
}

/// Capability to resolve a JSON-LD context URL to its document
/// (spec.md §4.H). Implementations MUST serve known URLs from local
/// storage before falling back to the network.
pub trait ContextLoader {
	async fn load(&self, url: &str) -> Result<ContextDocument, CanonError>;
}

struct BundledEntry {
	url: &'static str,
	sha256: &'static str,
	content: &'static str,
}

const BUNDLED_CONTEXTS: &[BundledEntry] = &[
	BundledEntry {
		url: "https://ref.gs1.org/standards/epcis/2.0.0/epcis-context.jsonld",
		sha256: "66d54dac5472b3039802da366aa13dd0a29a7bf4fe6c6704284cbbcdcadf9a5f",
		content: include_str!("../contexts/epcis-context.jsonld"),
	},
	BundledEntry {
		url: "https://ref.gs1.org/cbv/cbv-context.jsonld",
		sha256: "fe62f42df998b521217953dcf560a7ef6ca479553caa9bfb4e6299873a026beb",
		content: include_str!("../contexts/cbv-context.jsonld"),
	},
];

fn content_hash(content: &str) -> String {
	hex::encode(Sha256::digest(content.as_bytes()))
}

/// Serves the bundled well-known EPCIS contexts, falling back to a
/// network fetch via `reqwest::Client` for anything not in the bundle.
pub struct BundledContextLoader {
	bundle: HashMap<&'static str, &'static BundledEntry>,
	client: reqwest::Client,
}

impl BundledContextLoader {
	pub fn new() -> Self {
		let bundle = BUNDLED_CONTEXTS.iter().map(|e| (e.url, e)).collect();
		Self {
			bundle,
			client: reqwest::Client::new(),
		}
	}

	/// Verifies every bundled context's content against its recorded
	/// hash. Call once at startup; a mismatch means the bundle was
	/// edited without updating its hash.
	pub fn verify_bundle(&self) -> Result<(), CanonError> {
		for entry in self.bundle.values() {
			let actual = content_hash(entry.content);
			if actual != entry.sha256 {
				return Err(CanonError::ContextUnavailable(format!(
					"bundled context for {} has content hash {} but expected {}",
					entry.url, actual, entry.sha256
				)));
			}
		}
		Ok(())
	}

	async fn fetch_remote(&self, url: &str) -> Result<ContextDocument, CanonError> {
		tracing::warn!(url, "context not bundled; fetching from network");
		let response = self
			.client
			.get(url)
			.send()
			.await
			.map_err(|e| CanonError::ContextUnavailable(format!("fetching {}: {}", url, e)))?;
		let document = response
			.text()
			.await
			.map_err(|e| CanonError::ContextUnavailable(format!("reading body of {}: {}", url, e)))?;
		Ok(ContextDocument {
			content_type: "application/ld+json",
			document_url: url.to_string(),
			document,
		})
	}
}

impl Default for BundledContextLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ContextLoader for BundledContextLoader {
	async fn load(&self, url: &str) -> Result<ContextDocument, CanonError> {
		if let Some(entry) = self.bundle.get(url) {
			return Ok(ContextDocument {
				content_type: "application/ld+json",
				document_url: url.to_string(),
				document: entry.content.to_string(),
			});
		}
		self.fetch_remote(url).await
	}
}
