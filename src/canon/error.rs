//! Error kinds produced by the canonicalization pipeline.

use thiserror::Error;

/// Errors that can occur while turning a document into event hashes.
///
/// Two failure modes described in spec.md are deliberately *not* error
/// variants here: an unparseable timestamp is passed through verbatim
/// with a warning logged, and an identifier the normalizer doesn't
/// recognize falls back to its original string — both are recoverable
/// per-value fallbacks, not pipeline failures.
#[derive(Debug, Error)]
pub enum CanonError {
	#[error("document could not be parsed as XML or JSON-LD: {0}")]
	UnparseableDocument(String),

	#[error("event at index {index} could not be parsed: {reason}")]
	UnparseableEvent { index: usize, reason: String },

	#[error("unknown hash algorithm: {0}")]
	UnknownHashAlgorithm(String),

	#[error("JSON-LD context unavailable: {0}")]
	ContextUnavailable(String),
}
