//! `POST /hash` and `GET /health` handlers (spec.md §6, "HTTP surface").
//!
//! Grounded on `original_source/webapi/api.py`'s Flask `/hash` route:
//! dispatch on the request's content type, reject anything else with 404,
//! join the resulting `ni://…` hashes with a comma.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::canon::context_loader::BundledContextLoader;
use crate::canon::{epcis_hash_from_json, epcis_hash_from_xml, CanonError};
use crate::http::AppState;

pub async fn health() -> &'static str {
	"IMOK"
}

pub async fn hash(State(state): State<AppState>, headers: axum::http::HeaderMap, body: Bytes) -> Response {
	let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or("");

	let document = match std::str::from_utf8(&body) {
		Ok(s) => s,
		Err(_) => return (StatusCode::BAD_REQUEST, "request body is not valid UTF-8").into_response(),
	};

	let result = if content_type.starts_with("application/xml") {
		epcis_hash_from_xml(document, state.settings.default_hash_algorithm(), &state.settings.default_join)
	} else if content_type.starts_with("application/json") || content_type.starts_with("application/ld+json") {
		let loader = BundledContextLoader::new();
		epcis_hash_from_json(document, &loader, state.settings.default_hash_algorithm(), &state.settings.default_join).await
	} else {
		return (StatusCode::NOT_FOUND, "invalid content_type in request").into_response();
	};

	match result {
		Ok(hashes) => hashes.join(",").into_response(),
		Err(CanonError::UnparseableDocument(reason)) => (StatusCode::BAD_REQUEST, reason).into_response(),
		Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
	}
}
