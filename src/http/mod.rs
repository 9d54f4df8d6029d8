//! HTTP surface (spec.md §6): a thin `axum` router exposing `/hash` and
//! `/health`, grounded on the teacher's router/middleware idiom
//! (`lib.rs`'s original `Router::new()...layer(...)` chain) trimmed to
//! what a stateless canonicalizer needs — no TLS termination, database,
//! or PII layers, since none of those have any counterpart here.

pub mod handler;

use axum::routing::{get, post};
use axum::Router;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;

#[derive(Clone)]
pub struct AppState {
	pub settings: Settings,
}

pub fn router(settings: Settings) -> Router {
	Router::new()
		.route("/hash", post(handler::hash))
		.route("/health", get(handler::health))
		.layer(TraceLayer::new_for_http())
		.layer(NormalizePathLayer::trim_trailing_slash())
		.with_state(AppState { settings })
}

#[cfg(feature = "unit-tests")]
mod tests {
	use super::*;

	#[test]
	fn router_builds_with_default_settings() {
		let _ = router(Settings::default());
	}
}
