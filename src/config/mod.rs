use anyhow::Result;
use serde::Deserialize;

use crate::canon::HashAlgorithm;

/// Runtime configuration for the canonicalizer's CLI/HTTP surfaces.
///
/// Values are loaded from (in order): `config` file (optional) and environment
/// variables prefixed with `EVH_` (e.g. `EVH_PORT`). This is server/CLI
/// plumbing only — `canon::pipeline` itself takes its join delimiter and hash
/// algorithm as explicit function parameters, never a global (spec.md §9).
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Settings {
	pub host: String,
	pub port: u16,
	pub default_algorithm: String,
	pub default_join: String,
	pub log_level: Option<String>,
}

impl Settings {
	/// Parses [`Settings::default_algorithm`], falling back to sha-256 on a
	/// malformed config value (the CLI's own `-a` flag is validated separately).
	pub fn default_hash_algorithm(&self) -> HashAlgorithm {
		HashAlgorithm::parse(&self.default_algorithm).unwrap_or(HashAlgorithm::Sha256)
	}
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_string(),
			port: 8080,
			default_algorithm: "sha256".to_string(),
			default_join: String::new(),
			log_level: Some("info".to_string()),
		}
	}
}

/// Partial settings used to overlay environment/file values on top of defaults.
#[derive(Debug, Deserialize)]
struct PartialSettings {
	host: Option<String>,
	port: Option<u16>,
	default_algorithm: Option<String>,
	default_join: Option<String>,
	log_level: Option<String>,
}

/// Load settings from config file (optional) and environment variables.
pub fn load() -> Result<Settings> {
	let builder = config::Config::builder()
		.add_source(config::File::with_name("config").required(false))
		// Use a double-underscore separator so single-underscore env names like
		// `EVH_DEFAULT_ALGORITHM` map to `default_algorithm` instead of nested
		// `default.algorithm`.
		.add_source(config::Environment::with_prefix("EVH").separator("__"));

	let cfg = builder.build()?;

	let partial: PartialSettings = cfg.try_deserialize()?;

	let mut s = Settings::default();
	if let Some(host) = partial.host {
		s.host = host;
	}
	if let Some(port) = partial.port {
		s.port = port;
	}
	if let Some(algorithm) = partial.default_algorithm {
		s.default_algorithm = algorithm;
	}
	if let Some(join) = partial.default_join {
		s.default_join = join;
	}
	if let Some(level) = partial.log_level {
		s.log_level = Some(level);
	}
	// Explicitly prefer direct environment variables when present. Some
	// environments (CI, test harnesses) may set env vars in ways that the
	// `config` crate doesn't map as expected; read them directly to ensure
	// explicit overrides take effect.
	if let Ok(h) = std::env::var("EVH_HOST") {
		if !h.is_empty() {
			s.host = h;
		}
	}
	if let Ok(p) = std::env::var("EVH_PORT") {
		if let Ok(pn) = p.parse::<u16>() {
			s.port = pn;
		}
	}
	if let Ok(a) = std::env::var("EVH_DEFAULT_ALGORITHM") {
		if !a.is_empty() {
			s.default_algorithm = a;
		}
	}
	if let Ok(j) = std::env::var("EVH_DEFAULT_JOIN") {
		s.default_join = j;
	}
	if let Ok(l) = std::env::var("EVH_LOG_LEVEL") {
		if !l.is_empty() {
			s.log_level = Some(l);
		}
	}

	Ok(s)
}

#[cfg(feature = "unit-tests")]
mod tests {
	use super::*;
	use std::env;

	#[test]
	fn test_load_defaults_and_env_overlay() {
		let orig_host = env::var_os("EVH_HOST");
		let orig_port = env::var_os("EVH_PORT");
		let orig_algo = env::var_os("EVH_DEFAULT_ALGORITHM");
		let orig_join = env::var_os("EVH_DEFAULT_JOIN");
		let orig_level = env::var_os("EVH_LOG_LEVEL");

		unsafe { env::remove_var("EVH_HOST") };
		unsafe { env::remove_var("EVH_PORT") };
		unsafe { env::remove_var("EVH_DEFAULT_ALGORITHM") };
		unsafe { env::remove_var("EVH_DEFAULT_JOIN") };
		unsafe { env::remove_var("EVH_LOG_LEVEL") };

		let s = load().expect("load should succeed with defaults");
		let d = Settings::default();
		assert_eq!(s.host, d.host);
		assert_eq!(s.port, d.port);
		assert_eq!(s.log_level, d.log_level);

		unsafe { env::set_var("EVH_HOST", "0.0.0.0") };
		unsafe { env::set_var("EVH_PORT", "9090") };
		unsafe { env::set_var("EVH_DEFAULT_ALGORITHM", "sha3-256") };
		unsafe { env::set_var("EVH_DEFAULT_JOIN", "|") };
		unsafe { env::set_var("EVH_LOG_LEVEL", "debug") };

		let s2 = load().expect("load should succeed with env");
		assert_eq!(s2.host, "0.0.0.0");
		assert_eq!(s2.port, 9090u16);
		assert_eq!(s2.default_algorithm, "sha3-256");
		assert_eq!(s2.default_join, "|");
		assert_eq!(s2.log_level.as_deref(), Some("debug"));

		match orig_host {
			Some(v) => unsafe { env::set_var("EVH_HOST", v) },
			None => unsafe { env::remove_var("EVH_HOST") },
		}
		match orig_port {
			Some(v) => unsafe { env::set_var("EVH_PORT", v) },
			None => unsafe { env::remove_var("EVH_PORT") },
		}
		match orig_algo {
			Some(v) => unsafe { env::set_var("EVH_DEFAULT_ALGORITHM", v) },
			None => unsafe { env::remove_var("EVH_DEFAULT_ALGORITHM") },
		}
		match orig_join {
			Some(v) => unsafe { env::set_var("EVH_DEFAULT_JOIN", v) },
			None => unsafe { env::remove_var("EVH_DEFAULT_JOIN") },
		}
		match orig_level {
			Some(v) => unsafe { env::set_var("EVH_LOG_LEVEL", v) },
			None => unsafe { env::remove_var("EVH_LOG_LEVEL") },
		}
	}
}
