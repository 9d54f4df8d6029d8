//! Command line utility to calculate EPCIS event hashes (spec.md §6).
//!
//! Grounded on `original_source/__main__.py`'s `argparse` surface, ported
//! to `clap`'s derive style the way the teacher's own CLI does.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use epcis_event_hash::canon::context_loader::BundledContextLoader;
use epcis_event_hash::canon::{compute_prehash_from_file, DocumentFormat, HashAlgorithm};
use epcis_event_hash::{config, http, observability};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
	Xml,
	Json,
}

#[derive(Parser)]
#[command(name = "epcis-event-hash", about = "Generate a canonical hash from an EPCIS document.")]
struct Cli {
	/// EPCIS file(s) to hash. Required unless `--serve` is given.
	file: Vec<PathBuf>,

	/// Hashing algorithm to use.
	#[arg(short = 'a', long = "algorithm", default_value = "sha256")]
	algorithm: String,

	/// Set the log level.
	#[arg(short = 'l', long = "log", default_value = "warning")]
	log: String,

	/// Write the newline-separated list of hashes for each input file into a
	/// sibling `<name>.hashes` file instead of stdout (`.prehashes` too with `-p`).
	#[arg(short = 'b', long = "batch")]
	batch: bool,

	/// Also emit the pre-hash string (to stdout, or a `.prehashes` file with `-b`).
	#[arg(short = 'p', long = "prehash")]
	prehash: bool,

	/// String used to join the fields of the pre-hash string. Defaults to
	/// empty, as specified; `\n`/`\t` are useful for debugging.
	#[arg(short = 'j', long = "join", default_value = "")]
	join: String,

	/// Enforce parsing every file as XML or JSON; defaults to guessing from
	/// the file suffix.
	#[arg(short = 'e', long = "enforce_format", value_enum)]
	enforce_format: Option<FormatArg>,

	/// Run as an HTTP server instead of hashing files (`POST /hash`, `GET /health`).
	#[arg(long = "serve")]
	serve: bool,
}

fn expand_join(raw: &str) -> String {
	raw.replace("\\n", "\n").replace("\\t", "\t")
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
	let cli = Cli::parse();

	if std::env::var_os("RUST_LOG").is_none() {
		unsafe { std::env::set_var("RUST_LOG", cli.log.to_ascii_lowercase()) };
	}
	let _ = observability::init_logging();
	let settings = config::load().unwrap_or_default();

	if cli.serve {
		return serve(settings).await;
	}

	if cli.file.is_empty() {
		eprintln!("error: at least one EPCIS file is required unless --serve is given");
		return std::process::ExitCode::FAILURE;
	}

	let algorithm = match HashAlgorithm::parse(&cli.algorithm) {
		Ok(a) => a,
		Err(e) => {
			eprintln!("{}", e);
			return std::process::ExitCode::FAILURE;
		}
	};

	let format = match cli.enforce_format {
		Some(FormatArg::Xml) => DocumentFormat::Xml,
		Some(FormatArg::Json) => DocumentFormat::Json,
		None => DocumentFormat::Guess,
	};

	let join_by = expand_join(&cli.join);
	let loader = BundledContextLoader::new();

	let mut failed = false;
	for path in &cli.file {
		tracing::debug!(path = %path.display(), "reading EPCIS file");
		match compute_prehash_from_file(path, format, &loader, &join_by).await {
			Ok(prehashes) => {
				let hashes: Vec<String> = prehashes.iter().map(|p| epcis_event_hash::canon::hash::calculate_hash(p, algorithm)).collect();
				if cli.batch {
					if let Err(e) = write_batch_outputs(path, &hashes, cli.prehash.then_some(&prehashes)) {
						eprintln!("failed to write output for '{}': {}", path.display(), e);
						failed = true;
					}
				} else {
					println!("\nHashes of the events contained in '{}':\n{}", path.display(), hashes.join("\n"));
					if cli.prehash {
						println!("\nPre-hash strings:\n{}", prehashes.join("\n---\n"));
					}
				}
			}
			Err(e) => {
				tracing::error!(path = %path.display(), error = %e, "failed to hash file");
				eprintln!("failed to hash '{}': {}", path.display(), e);
				failed = true;
			}
		}
	}

	if failed {
		std::process::ExitCode::FAILURE
	} else {
		std::process::ExitCode::SUCCESS
	}
}

fn write_batch_outputs(path: &std::path::Path, hashes: &[String], prehashes: Option<&Vec<String>>) -> std::io::Result<()> {
	let stem = path.with_extension("");
	std::fs::write(stem.with_extension("hashes"), format!("{}\n", hashes.join("\n")))?;
	if let Some(prehashes) = prehashes {
		std::fs::write(stem.with_extension("prehashes"), format!("{}\n", prehashes.join("\n")))?;
	}
	Ok(())
}

async fn serve(settings: config::Settings) -> std::process::ExitCode {
	let bind_addr = format!("{}:{}", settings.host, settings.port);
	let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
		Ok(l) => l,
		Err(e) => {
			eprintln!("failed to bind {}: {}", bind_addr, e);
			return std::process::ExitCode::FAILURE;
		}
	};
	tracing::info!(addr = %bind_addr, "listening (POST /hash, GET /health)");
	let app = http::router(settings);
	if let Err(e) = axum::serve(listener, app).await {
		eprintln!("server error: {}", e);
		return std::process::ExitCode::FAILURE;
	}
	std::process::ExitCode::SUCCESS
}
