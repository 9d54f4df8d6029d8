pub mod logging;

pub use logging::init_logging;

#[cfg(feature = "unit-tests")]
mod tests {
	#[test]
	fn init_logging_does_not_panic() {
		let _ = super::init_logging();
	}
}
