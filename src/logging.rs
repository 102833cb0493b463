//! Logging setup
//!
//! Logs go to stderr so CLI output on stdout stays machine-readable. The
//! filter comes from `RUST_LOG` when set, otherwise from the configured level.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Initialize the global subscriber. Later calls are ignored.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();

    tracing::debug!(level = %config.level, "Logging initialized");
}

/// Initialize logging for tests (captured by the test harness)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}
