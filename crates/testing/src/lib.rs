//! Shared test fixtures and logging setup for the workspace crates.

pub mod fixtures;

use tracing_subscriber::EnvFilter;

/// Install a test subscriber; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
