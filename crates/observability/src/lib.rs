//! Tracing/logging initialization shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Filtering is driven by `RUST_LOG` and defaults to `info`. Safe to call
/// multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Compact human-readable output; this is an interactive tool, not a server.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
