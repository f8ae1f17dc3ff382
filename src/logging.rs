//! Logging Setup
//!
//! Installs a `tracing` fmt subscriber. Safe to call more than once.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber using `RUST_LOG`, falling back to `default_filter`
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
