//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, or by `filter` when the
/// variable is unset or invalid.
///
/// Returns `false` when a global subscriber was already installed; the
/// existing one stays in place.
pub fn init_logging(filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(filter, "logging initialized");
    }
    installed
}
