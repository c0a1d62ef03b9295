//! Tracing setup for binaries and tests embedding the engine.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber: env-filtered, compact output.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .try_init();
}
