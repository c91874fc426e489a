//! Diagnostic logging setup

use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "SMART_NOTIFY_LOG";

/// Filter used when the environment sets none
const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
