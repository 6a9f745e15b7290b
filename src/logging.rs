//! Tracing setup for the binary

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter (e.g. `tally=debug`)
pub const LOG_ENV: &str = "TALLY_LOG";

const DEFAULT_FILTER: &str = "tally=warn";

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber once; later calls do nothing
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
