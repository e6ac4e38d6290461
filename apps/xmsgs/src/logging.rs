//! Logging initialization.
//!
//! Logs go to stderr so JSON output on stdout stays parseable. The level
//! comes from the `-v` count unless `XMSGS_LOG` holds a filter directive.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "XMSGS_LOG";

static INIT_ONCE: Once = Once::new();

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "xmsgs=warn",
        1 => "xmsgs=info",
        2 => "xmsgs=debug",
        _ => "xmsgs=trace",
    }
}

/// Install the global subscriber; later calls are no-ops.
pub fn init(verbosity: u8) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
