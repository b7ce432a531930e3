//! Diagnostic logging for hosts that link the library.
//!
//! Output goes to stderr, filtered by `RESUME_LOG` (default `info`).
//! Installing twice is harmless: the second call reports `false`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "RESUME_LOG";

pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
