//! Logging setup.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so `convert` output on stdout stays clean.
pub fn init_logging() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}
