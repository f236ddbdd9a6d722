//! Log subscriber setup.
//!
//! Logs go to stderr so stdout stays reserved for command output.
//! `RUST_LOG` takes precedence over the default level.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging(quiet: bool) -> Result<()> {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
