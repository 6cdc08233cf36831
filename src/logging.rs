//! Diagnostic logging on stderr.
//!
//! User-facing results go through `output`; this is only for tracing events.
//! `VALIDATE_ENTITY_LOG` takes an `EnvFilter` directive and wins over the
//! default level.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "VALIDATE_ENTITY_LOG";

/// Default filter directive for the given quietness.
pub fn default_level(quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        "warn"
    }
}

pub fn init(quiet: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
