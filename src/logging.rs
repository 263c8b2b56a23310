//! Logging setup.
//!
//! Structured logging via the `tracing` crate. The filter comes from the
//! `SYMSTORE_LOG` environment variable when set, otherwise from the level
//! passed on the command line; output goes to stderr as text or JSON.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

const ENV_FILTER_VAR: &str = "SYMSTORE_LOG";

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Initialize the global subscriber.
pub fn init(level: Option<&str>, format: LogFormat) -> anyhow::Result<()> {
    let filter = match std::env::var(ENV_FILTER_VAR) {
        Ok(env) => EnvFilter::try_new(env)
            .with_context(|| format!("invalid {ENV_FILTER_VAR} filter"))?,
        Err(_) => EnvFilter::try_new(level.unwrap_or("warn")).context("invalid log level")?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}
