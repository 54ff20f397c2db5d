//! Tracing subscriber initialisation.
//!
//! Events go to stderr so the step report on stdout stays clean. `RUST_LOG`
//! wins over the configured level when set.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{ProbeError, Result};

fn env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| ProbeError::Logging {
        message: format!("invalid log level '{level}': {e}"),
    })
}

/// Install the global tracing subscriber.
///
/// Must be called at most once per process.
///
/// # Errors
///
/// Returns `ProbeError::Logging` if the level is not a valid filter directive
/// or a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(&config.level)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|e| ProbeError::Logging {
        message: e.to_string(),
    })
}
