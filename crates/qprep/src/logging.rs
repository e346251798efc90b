//! Tracing subscriber setup.
//!
//! Library code only emits `tracing` events; binaries call [`init`] once to
//! decide where they go. `RUST_LOG`, when set, overrides the configured level.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{ConfigError, LoggingConfig};

/// Install a global subscriber for the given configuration.
///
/// Returns `Ok(false)` if a subscriber was already installed; the existing
/// one is kept.
pub fn init(config: &LoggingConfig) -> Result<bool, ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::Validation(format!("Invalid log level: {e}")))?;

    let fmt_layer = match config.format.as_str() {
        "console" => fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        "json" => fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .json()
            .boxed(),
        other => {
            return Err(ConfigError::Validation(format!(
                "Invalid log format: {other}"
            )));
        }
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level = %config.level, format = %config.format, "logging initialized");
    }
    Ok(installed)
}
