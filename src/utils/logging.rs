//! Structured logging setup.
//!
//! The codec only emits `tracing` events; installing a subscriber is left to the
//! application. [`init_logging`] is a convenience for binaries and tests that want
//! the crate's default formatting.

use crate::config::LoggingConfig;
use crate::error::{CodecError, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber configured from `config`
///
/// `RUST_LOG`, when set, takes precedence over `config.log_level`.
///
/// # Errors
/// Returns `CodecError::ConfigError` if a global subscriber is already installed
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string().to_lowercase()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let installed = if config.json_format {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed
        .map_err(|e| CodecError::ConfigError(format!("Failed to install subscriber: {e}")))?;

    info!(app = %config.app_name, json = config.json_format, "Logging initialized");
    Ok(())
}
