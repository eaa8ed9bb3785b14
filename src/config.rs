//! # Configuration Management
//!
//! Centralized configuration for the packet codec.
//!
//! Wire-level defaults live here as constants; [`CodecConfig`] bundles the values a
//! transport layer may want to tune per deployment (protocol version, writer
//! pre-allocation, decompression ceiling) together with logging settings.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - TOML strings via `from_toml()`
//! - Environment variables via `from_env()`
//! - Direct instantiation with defaults
//!
//! ## Security Considerations
//! - The decompression ceiling (2 MiB by default) bounds memory spent on a single
//!   compressed tag, no matter what the compressed bytes claim

use crate::error::{CodecError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Protocol version used when a reader or writer is built without one
pub const DEFAULT_PROTOCOL_VERSION: i32 = 47;

/// First protocol version that packs positions as x/z/y (layout B)
pub const POSITION_LAYOUT_THRESHOLD: i32 = 477;

/// Starting capacity of a writer's buffer
pub const WRITER_INITIAL_CAPACITY: usize = 64;

/// Max allowed decompressed payload size (2 MiB, the largest uncompressed packet)
pub const MAX_PAYLOAD_SIZE: usize = 2 * 1024 * 1024;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CodecConfig {
    /// Wire codec settings
    #[serde(default)]
    pub wire: WireConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| CodecError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CodecError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(version) = std::env::var("CRAFT_PROTOCOL_VERSION") {
            config.wire.protocol_version = version.parse::<i32>().map_err(|e| {
                CodecError::ConfigError(format!("Invalid CRAFT_PROTOCOL_VERSION '{version}': {e}"))
            })?;
        }

        if let Ok(capacity) = std::env::var("CRAFT_PROTOCOL_WRITER_CAPACITY") {
            if let Ok(val) = capacity.parse::<usize>() {
                config.wire.writer_initial_capacity = val;
            }
        }

        if let Ok(limit) = std::env::var("CRAFT_PROTOCOL_MAX_DECOMPRESSED_SIZE") {
            if let Ok(val) = limit.parse::<usize>() {
                config.wire.max_decompressed_size = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CodecError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| CodecError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.wire.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CodecError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Wire codec configuration
///
/// Missing keys fall back to their defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WireConfig {
    /// Protocol version readers and writers are bound to
    pub protocol_version: i32,

    /// Initial buffer capacity for new writers
    pub writer_initial_capacity: usize,

    /// Upper bound on the size of a decompressed tag payload
    pub max_decompressed_size: usize,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            writer_initial_capacity: WRITER_INITIAL_CAPACITY,
            max_decompressed_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl WireConfig {
    /// Validate wire configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.protocol_version < 0 {
            errors.push(format!(
                "Protocol version cannot be negative: {}",
                self.protocol_version
            ));
        }

        if self.writer_initial_capacity == 0 {
            errors.push("Writer initial capacity must be greater than 0".to_string());
        } else if self.writer_initial_capacity > MAX_PAYLOAD_SIZE {
            errors.push(format!(
                "Writer initial capacity too large: {} bytes (maximum: {MAX_PAYLOAD_SIZE})",
                self.writer_initial_capacity
            ));
        }

        if self.max_decompressed_size == 0 {
            errors.push("Max decompressed size cannot be 0".to_string());
        } else if self.max_decompressed_size > 64 * 1024 * 1024 {
            errors.push(format!(
                "Max decompressed size too large: {} bytes (maximum recommended: 64 MB)",
                self.max_decompressed_size
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("craft-protocol"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_from_env_overrides() {
        std::env::set_var("CRAFT_PROTOCOL_VERSION", "763");
        std::env::set_var("CRAFT_PROTOCOL_WRITER_CAPACITY", "not-a-number");
        let config = CodecConfig::from_env().unwrap();
        assert_eq!(config.wire.protocol_version, 763);
        assert_eq!(config.wire.writer_initial_capacity, WRITER_INITIAL_CAPACITY);

        std::env::set_var("CRAFT_PROTOCOL_VERSION", "modern");
        assert!(matches!(
            CodecConfig::from_env(),
            Err(CodecError::ConfigError(_))
        ));

        std::env::remove_var("CRAFT_PROTOCOL_VERSION");
        std::env::remove_var("CRAFT_PROTOCOL_WRITER_CAPACITY");
    }
}
