//! Configuration module for ctxlog
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`CTXLOG_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use ctxlog::config::CtxlogConfig;
//!
//! let toml = r#"
//! [logging]
//! level = "debug"
//! format = "json"
//! "#;
//! let config: CtxlogConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.logging.level, "debug");
//! ```

pub mod error;
pub mod logging;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Log levels accepted by the `tracing` filter syntax
const VALID_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CtxlogConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl CtxlogConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports CTXLOG_* environment variables for logging settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("CTXLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CTXLOG_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }
        if let Ok(label) = std::env::var("CTXLOG_LABEL") {
            if !label.is_empty() {
                self.logging.label = label;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_level(&self.logging.level) {
            return Err(ConfigError::Validation {
                field: "logging.level".to_string(),
                message: format!("unknown level '{}'", self.logging.level),
            });
        }

        if self.logging.label.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "logging.label".to_string(),
                message: "label cannot be empty".to_string(),
            });
        }

        if let Some(component_levels) = &self.logging.component_levels {
            for (component, level) in component_levels {
                if !is_valid_level(level) {
                    return Err(ConfigError::Validation {
                        field: format!("logging.component_levels.{}", component),
                        message: format!("unknown level '{}'", level),
                    });
                }
            }
        }

        Ok(())
    }
}

fn is_valid_level(level: &str) -> bool {
    VALID_LEVELS.contains(&level.to_lowercase().as_str())
}
