//! Structured logging with request-scoped metadata
//!
//! This module provides the context-data store, the [`Logger`] that reads it
//! back on every call, request field extraction, request ID generation and the
//! `tracing` subscriber setup.

pub mod context_data;
pub mod fields;
pub mod format;
pub mod logger;
pub mod middleware;

pub use context_data::{
    build_context_data_and_set_value, context_data, set_context_data_and_set_value, Carrier,
    ContextData, ContextDataKey, CONTEXT_DATA_MAP_KEY, CONTEXT_ID_KEY,
};
pub use fields::RequestFields;
pub use format::sprintf;
pub use logger::{Level, LogEntry, LogSink, Logger, MemorySink, TracingSink};
pub use middleware::{context_middleware, generate_request_id, REQUEST_ID_HEADER};

use crate::config::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Errors raised while installing the global subscriber
#[derive(Error, Debug)]
pub enum InitError {
    #[error("Invalid log filter '{directives}': {source}")]
    Filter {
        directives: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to install tracing subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Build filter directives string from LoggingConfig
///
/// Constructs a tracing filter string that includes the base log level
/// and any component-specific log levels configured in the LoggingConfig.
///
/// # Returns
///
/// A filter string in the format: "base_level,ctxlog::component1=level1,ctxlog::component2=level2"
///
/// # Examples
///
/// ```
/// use ctxlog::config::LoggingConfig;
/// use ctxlog::logging::build_filter_directives;
/// use std::collections::BTreeMap;
///
/// let mut component_levels = BTreeMap::new();
/// component_levels.insert("logging".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     component_levels: Some(component_levels),
///     ..LoggingConfig::default()
/// };
///
/// let filter_str = build_filter_directives(&config);
/// assert_eq!(filter_str, "info,ctxlog::logging=debug");
/// ```
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        for (component, level) in component_levels {
            filter_str.push_str(&format!(",ctxlog::{}={}", component, level));
        }
    }

    filter_str
}

/// Initialize tracing based on configuration
///
/// `RUST_LOG`, when set, takes precedence over the configured levels.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), InitError> {
    let filter_str = build_filter_directives(config);

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&filter_str).map_err(|source| InitError::Filter {
            directives: filter_str.clone(),
            source,
        })?,
    };

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}
