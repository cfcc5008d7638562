//! Errors raised while loading or validating ctxlog settings

use std::path::PathBuf;
use thiserror::Error;

/// Why a ctxlog configuration could not be used.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read ctxlog config: {0}")]
    Io(#[from] std::io::Error),

    #[error("ctxlog config file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("invalid ctxlog config TOML: {0}")]
    Parse(String),

    #[error("logging setting '{field}' rejected: {message}")]
    Validation { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_path() {
        let err = ConfigError::NotFound(PathBuf::from("/etc/ctxlog.toml"));
        assert_eq!(
            err.to_string(),
            "ctxlog config file /etc/ctxlog.toml does not exist"
        );
    }

    #[test]
    fn test_validation_names_the_field() {
        let err = ConfigError::Validation {
            field: "logging.level".to_string(),
            message: "must be one of trace, debug, info, warn, error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "logging setting 'logging.level' rejected: must be one of trace, debug, info, warn, error"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: ConfigError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.to_string(), "cannot read ctxlog config: denied");
    }
}
