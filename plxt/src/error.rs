//! Error handling module for the plxt CLI.
//!
//! This module provides custom error types using `thiserror` for
//! structured error handling throughout the application.

use thiserror::Error;

/// Main error type for the plxt CLI application.
#[derive(Error, Debug)]
pub enum PlxtError {
    /// Error when a required configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error when input validation fails.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error raised by the generator pipeline.
    #[error(transparent)]
    Driver(#[from] plx_drv::DriverError),

    /// Error when artefact IO fails.
    #[error(transparent)]
    Artifact(#[from] plx_drv::ArtifactError),

    /// Error when IO operations fail.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error when the config file fails to parse.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias using PlxtError.
pub type Result<T> = std::result::Result<T, PlxtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = PlxtError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_validation_error_display() {
        let err = PlxtError::Validation("invalid format".to_string());
        assert_eq!(err.to_string(), "Validation error: invalid format");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let plxt_err: PlxtError = io_err.into();
        assert!(matches!(plxt_err, PlxtError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("not = = toml").unwrap_err();
        let plxt_err: PlxtError = toml_err.into();
        assert!(matches!(plxt_err, PlxtError::Toml(_)));
    }
}
