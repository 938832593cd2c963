//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, saving or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML content did not match the settings schema.
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Settings could not be rendered as TOML.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside its permitted range.
    #[error("Invalid setting {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    /// Create an I/O error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid value error
    pub fn invalid<S: Into<String>>(field: &'static str, message: S) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
