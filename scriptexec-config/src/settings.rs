//! Top-level engine settings and their TOML persistence.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::limits::ExecutionLimits;
use crate::logging::LoggingSettings;
use crate::storage::StorageSettings;

/// Complete engine configuration
///
/// Every section is optional in TOML; missing values take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Per-call limits
    #[serde(default)]
    pub limits: ExecutionLimits,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageSettings,
}

impl EngineSettings {
    /// Parses settings from TOML text and validates them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and `ConfigError::Invalid`
    /// for out-of-range values.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let settings: EngineSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as `from_toml_str`.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let settings = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "loaded engine settings");
        Ok(settings)
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` or `ConfigError::Io`.
    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::io(path, e))?;
        Ok(())
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError::Invalid` found.
    pub fn validate(&self) -> ConfigResult<()> {
        self.limits.validate()?;
        self.logging.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;
    use crate::storage::StorageBackend;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings = EngineSettings::from_toml_str("").unwrap();
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn test_partial_sections() {
        let settings = EngineSettings::from_toml_str(
            r#"
            [limits]
            max_events_per_call = 8

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(settings.limits.max_events_per_call, 8);
        assert_eq!(settings.limits.max_storage_writes_per_call, 1024);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(EngineSettings::from_toml_str("[limits]\nmax_selectors_per_app = 0").is_err());
        assert!(EngineSettings::from_toml_str("[storage]\nbackend = \"sled\"").is_err());
        assert!(matches!(
            EngineSettings::from_toml_str("[logging]\nformat = \"xml\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");

        let mut settings = EngineSettings::default();
        settings.limits.max_payments_per_call = 3;
        settings.storage.backend = StorageBackend::Sled;
        settings.storage.path = Some(dir.path().join("db"));
        settings.save_to_file(&path).unwrap();

        let loaded = EngineSettings::load_from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineSettings::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
