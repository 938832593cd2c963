//! Storage backend selection.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

/// Which `Store` implementation a binary should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sled,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database directory, required for persistent backends
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StorageSettings {
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a persistent backend has no path.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.backend == StorageBackend::Sled && self.path.is_none() {
            return Err(ConfigError::invalid(
                "storage.path",
                "required when backend is 'sled'",
            ));
        }
        Ok(())
    }
}
