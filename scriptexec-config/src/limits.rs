//! Per-call resource limits enforced by the dispatch engine.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Upper bounds on what a single call may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLimits {
    /// Maximum storage writes committed by one call
    #[serde(default = "default_max_storage_writes")]
    pub max_storage_writes_per_call: usize,

    /// Maximum domain events emitted by one call
    #[serde(default = "default_max_events")]
    pub max_events_per_call: usize,

    /// Maximum payment instructions in one call
    #[serde(default = "default_max_payments")]
    pub max_payments_per_call: usize,

    /// Maximum selectors in one application registration
    #[serde(default = "default_max_selectors")]
    pub max_selectors_per_app: usize,
}

const fn default_max_storage_writes() -> usize {
    1024
}

const fn default_max_events() -> usize {
    256
}

const fn default_max_payments() -> usize {
    64
}

const fn default_max_selectors() -> usize {
    256
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_storage_writes_per_call: default_max_storage_writes(),
            max_events_per_call: default_max_events(),
            max_payments_per_call: default_max_payments(),
            max_selectors_per_app: default_max_selectors(),
        }
    }
}

impl ExecutionLimits {
    /// Rejects zero limits.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first zero limit.
    pub fn validate(&self) -> ConfigResult<()> {
        let checks = [
            ("limits.max_storage_writes_per_call", self.max_storage_writes_per_call),
            ("limits.max_events_per_call", self.max_events_per_call),
            ("limits.max_payments_per_call", self.max_payments_per_call),
            ("limits.max_selectors_per_app", self.max_selectors_per_app),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be greater than zero"));
            }
        }
        Ok(())
    }
}
