//! Configuration for the scriptexec engine and its binaries.
//!
//! Settings are plain serde structs with per-field defaults, so a TOML file
//! only needs the values it overrides:
//!
//! ```
//! use scriptexec_config::EngineSettings;
//!
//! let settings = EngineSettings::from_toml_str("[limits]\nmax_events_per_call = 32").unwrap();
//! assert_eq!(settings.limits.max_events_per_call, 32);
//! ```

pub mod error;
pub mod limits;
pub mod logging;
pub mod settings;
pub mod storage;

pub use error::{ConfigError, ConfigResult};
pub use limits::ExecutionLimits;
pub use logging::{LogFormat, LoggingSettings};
pub use settings::EngineSettings;
pub use storage::{StorageBackend, StorageSettings};
