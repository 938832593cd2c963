//! # scriptexec
//!
//! A multi-tenant storage and dispatch engine. Many application instances
//! share one key-value store, each isolated under its own execution ID, and
//! every call is resolved through a selector table to a stateless handler
//! whose writes are committed atomically.
//!
//! This crate bundles the workspace:
//!
//! - [`primitives`] - hashes, addresses, selectors and execution IDs
//! - [`store`] - storage locations and the `Store` backends
//! - [`config`] - engine settings loaded from TOML
//! - [`engine`] - lifecycle, registry and the dispatch engine
//! - [`apps`] - the DutchCrowdsale reference application
//!
//! ## Quick Start
//!
//! ```rust
//! use scriptexec::prelude::*;
//!
//! let mut engine = DispatchEngine::in_memory();
//! let (index, provider) = engine.deploy_registry();
//! let registry = engine.create_registry(index, provider).unwrap().execution_id;
//!
//! let suite = CrowdsaleSuite::deploy(&mut engine);
//! let outcome = suite
//!     .register(&mut engine, Address::derive(b"provider"), registry)
//!     .unwrap();
//! assert!(outcome.is_committed());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub use scriptexec_apps as apps;
pub use scriptexec_config as config;
pub use scriptexec_engine as engine;
pub use scriptexec_primitives as primitives;
pub use scriptexec_store as store;

/// Common imports for engine users
pub mod prelude {
    pub use crate::apps::{CrowdsaleSuite, InitParams, APP_NAME};
    pub use crate::config::EngineSettings;
    pub use crate::engine::{
        Application, DispatchEngine, DispatchOutcome, EngineError, EngineResult, Invocation,
        ScriptExec,
    };
    pub use crate::primitives::{Address, ExecutionId, Selector, H256};
    pub use crate::store::{MemoryStore, Store};
}
