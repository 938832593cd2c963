//! # scriptexec engine
//!
//! Hosts many independent application instances on one shared key-value store.
//!
//! An instance is identified by an [`ExecutionId`](scriptexec_primitives::ExecutionId)
//! and owns a private storage region. Calls carry a 4-byte selector; the
//! [`DispatchEngine`] resolves it to one stateless [`Application`] handler,
//! lets the handler read state and describe its writes, and commits the
//! resulting [`WriteSet`] atomically:
//!
//! - `Committed`: writes, payments and domain events applied
//! - `DomainRejected`: nothing applied, one `ApplicationException` logged
//! - `Err(EngineError)`: nothing applied and nothing logged
//!
//! Applications are published in a registry instance ([`ApplicationRegistry`])
//! and instantiated from it by name, either directly or through a
//! [`ScriptExec`] front end that remembers the default registry and provider.
//!
//! ```
//! use scriptexec_engine::DispatchEngine;
//!
//! let mut engine = DispatchEngine::in_memory();
//! let (index, provider) = engine.deploy_registry();
//! let registry = engine.create_registry(index, provider).unwrap();
//! assert!(engine.registry(&registry.execution_id).is_ok());
//! ```

pub mod abi;
pub mod application;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod reason;
pub mod receipt;
pub mod registry;
pub mod script_exec;
pub mod write_set;

pub use abi::{CalldataBuilder, CalldataReader, WORD_SIZE};
pub use application::{Application, ImplementationTable};
pub use context::{ExecutionContext, StorageView};
pub use dispatch::{DispatchEngine, Invocation};
pub use error::{EngineError, EngineResult};
pub use event::{Event, LogRecord, Payment};
pub use lifecycle::{InstanceRecord, InstanceState, LifecycleController, Operation, RegistryBinding};
pub use reason::ReasonCode;
pub use receipt::{DispatchOutcome, ExecReceipt, InstanceReceipt};
pub use registry::{
    AppName, ApplicationRecord, ApplicationRegistry, Registration, RegistryIndex, RegistryProvider,
};
pub use script_exec::ScriptExec;
pub use write_set::{AppOutcome, WriteSet};
