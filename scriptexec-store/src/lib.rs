//! Storage abstractions backing the scriptexec engine.
//!
//! The store is a flat mapping from 256-bit [`StorageLocation`]s to 256-bit
//! words. Locations are never chosen by callers directly: they are derived from
//! a [`Namespace`], an execution ID and a [`FieldKey`] path, which keeps every
//! application instance in its own region of the one shared map.
//!
//! An in-memory implementation is always available; a sled-backed persistent
//! store is enabled with the `sled` feature. Both share the [`Store`] trait.

mod error;
mod location;
mod memory;
#[cfg(feature = "sled")]
mod sled_store;
mod traits;

pub use error::{StoreError, StoreResult};
pub use location::{FieldKey, Namespace, StorageLocation};
pub use memory::{MemorySnapshot, MemoryStore};
#[cfg(feature = "sled")]
pub use sled_store::SledStore;
pub use traits::{BatchOp, Store, StoreExt, WriteBatch};
