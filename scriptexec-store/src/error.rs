use thiserror::Error;

use crate::location::StorageLocation;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store: corrupted value at {location}: expected 32 bytes, got {len}")]
    Corrupted { location: StorageLocation, len: usize },

    #[error("store: backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    #[inline]
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }

    #[inline]
    pub fn corrupted(location: StorageLocation, len: usize) -> Self {
        StoreError::Corrupted { location, len }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
