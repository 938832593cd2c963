use scriptexec_primitives::{ExecutionId, H256};

use crate::error::StoreResult;
use crate::location::{FieldKey, Namespace, StorageLocation};

/// Operation to be applied via a write batch.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BatchOp {
    Put {
        location: StorageLocation,
        value: H256,
    },
    Delete {
        location: StorageLocation,
    },
}

impl BatchOp {
    #[inline]
    pub fn location(&self) -> &StorageLocation {
        match self {
            BatchOp::Put { location, .. } | BatchOp::Delete { location } => location,
        }
    }
}

/// Ordered set of operations that should be applied atomically.
///
/// Writing the zero word is recorded as a delete: absent locations read as zero.
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    #[inline]
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    #[inline]
    pub fn put(&mut self, location: StorageLocation, value: H256) {
        if value.is_zero() {
            self.ops.push(BatchOp::Delete { location });
        } else {
            self.ops.push(BatchOp::Put { location, value });
        }
    }

    /// Stages a write to a derived field location.
    #[inline]
    pub fn put_field(
        &mut self,
        namespace: Namespace,
        execution_id: &ExecutionId,
        field: &FieldKey,
        value: H256,
    ) {
        self.put(StorageLocation::derive(namespace, execution_id, field), value);
    }

    #[inline]
    pub fn delete(&mut self, location: StorageLocation) {
        self.ops.push(BatchOp::Delete { location });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn operations(&self) -> &[BatchOp] {
        &self.ops
    }

    #[inline]
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }

    /// Appends every operation of `other`, preserving order.
    #[inline]
    pub fn extend(&mut self, other: WriteBatch) {
        self.ops.extend(other.ops);
    }
}

/// Abstraction exposed by storage backends.
///
/// Locations that were never written (or were written with zero) read as `H256::ZERO`.
pub trait Store: Send + Sync {
    fn read(&self, location: &StorageLocation) -> StoreResult<H256>;

    fn write(&self, location: StorageLocation, value: H256) -> StoreResult<()>;

    /// Applies every operation of `batch` or none of them.
    fn write_batch(&self, batch: WriteBatch) -> StoreResult<()>;
}

/// Convenience helpers for reading derived field locations.
pub trait StoreExt: Store {
    fn read_field(
        &self,
        namespace: Namespace,
        execution_id: &ExecutionId,
        field: &FieldKey,
    ) -> StoreResult<H256> {
        self.read(&StorageLocation::derive(namespace, execution_id, field))
    }

    fn write_field(
        &self,
        namespace: Namespace,
        execution_id: &ExecutionId,
        field: &FieldKey,
        value: H256,
    ) -> StoreResult<()> {
        self.write(StorageLocation::derive(namespace, execution_id, field), value)
    }
}

impl<T: Store + ?Sized> StoreExt for T {}
