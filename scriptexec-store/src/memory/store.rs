use std::collections::BTreeMap;

use parking_lot::RwLock;
use scriptexec_primitives::H256;
use tracing::trace;

use super::snapshot::MemorySnapshot;
use crate::error::StoreResult;
use crate::location::StorageLocation;
use crate::traits::{BatchOp, Store, WriteBatch};

/// In-memory store used for tests, simulations and the default engine.
///
/// A batch is applied while holding the write lock, so readers never observe a
/// partially applied batch.
#[derive(Default)]
pub struct MemoryStore {
    words: RwLock<BTreeMap<StorageLocation, H256>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot::from_map(&self.words.read())
    }

    /// Number of non-zero words held.
    pub fn len(&self) -> usize {
        self.words.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.read().is_empty()
    }

    fn apply(words: &mut BTreeMap<StorageLocation, H256>, location: StorageLocation, value: H256) {
        if value.is_zero() {
            words.remove(&location);
        } else {
            words.insert(location, value);
        }
    }
}

impl Store for MemoryStore {
    fn read(&self, location: &StorageLocation) -> StoreResult<H256> {
        Ok(self.words.read().get(location).copied().unwrap_or_default())
    }

    fn write(&self, location: StorageLocation, value: H256) -> StoreResult<()> {
        Self::apply(&mut self.words.write(), location, value);
        Ok(())
    }

    fn write_batch(&self, batch: WriteBatch) -> StoreResult<()> {
        trace!(ops = batch.len(), "applying memory batch");
        let mut words = self.words.write();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { location, value } => Self::apply(&mut words, location, value),
                BatchOp::Delete { location } => {
                    words.remove(&location);
                }
            }
        }

        Ok(())
    }
}
