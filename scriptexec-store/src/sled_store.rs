use std::path::Path;

use scriptexec_primitives::H256;
use sled::{Batch, Db};
use tracing::{debug, info, warn};

use crate::{
    error::{StoreError, StoreResult},
    location::StorageLocation,
    traits::{BatchOp, Store, WriteBatch},
};

/// Persistent store backed by the `sled` embedded database.
///
/// Keys are the 32 location bytes, values the 32 word bytes. A `WriteBatch`
/// maps onto one `sled::Batch`, which sled applies atomically.
pub struct SledStore {
    db: Db,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|err| StoreError::backend(err.to_string()))?;
        info!(path = %path.display(), recovered = db.was_recovered(), "opened sled store");
        Ok(Self { db })
    }

    /// Opens a throwaway database that is removed when dropped.
    pub fn temporary() -> StoreResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|err| StoreError::backend(err.to_string()))?;
        Ok(Self { db })
    }

    /// Blocks until every applied batch is on disk.
    pub fn flush(&self) -> StoreResult<()> {
        self.db
            .flush()
            .map_err(|err| StoreError::backend(err.to_string()))?;
        Ok(())
    }
}

impl Store for SledStore {
    fn read(&self, location: &StorageLocation) -> StoreResult<H256> {
        let stored = self
            .db
            .get(location.as_word().as_bytes())
            .map_err(|err| StoreError::backend(err.to_string()))?;
        match stored {
            Some(bytes) => H256::from_slice(bytes.as_ref())
                .map_err(|_| StoreError::corrupted(*location, bytes.len())),
            None => Ok(H256::ZERO),
        }
    }

    fn write(&self, location: StorageLocation, value: H256) -> StoreResult<()> {
        let mut batch = WriteBatch::new();
        batch.put(location, value);
        self.write_batch(batch)
    }

    fn write_batch(&self, batch: WriteBatch) -> StoreResult<()> {
        debug!(ops = batch.len(), "applying sled batch");
        let mut sled_batch = Batch::default();
        for op in batch.into_ops() {
            match op {
                BatchOp::Put { location, value } => {
                    sled_batch.insert(
                        location.as_word().as_bytes().as_slice(),
                        value.as_bytes().as_slice(),
                    );
                }
                BatchOp::Delete { location } => {
                    sled_batch.remove(location.as_word().as_bytes().as_slice());
                }
            }
        }

        self.db
            .apply_batch(sled_batch)
            .map_err(|err| StoreError::backend(err.to_string()))?;
        // The batch is visible from here on, so a failed flush does not fail the write.
        if let Err(err) = self.flush() {
            warn!(error = %err, "flush after applied batch failed");
        }
        Ok(())
    }
}
