use std::collections::BTreeMap;

use scriptexec_primitives::H256;

use crate::location::StorageLocation;

/// Immutable, ordered copy of a `MemoryStore`'s contents.
///
/// Two snapshots compare equal exactly when the stores held the same non-zero words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    entries: BTreeMap<StorageLocation, H256>,
}

impl MemorySnapshot {
    pub(crate) fn from_map(entries: &BTreeMap<StorageLocation, H256>) -> Self {
        Self {
            entries: entries.clone(),
        }
    }

    pub fn get(&self, location: &StorageLocation) -> H256 {
        self.entries.get(location).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StorageLocation, &H256)> {
        self.entries.iter()
    }

    /// Canonical byte image: every `(location, value)` pair in location order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.entries.len() * 64);
        for (location, value) in &self.entries {
            out.extend_from_slice(location.as_word().as_bytes());
            out.extend_from_slice(value.as_bytes());
        }
        out
    }
}
