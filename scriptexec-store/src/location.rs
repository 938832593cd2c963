//! Storage location derivation.
//!
//! Every word in the store lives at `keccak256(tag ‖ namespace ‖ execution_id ‖ field)`.
//! Field paths are sequences of length-prefixed segments, so two different paths
//! never encode to the same bytes and the hash input is injective in
//! `(namespace, execution_id, field)`.

use std::fmt;

use scriptexec_primitives::{keccak256_concat, Address, ExecutionId, Selector, H256};
use serde::{Deserialize, Serialize};

/// Domain separation prefix for every derived location.
const LOCATION_TAG: &[u8] = b"scriptexec.location.v1";

/// Disjoint regions of the store.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Namespace {
    /// Engine-wide state (execution ID nonce, payment ledger). Always paired with `ExecutionId::GLOBAL`.
    Global = 0,
    /// Per-instance lifecycle metadata owned by the engine.
    Lifecycle = 1,
    /// Per-instance state owned by the instance's application handlers.
    Application = 2,
}

impl Namespace {
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Global => f.write_str("global"),
            Namespace::Lifecycle => f.write_str("lifecycle"),
            Namespace::Application => f.write_str("application"),
        }
    }
}

/// A semantic field path such as `balances/<owner>` inside one namespace.
///
/// Built fluently:
///
/// ```
/// use scriptexec_primitives::Address;
/// use scriptexec_store::FieldKey;
///
/// let owner = Address::derive(b"owner");
/// let key = FieldKey::new("balances").add_address(&owner);
/// assert_eq!(key.segments(), 2);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey {
    encoded: Vec<u8>,
    segments: usize,
}

impl FieldKey {
    /// Starts a path with a root segment.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            encoded: Vec::with_capacity(64),
            segments: 0,
        }
        .add(root.as_bytes())
    }

    /// Appends a raw segment.
    #[must_use]
    pub fn add(mut self, segment: &[u8]) -> Self {
        self.encoded
            .extend_from_slice(&(segment.len() as u64).to_be_bytes());
        self.encoded.extend_from_slice(segment);
        self.segments += 1;
        self
    }

    #[must_use]
    pub fn add_str(self, segment: &str) -> Self {
        self.add(segment.as_bytes())
    }

    #[must_use]
    pub fn add_address(self, address: &Address) -> Self {
        self.add(address.as_bytes())
    }

    #[must_use]
    pub fn add_word(self, word: &H256) -> Self {
        self.add(word.as_bytes())
    }

    #[must_use]
    pub fn add_selector(self, selector: &Selector) -> Self {
        self.add(selector.as_bytes())
    }

    /// Adds a u64 in big-endian format.
    #[must_use]
    pub fn add_u64(self, value: u64) -> Self {
        self.add(&value.to_be_bytes())
    }

    /// Gets the encoded path.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.encoded
    }

    /// Number of segments in the path.
    #[inline]
    #[must_use]
    pub const fn segments(&self) -> usize {
        self.segments
    }
}

impl fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(self.segments);
        let mut rest = self.encoded.as_slice();
        while rest.len() >= 8 {
            let mut len_bytes = [0u8; 8];
            len_bytes.copy_from_slice(&rest[..8]);
            let len = u64::from_be_bytes(len_bytes) as usize;
            let end = (8 + len).min(rest.len());
            let segment = &rest[8..end];
            match std::str::from_utf8(segment) {
                Ok(text) if text.chars().all(|c| c.is_ascii_graphic()) => parts.push(text.to_string()),
                _ => parts.push(format!("0x{}", hex::encode(segment))),
            }
            rest = &rest[end..];
        }
        write!(f, "FieldKey({})", parts.join("/"))
    }
}

/// A 256-bit storage location.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageLocation(H256);

impl StorageLocation {
    /// Derives the location of `field` for `execution_id` inside `namespace`.
    #[must_use]
    pub fn derive(namespace: Namespace, execution_id: &ExecutionId, field: &FieldKey) -> Self {
        let tag = [namespace.tag()];
        Self(keccak256_concat([
            LOCATION_TAG,
            tag.as_slice(),
            execution_id.as_word().as_bytes().as_slice(),
            field.as_bytes(),
        ]))
    }

    /// Wraps a raw word. Only backends reading persisted keys should need this.
    #[inline]
    #[must_use]
    pub const fn from_word(word: H256) -> Self {
        Self(word)
    }

    #[inline]
    #[must_use]
    pub const fn as_word(&self) -> &H256 {
        &self.0
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn exec(n: u64) -> ExecutionId {
        ExecutionId::new(H256::from_u64(n))
    }

    #[test]
    fn test_field_key_segments() {
        let key = FieldKey::new("allowed").add_address(&Address::zero()).add_u64(3);
        assert_eq!(key.segments(), 3);
        assert_eq!(key.as_bytes().len(), 8 + 7 + 8 + 20 + 8 + 8);
    }

    #[test]
    fn test_segment_boundaries_are_encoded() {
        let a = FieldKey::new("ab").add_str("c");
        let b = FieldKey::new("a").add_str("bc");
        assert_ne!(a, b);
        assert_ne!(
            StorageLocation::derive(Namespace::Application, &exec(1), &a),
            StorageLocation::derive(Namespace::Application, &exec(1), &b)
        );
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let key = FieldKey::new("state");
        let app = StorageLocation::derive(Namespace::Application, &exec(1), &key);
        let life = StorageLocation::derive(Namespace::Lifecycle, &exec(1), &key);
        assert_ne!(app, life);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let key = FieldKey::new("total_supply");
        assert_eq!(
            StorageLocation::derive(Namespace::Application, &exec(5), &key),
            StorageLocation::derive(Namespace::Application, &exec(5), &key)
        );
    }

    #[test]
    fn test_location_serializes_as_hex_word() {
        let location =
            StorageLocation::derive(Namespace::Global, &ExecutionId::GLOBAL, &FieldKey::new("nonce"));
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(json, format!("\"{}\"", location.as_word()));
        assert_eq!(serde_json::from_str::<StorageLocation>(&json).unwrap(), location);

        assert_eq!(serde_json::to_string(&Namespace::Lifecycle).unwrap(), "\"Lifecycle\"");
    }

    #[test]
    fn test_debug_renders_path() {
        let key = FieldKey::new("balances").add_u64(1);
        let rendered = format!("{key:?}");
        assert!(rendered.starts_with("FieldKey(balances/0x"));
    }

    proptest! {
        #[test]
        fn prop_distinct_executions_never_collide(
            a in 1u64..u64::MAX,
            b in 1u64..u64::MAX,
            path in proptest::collection::vec(any::<Vec<u8>>(), 1..4),
        ) {
            prop_assume!(a != b);
            let mut key = FieldKey::new("root");
            for segment in &path {
                key = key.add(segment);
            }
            prop_assert_ne!(
                StorageLocation::derive(Namespace::Application, &exec(a), &key),
                StorageLocation::derive(Namespace::Application, &exec(b), &key)
            );
        }

        #[test]
        fn prop_distinct_paths_never_collide(
            left in proptest::collection::vec(any::<Vec<u8>>(), 0..4),
            right in proptest::collection::vec(any::<Vec<u8>>(), 0..4),
        ) {
            prop_assume!(left != right);
            let build = |segments: &Vec<Vec<u8>>| {
                segments.iter().fold(FieldKey::new("root"), |key, s| key.add(s))
            };
            prop_assert_ne!(
                StorageLocation::derive(Namespace::Application, &exec(1), &build(&left)),
                StorageLocation::derive(Namespace::Application, &exec(1), &build(&right))
            );
        }
    }
}
