//! Keccak-256 hashing helpers.

use crate::H256;
use sha3::{Digest, Keccak256};

/// Computes the Keccak-256 digest of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> H256 {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    H256::new(out)
}

/// Computes the Keccak-256 digest over several slices without concatenating them first.
#[must_use]
pub fn keccak256_concat<'a, I>(parts: I) -> H256
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    H256::new(out)
}
