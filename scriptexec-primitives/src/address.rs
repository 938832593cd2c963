//! Implementation of `Address`, a 160-bit account or implementation identifier.

use crate::hash::keccak256;

/// The length of `Address` values in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// A 20-byte address identifying a caller or a deployed implementation.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub(crate) [u8; ADDRESS_SIZE]);

impl_fixed_bytes!(Address, ADDRESS_SIZE);

impl Address {
    /// The zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_SIZE]);

    /// Returns the zero address.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Checks if this address is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Derives a deterministic address from a seed: the low 20 bytes of `keccak256(seed)`.
    ///
    /// Used for implementation addresses and for well-known test identities.
    #[must_use]
    pub fn derive(seed: &[u8]) -> Self {
        let digest = keccak256(seed);
        let mut out = [0u8; ADDRESS_SIZE];
        out.copy_from_slice(&digest.as_bytes()[12..]);
        Self(out)
    }
}
