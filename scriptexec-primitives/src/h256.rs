//! Implementation of `H256`, the 256-bit storage word.
//!
//! Numeric conversions are big-endian: `H256::from_u128(1)` has its last byte set.

use crate::{Address, PrimitiveError, PrimitiveResult};

/// The length of `H256` values in bytes.
pub const H256_SIZE: usize = 32;

/// A 256-bit word. Used for storage locations, storage values and hashes.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct H256(pub(crate) [u8; H256_SIZE]);

impl_fixed_bytes!(H256, H256_SIZE);

impl H256 {
    /// The all-zero word.
    pub const ZERO: H256 = H256([0u8; H256_SIZE]);

    /// Returns the zero word.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// Checks if every byte is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self::from_u128(u128::from(value))
    }

    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        let mut out = [0u8; H256_SIZE];
        out[16..].copy_from_slice(&value.to_be_bytes());
        Self(out)
    }

    /// Interprets the word as an unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns `PrimitiveError::OutOfRange` if any of the high 16 bytes are set.
    pub fn to_u128(&self) -> PrimitiveResult<u128> {
        if self.0[..16].iter().any(|b| *b != 0) {
            return Err(PrimitiveError::out_of_range("u128"));
        }
        let mut buf = [0u8; 16];
        buf.copy_from_slice(&self.0[16..]);
        Ok(u128::from_be_bytes(buf))
    }

    /// Interprets the word as a `u64`.
    ///
    /// # Errors
    ///
    /// Returns `PrimitiveError::OutOfRange` if the value does not fit.
    pub fn to_u64(&self) -> PrimitiveResult<u64> {
        let wide = self.to_u128()?;
        u64::try_from(wide).map_err(|_| PrimitiveError::out_of_range("u64"))
    }

    /// Right-aligns an address inside a word.
    #[must_use]
    pub fn from_address(address: &Address) -> Self {
        let mut out = [0u8; H256_SIZE];
        out[12..].copy_from_slice(address.as_bytes());
        Self(out)
    }

    /// Extracts a right-aligned address.
    ///
    /// # Errors
    ///
    /// Returns `PrimitiveError::OutOfRange` if the high 12 bytes are not zero.
    pub fn to_address(&self) -> PrimitiveResult<Address> {
        if self.0[..12].iter().any(|b| *b != 0) {
            return Err(PrimitiveError::out_of_range("address"));
        }
        Address::from_slice(&self.0[12..])
    }

    #[must_use]
    pub fn from_bool(value: bool) -> Self {
        Self::from_u64(u64::from(value))
    }

    /// Any non-zero word is true.
    #[must_use]
    pub fn to_bool(&self) -> bool {
        !self.is_zero()
    }

    /// Left-aligns up to 32 bytes inside a word, zero padding on the right.
    ///
    /// # Errors
    ///
    /// Returns `PrimitiveError::InvalidLength` if `bytes` is longer than 32.
    pub fn from_left_bytes(bytes: &[u8]) -> PrimitiveResult<Self> {
        if bytes.len() > H256_SIZE {
            return Err(PrimitiveError::invalid_length(H256_SIZE, bytes.len()));
        }
        let mut out = [0u8; H256_SIZE];
        out[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(out))
    }
}

impl From<u64> for H256 {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u128> for H256 {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl From<bool> for H256 {
    fn from(value: bool) -> Self {
        Self::from_bool(value)
    }
}

impl From<Address> for H256 {
    fn from(value: Address) -> Self {
        Self::from_address(&value)
    }
}
