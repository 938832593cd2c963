//! Function selectors: the first four bytes of the Keccak-256 hash of a signature.

use crate::hash::keccak256;
use crate::{PrimitiveError, PrimitiveResult, H256};

/// The length of `Selector` values in bytes.
pub const SELECTOR_SIZE: usize = 4;

/// Identifies a callable operation inside calldata.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Selector(pub(crate) [u8; SELECTOR_SIZE]);

impl_fixed_bytes!(Selector, SELECTOR_SIZE);

impl Selector {
    /// Computes the selector for a canonical signature such as `transfer(address,uint256)`.
    #[must_use]
    pub fn from_signature(signature: &str) -> Self {
        let digest = keccak256(signature.as_bytes());
        let mut out = [0u8; SELECTOR_SIZE];
        out.copy_from_slice(&digest.as_bytes()[..SELECTOR_SIZE]);
        Self(out)
    }

    /// Encodes the selector left-aligned in a word, as `bytes4` is laid out.
    #[must_use]
    pub fn to_word(&self) -> H256 {
        let mut out = [0u8; 32];
        out[..SELECTOR_SIZE].copy_from_slice(&self.0);
        H256::new(out)
    }

    /// Decodes a left-aligned `bytes4` word.
    ///
    /// # Errors
    ///
    /// Returns `PrimitiveError::OutOfRange` if any byte past the fourth is set.
    pub fn from_word(word: &H256) -> PrimitiveResult<Self> {
        let bytes = word.as_bytes();
        if bytes[SELECTOR_SIZE..].iter().any(|b| *b != 0) {
            return Err(PrimitiveError::out_of_range("bytes4"));
        }
        Self::from_slice(&bytes[..SELECTOR_SIZE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_selectors() {
        assert_eq!(
            Selector::from_signature("transfer(address,uint256)").to_string(),
            "0xa9059cbb"
        );
        assert_eq!(
            Selector::from_signature("approve(address,uint256)").to_string(),
            "0x095ea7b3"
        );
        assert_eq!(
            Selector::from_signature("transferFrom(address,address,uint256)").to_string(),
            "0x23b872dd"
        );
    }

    #[test]
    fn test_word_round_trip() {
        let selector = Selector::from_signature("buy()");
        let word = selector.to_word();
        assert_eq!(Selector::from_word(&word).unwrap(), selector);
        assert!(Selector::from_word(&H256::from_u64(1)).is_err());
    }
}
