//! Reason codes carried by `ApplicationException` events.

use std::borrow::Cow;
use std::fmt;

use scriptexec_primitives::H256;
use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// Short printable ASCII reason string, at most 32 bytes, so it fits one word.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReasonCode(Cow<'static, str>);

impl ReasonCode {
    /// Maximum encoded length.
    pub const MAX_LEN: usize = 32;

    pub const NO_WEI_SENT: ReasonCode = ReasonCode::from_static("NoWeiSent");
    pub const TRANSFERS_LOCKED: ReasonCode = ReasonCode::from_static("TransfersLocked");
    pub const INVALID_SENDER_OR_RECIPIENT: ReasonCode =
        ReasonCode::from_static("InvalidSenderOrRecipient");
    pub const DEFAULT_EXCEPTION: ReasonCode = ReasonCode::from_static("DefaultException");
    pub const INSUFFICIENT_BALANCE: ReasonCode = ReasonCode::from_static("InsufficientBalance");
    pub const INSUFFICIENT_ALLOWANCE: ReasonCode =
        ReasonCode::from_static("InsufficientAllowance");
    pub const NO_INIT_ROUTINE: ReasonCode = ReasonCode::from_static("NoInitRoutine");

    /// Builds a code from a literal. Invalid literals fail at compile time when
    /// used in a `const`.
    ///
    /// # Panics
    ///
    /// Panics if `code` is empty, longer than 32 bytes, or not printable ASCII.
    pub const fn from_static(code: &'static str) -> Self {
        assert!(is_valid(code.as_bytes()), "invalid reason code");
        Self(Cow::Borrowed(code))
    }

    /// Builds a code from runtime text.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MalformedCalldata` if the text is not a valid code.
    pub fn new(code: impl Into<String>) -> EngineResult<Self> {
        let code = code.into();
        if !is_valid(code.as_bytes()) {
            return Err(EngineError::malformed(format!("invalid reason code '{code}'")));
        }
        Ok(Self(Cow::Owned(code)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Left-aligned word encoding, as the code is laid out in a log.
    pub fn to_word(&self) -> H256 {
        let mut out = [0u8; 32];
        out[..self.0.len()].copy_from_slice(self.0.as_bytes());
        H256::new(out)
    }
}

const fn is_valid(bytes: &[u8]) -> bool {
    if bytes.is_empty() || bytes.len() > ReasonCode::MAX_LEN {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_graphic() {
            return false;
        }
        i += 1;
    }
    true
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReasonCode({})", self.0)
    }
}

impl PartialEq<str> for ReasonCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ReasonCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_codes() {
        assert_eq!(ReasonCode::NO_WEI_SENT, "NoWeiSent");
        assert_eq!(ReasonCode::TRANSFERS_LOCKED.as_str(), "TransfersLocked");
        assert_eq!(ReasonCode::DEFAULT_EXCEPTION.to_string(), "DefaultException");
    }

    #[test]
    fn test_runtime_validation() {
        assert!(ReasonCode::new("SoldOut").is_ok());
        assert!(ReasonCode::new("").is_err());
        assert!(ReasonCode::new("has space").is_err());
        assert!(ReasonCode::new("x".repeat(33)).is_err());
        assert!(ReasonCode::new("x".repeat(32)).is_ok());
    }

    #[test]
    fn test_word_encoding() {
        let word = ReasonCode::NO_WEI_SENT.to_word();
        assert_eq!(&word.as_bytes()[..9], b"NoWeiSent");
        assert!(word.as_bytes()[9..].iter().all(|b| *b == 0));
    }

    #[test]
    #[should_panic(expected = "invalid reason code")]
    fn test_from_static_rejects_bad_literal() {
        let _ = ReasonCode::from_static("not valid");
    }
}
