//! Execution IDs: the tenancy key of every application instance.

use crate::{PrimitiveResult, H256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque 256-bit handle minted once per application instance.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(H256);

impl ExecutionId {
    /// The reserved zero ID. Never minted for an instance; engine-wide state lives under it.
    pub const GLOBAL: ExecutionId = ExecutionId(H256::ZERO);

    #[inline]
    #[must_use]
    pub const fn new(word: H256) -> Self {
        Self(word)
    }

    /// Returns the ID as a storage word.
    #[inline]
    #[must_use]
    pub const fn as_word(&self) -> &H256 {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parses a hex-encoded ID.
    ///
    /// # Errors
    ///
    /// Returns the underlying `PrimitiveError` for malformed input.
    pub fn parse(s: &str) -> PrimitiveResult<Self> {
        H256::parse(s).map(Self)
    }
}

impl From<H256> for ExecutionId {
    fn from(word: H256) -> Self {
        Self(word)
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecutionId({})", self.0)
    }
}

impl FromStr for ExecutionId {
    type Err = crate::PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
