//! Error types for primitive parsing and conversion.

use thiserror::Error;

/// Errors raised while constructing primitive values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Input slice has the wrong length for the target type.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Input string is not valid hexadecimal.
    #[error("Invalid hex string: {message}")]
    InvalidHex { message: String },

    /// Word does not fit into the requested narrower type.
    #[error("Value out of range for {target}")]
    OutOfRange { target: &'static str },
}

impl PrimitiveError {
    /// Create an invalid length error
    pub fn invalid_length(expected: usize, actual: usize) -> Self {
        Self::InvalidLength { expected, actual }
    }

    /// Create an invalid hex error
    pub fn invalid_hex<S: Into<String>>(message: S) -> Self {
        Self::InvalidHex {
            message: message.into(),
        }
    }

    /// Create an out of range error
    pub fn out_of_range(target: &'static str) -> Self {
        Self::OutOfRange { target }
    }
}

/// Result type for primitive operations
pub type PrimitiveResult<T> = Result<T, PrimitiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrimitiveError::invalid_length(32, 7);
        assert_eq!(err.to_string(), "Invalid length: expected 32 bytes, got 7");

        let err = PrimitiveError::invalid_hex("odd number of digits");
        assert!(err.to_string().contains("odd number"));

        let err = PrimitiveError::out_of_range("u128");
        assert_eq!(err.to_string(), "Value out of range for u128");
    }
}
