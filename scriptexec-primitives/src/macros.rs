//! Shared trait impls for fixed-size byte newtypes.

/// Implements hex parsing, formatting and serde for a `struct Name(pub(crate) [u8; LEN])`.
macro_rules! impl_fixed_bytes {
    ($name:ident, $len:expr) => {
        impl $name {
            /// Size of the value in bytes.
            pub const LENGTH: usize = $len;

            /// Wraps raw bytes.
            #[inline]
            #[must_use]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Returns the underlying bytes.
            #[inline]
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Returns a copy of the underlying bytes.
            #[inline]
            #[must_use]
            pub const fn to_array(&self) -> [u8; $len] {
                self.0
            }

            /// Builds a value from a slice of exactly the right length.
            ///
            /// # Errors
            ///
            /// Returns `PrimitiveError::InvalidLength` if the slice is not exactly the type's size.
            pub fn from_slice(value: &[u8]) -> $crate::PrimitiveResult<Self> {
                if value.len() != $len {
                    return Err($crate::PrimitiveError::invalid_length($len, value.len()));
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(value);
                Ok(Self(out))
            }

            /// Parses a hex string, with or without a `0x` prefix.
            ///
            /// # Errors
            ///
            /// Returns `PrimitiveError::InvalidHex` for non-hex input and
            /// `PrimitiveError::InvalidLength` when the decoded length is wrong.
            pub fn parse(s: &str) -> $crate::PrimitiveResult<Self> {
                let trimmed = s
                    .strip_prefix("0x")
                    .or_else(|| s.strip_prefix("0X"))
                    .unwrap_or(s);
                let bytes = hex::decode(trimmed)
                    .map_err(|e| $crate::PrimitiveError::invalid_hex(e.to_string()))?;
                Self::from_slice(&bytes)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex::encode(self.0))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::PrimitiveError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}
