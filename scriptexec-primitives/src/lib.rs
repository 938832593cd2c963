//! # scriptexec primitives
//!
//! Fundamental value types shared by every scriptexec crate:
//! - `H256`: 256-bit word (storage values, storage locations, hashes)
//! - `Address`: 20-byte caller or implementation identifier
//! - `ExecutionId`: tenancy key of an application instance
//! - `Selector`: 4-byte operation identifier
//!
//! ## Example
//!
//! ```rust
//! use scriptexec_primitives::{Selector, H256};
//!
//! let transfer = Selector::from_signature("transfer(address,uint256)");
//! assert_eq!(transfer.to_string(), "0xa9059cbb");
//! assert_eq!(H256::from_u64(7).to_u64().unwrap(), 7);
//! ```

#[macro_use]
mod macros;

pub mod address;
pub mod error;
pub mod execution_id;
pub mod h256;
pub mod hash;
pub mod selector;

// Re-exports
pub use address::{Address, ADDRESS_SIZE};
pub use error::{PrimitiveError, PrimitiveResult};
pub use execution_id::ExecutionId;
pub use h256::{H256, H256_SIZE};
pub use hash::{keccak256, keccak256_concat};
pub use selector::{Selector, SELECTOR_SIZE};
