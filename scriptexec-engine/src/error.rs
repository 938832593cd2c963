//! Hard failures of the dispatch engine.
//!
//! An `EngineError` aborts the whole call: nothing is written and no event is
//! emitted. Domain-level rejections are not errors; they travel as
//! [`ReasonCode`]s inside a committed `ApplicationException` event.

use scriptexec_primitives::{Address, ExecutionId, PrimitiveError, Selector};
use scriptexec_store::StoreError;
use thiserror::Error;

use crate::lifecycle::{InstanceState, Operation};
use crate::reason::ReasonCode;

/// Errors that abort a call.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Caller is not the instance's recorded updater.
    #[error("Unauthorized: {caller} may not modify execution {execution_id}")]
    Unauthorized {
        caller: Address,
        execution_id: ExecutionId,
    },

    /// No implementation services the selector for this instance.
    #[error("Unknown selector {selector} for execution {execution_id}")]
    UnknownSelector {
        execution_id: ExecutionId,
        selector: Selector,
    },

    /// Selector and target lists of a registration differ in length.
    #[error("Length mismatch: {selectors} selectors but {targets} targets")]
    LengthMismatch { selectors: usize, targets: usize },

    /// Application name already belongs to another provider.
    #[error("Duplicate name: application '{name}' is owned by {owner}")]
    DuplicateName { name: String, owner: Address },

    /// Registration is structurally invalid.
    #[error("Invalid registration: {message}")]
    InvalidRegistration { message: String },

    /// Calldata could not be decoded.
    #[error("Malformed calldata: {message}")]
    MalformedCalldata { message: String },

    /// No instance exists under this execution ID.
    #[error("Unknown execution {execution_id}")]
    UnknownInstance { execution_id: ExecutionId },

    /// No handler is deployed at this address.
    #[error("Unknown implementation {address}")]
    UnknownImplementation { address: Address },

    /// Registry has no application with this name.
    #[error("Unknown application '{name}'")]
    UnknownApplication { name: String },

    /// Execution ID does not refer to a registry instance.
    #[error("Execution {execution_id} is not a registry")]
    NotARegistry { execution_id: ExecutionId },

    /// Init routine rejected its arguments.
    #[error("Invalid init params for {implementation}: {reason}")]
    InvalidInitParams {
        implementation: Address,
        reason: ReasonCode,
    },

    /// Requested lifecycle transition is not a forward step.
    #[error("Invalid transition of {execution_id} from {from} to {to}")]
    InvalidTransition {
        execution_id: ExecutionId,
        from: InstanceState,
        to: InstanceState,
    },

    /// Instance state does not permit the operation class.
    #[error("Operation {operation} not permitted on {execution_id} in state {state}")]
    OperationNotPermitted {
        execution_id: ExecutionId,
        operation: Operation,
        state: InstanceState,
    },

    /// Caller is not the exec admin of the `ScriptExec` front end.
    #[error("Not exec admin: {caller} is not {admin}")]
    NotExecAdmin { caller: Address, admin: Address },

    /// A `ScriptExec` default has not been set.
    #[error("Script exec is not configured: {setting} unset")]
    ExecNotConfigured { setting: &'static str },

    /// Explicit target is not authorized for the instance.
    #[error("Target {target} is not allowed for execution {execution_id}")]
    TargetNotAllowed {
        execution_id: ExecutionId,
        target: Address,
    },

    /// Payment instructions spend more than the value sent with the call.
    #[error("Payments total {requested} exceeds value sent {available}")]
    PaymentExceedsValue { requested: u128, available: u128 },

    /// A per-call limit was exceeded.
    #[error("Limit exceeded: {what} {actual} > {limit}")]
    LimitExceeded {
        what: &'static str,
        limit: usize,
        actual: usize,
    },

    /// Handler aborted the call.
    #[error("Reverted by {target}: {reason}")]
    Reverted { target: Address, reason: ReasonCode },

    /// Stored data could not be decoded.
    #[error("Corrupt state: {message}")]
    CorruptState { message: String },

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl EngineError {
    /// Create an unauthorized error.
    pub fn unauthorized(caller: Address, execution_id: ExecutionId) -> Self {
        Self::Unauthorized {
            caller,
            execution_id,
        }
    }

    /// Create an unknown selector error.
    pub fn unknown_selector(execution_id: ExecutionId, selector: Selector) -> Self {
        Self::UnknownSelector {
            execution_id,
            selector,
        }
    }

    /// Create an invalid registration error.
    pub fn invalid_registration<S: Into<String>>(message: S) -> Self {
        Self::InvalidRegistration {
            message: message.into(),
        }
    }

    /// Create a malformed calldata error.
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedCalldata {
            message: message.into(),
        }
    }

    /// Create an unknown instance error.
    pub fn unknown_instance(execution_id: ExecutionId) -> Self {
        Self::UnknownInstance { execution_id }
    }

    /// Create an unknown implementation error.
    pub fn unknown_implementation(address: Address) -> Self {
        Self::UnknownImplementation { address }
    }

    /// Create a revert error.
    pub fn reverted(target: Address, reason: ReasonCode) -> Self {
        Self::Reverted { target, reason }
    }

    /// Create a corrupt state error.
    pub fn corrupt<S: Into<String>>(message: S) -> Self {
        Self::CorruptState {
            message: message.into(),
        }
    }

    /// Create a limit exceeded error.
    pub fn limit_exceeded(what: &'static str, limit: usize, actual: usize) -> Self {
        Self::LimitExceeded {
            what,
            limit,
            actual,
        }
    }

    /// Wraps a decoding failure of a stored word.
    pub(crate) fn from_stored(err: PrimitiveError) -> Self {
        Self::corrupt(err.to_string())
    }

    /// Wraps a decoding failure of a calldata word.
    pub(crate) fn from_calldata(err: PrimitiveError) -> Self {
        Self::malformed(err.to_string())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use scriptexec_primitives::H256;

    #[test]
    fn test_error_display() {
        let id = ExecutionId::new(H256::from_u64(1));
        let err = EngineError::unknown_selector(id, Selector::new([0xde, 0xad, 0xbe, 0xef]));
        assert!(err.to_string().contains("0xdeadbeef"));

        let err = EngineError::LengthMismatch {
            selectors: 13,
            targets: 12,
        };
        assert_eq!(err.to_string(), "Length mismatch: 13 selectors but 12 targets");

        let err = EngineError::limit_exceeded("storage writes", 4, 5);
        assert_eq!(err.to_string(), "Limit exceeded: storage writes 5 > 4");
    }

    #[test]
    fn test_store_error_conversion() {
        let err: EngineError = StoreError::backend("disk full").into();
        assert!(matches!(err, EngineError::Storage(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
