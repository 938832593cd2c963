//! Per-call execution context handed to application handlers.

use std::fmt;

use scriptexec_config::ExecutionLimits;
use scriptexec_primitives::{Address, ExecutionId, Selector, H256};
use scriptexec_store::{FieldKey, Namespace, Store, StoreExt};

use crate::abi::CalldataReader;
use crate::error::{EngineError, EngineResult};
use crate::reason::ReasonCode;

/// Read-only view of one instance's region of the store.
#[derive(Clone, Copy)]
pub struct StorageView<'a> {
    store: &'a dyn Store,
    namespace: Namespace,
    execution_id: ExecutionId,
}

impl<'a> StorageView<'a> {
    pub fn new(store: &'a dyn Store, namespace: Namespace, execution_id: ExecutionId) -> Self {
        Self {
            store,
            namespace,
            execution_id,
        }
    }

    pub fn execution_id(&self) -> &ExecutionId {
        &self.execution_id
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn read(&self, field: &FieldKey) -> EngineResult<H256> {
        Ok(self
            .store
            .read_field(self.namespace, &self.execution_id, field)?)
    }

    pub fn read_u128(&self, field: &FieldKey) -> EngineResult<u128> {
        self.read(field)?.to_u128().map_err(EngineError::from_stored)
    }

    pub fn read_u64(&self, field: &FieldKey) -> EngineResult<u64> {
        self.read(field)?.to_u64().map_err(EngineError::from_stored)
    }

    pub fn read_address(&self, field: &FieldKey) -> EngineResult<Address> {
        self.read(field)?.to_address().map_err(EngineError::from_stored)
    }

    pub fn read_bool(&self, field: &FieldKey) -> EngineResult<bool> {
        Ok(self.read(field)?.to_bool())
    }
}

impl fmt::Debug for StorageView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageView")
            .field("namespace", &self.namespace)
            .field("execution_id", &self.execution_id)
            .finish()
    }
}

/// Everything a handler may observe about the call it is servicing.
#[derive(Debug, Clone)]
pub struct ExecutionContext<'a> {
    execution_id: ExecutionId,
    sender: Address,
    target: Address,
    value: u128,
    timestamp: u64,
    calldata: CalldataReader<'a>,
    storage: StorageView<'a>,
    limits: ExecutionLimits,
}

impl<'a> ExecutionContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        execution_id: ExecutionId,
        sender: Address,
        target: Address,
        value: u128,
        timestamp: u64,
        calldata: CalldataReader<'a>,
        storage: StorageView<'a>,
        limits: ExecutionLimits,
    ) -> Self {
        Self {
            execution_id,
            sender,
            target,
            value,
            timestamp,
            calldata,
            storage,
            limits,
        }
    }

    pub fn execution_id(&self) -> &ExecutionId {
        &self.execution_id
    }

    /// Address that submitted the call.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Implementation address servicing the call.
    pub fn target(&self) -> Address {
        self.target
    }

    /// Value sent with the call.
    pub fn value(&self) -> u128 {
        self.value
    }

    /// Engine clock, in seconds.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn selector(&self) -> Selector {
        self.calldata.selector()
    }

    /// A fresh reader positioned at the first argument word.
    pub fn args(&self) -> CalldataReader<'a> {
        self.calldata.clone()
    }

    pub fn storage(&self) -> &StorageView<'a> {
        &self.storage
    }

    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    /// Builds the hard failure a handler returns to abort the call.
    pub fn revert(&self, reason: ReasonCode) -> EngineError {
        EngineError::reverted(self.target, reason)
    }

    /// The error for a selector this handler does not service.
    pub fn unknown_selector(&self) -> EngineError {
        EngineError::unknown_selector(self.execution_id, self.selector())
    }
}
