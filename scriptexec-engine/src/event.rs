//! Events committed to the log of a call.

use std::borrow::Cow;

use scriptexec_primitives::{Address, ExecutionId, H256};
use serde::Serialize;

use crate::reason::ReasonCode;

/// A domain event produced by an application handler, such as `Transfer`.
///
/// The engine passes it through unmodified, stamped with the emitting
/// implementation's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub name: Cow<'static, str>,
    pub topics: Vec<H256>,
    pub data: Vec<H256>,
}

impl LogRecord {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            topics: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Appends an indexed argument.
    #[must_use]
    pub fn topic(mut self, topic: impl Into<H256>) -> Self {
        self.topics.push(topic.into());
        self
    }

    /// Appends a non-indexed argument.
    #[must_use]
    pub fn data(mut self, word: impl Into<H256>) -> Self {
        self.data.push(word.into());
        self
    }
}

/// A payment instruction: credit `amount` of the call's value to `recipient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub recipient: Address,
    pub amount: u128,
}

/// Every event the engine can place in a call's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum Event {
    ApplicationInitialized {
        execution_id: ExecutionId,
        init_address: Address,
        provider: Address,
        implementation: Address,
    },
    ApplicationFinalization {
        execution_id: ExecutionId,
        init_address: Address,
    },
    ApplicationExecution {
        execution_id: ExecutionId,
        target: Address,
    },
    ApplicationException {
        execution_id: ExecutionId,
        application_address: Address,
        message: ReasonCode,
    },
    DeliveredPayment {
        execution_id: ExecutionId,
        destination: Address,
        amount: u128,
    },
    Domain {
        emitter: Address,
        record: LogRecord,
    },
}

impl Event {
    /// Event name as external consumers match on it.
    pub fn name(&self) -> &str {
        match self {
            Event::ApplicationInitialized { .. } => "ApplicationInitialized",
            Event::ApplicationFinalization { .. } => "ApplicationFinalization",
            Event::ApplicationExecution { .. } => "ApplicationExecution",
            Event::ApplicationException { .. } => "ApplicationException",
            Event::DeliveredPayment { .. } => "DeliveredPayment",
            Event::Domain { record, .. } => &record.name,
        }
    }

    /// Execution ID carried by engine events; `None` for domain records.
    pub fn execution_id(&self) -> Option<&ExecutionId> {
        match self {
            Event::ApplicationInitialized { execution_id, .. }
            | Event::ApplicationFinalization { execution_id, .. }
            | Event::ApplicationExecution { execution_id, .. }
            | Event::ApplicationException { execution_id, .. }
            | Event::DeliveredPayment { execution_id, .. } => Some(execution_id),
            Event::Domain { .. } => None,
        }
    }

    pub fn as_domain(&self) -> Option<&LogRecord> {
        match self {
            Event::Domain { record, .. } => Some(record),
            _ => None,
        }
    }
}
