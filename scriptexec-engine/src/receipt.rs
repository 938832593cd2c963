//! What callers get back from the engine.

use scriptexec_primitives::{Address, ExecutionId};
use serde::Serialize;

use crate::event::{Event, LogRecord};
use crate::lifecycle::InstanceState;
use crate::reason::ReasonCode;

/// Log and side-effect counts of one `exec` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecReceipt {
    pub execution_id: ExecutionId,
    pub target: Address,
    pub events: Vec<Event>,
    /// Domain log records committed by the handler.
    pub events_emitted: usize,
    pub payments: usize,
    pub storage_writes: usize,
}

impl ExecReceipt {
    /// `(eventsEmitted, paymentsCount, storageWritesCount)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.events_emitted, self.payments, self.storage_writes)
    }

    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(Event::name).collect()
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn domain_events(&self) -> impl Iterator<Item = &LogRecord> {
        self.events.iter().filter_map(Event::as_domain)
    }
}

/// Outcome of a call that did not fail hard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome")]
pub enum DispatchOutcome {
    /// The handler's write set was committed.
    Committed(ExecReceipt),
    /// The handler rejected the call; only an `ApplicationException` was logged.
    DomainRejected { receipt: ExecReceipt, reason: ReasonCode },
}

impl DispatchOutcome {
    pub fn receipt(&self) -> &ExecReceipt {
        match self {
            DispatchOutcome::Committed(receipt) | DispatchOutcome::DomainRejected { receipt, .. } => {
                receipt
            }
        }
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        self.receipt().counts()
    }

    pub fn events(&self) -> &[Event] {
        &self.receipt().events
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, DispatchOutcome::Committed(_))
    }

    pub fn reason(&self) -> Option<&ReasonCode> {
        match self {
            DispatchOutcome::Committed(_) => None,
            DispatchOutcome::DomainRejected { reason, .. } => Some(reason),
        }
    }
}

/// Result of creating or finalizing an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceReceipt {
    pub execution_id: ExecutionId,
    pub state: InstanceState,
    pub events: Vec<Event>,
    pub storage_writes: usize,
}

impl InstanceReceipt {
    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(Event::name).collect()
    }
}
