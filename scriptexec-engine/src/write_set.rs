//! The result a handler hands back to the engine.

use scriptexec_primitives::{Address, H256};
use scriptexec_store::FieldKey;

use crate::event::{LogRecord, Payment};
use crate::reason::ReasonCode;

/// Storage writes, log records and payments produced by one handler call.
///
/// Field keys are relative to the calling instance's application namespace;
/// the engine derives the concrete locations at commit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSet {
    writes: Vec<(FieldKey, H256)>,
    events: Vec<LogRecord>,
    payments: Vec<Payment>,
    finalize: bool,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, field: FieldKey, value: impl Into<H256>) -> &mut Self {
        self.writes.push((field, value.into()));
        self
    }

    pub fn emit(&mut self, record: LogRecord) -> &mut Self {
        self.events.push(record);
        self
    }

    pub fn pay(&mut self, recipient: Address, amount: u128) -> &mut Self {
        self.payments.push(Payment { recipient, amount });
        self
    }

    /// Asks the engine to finalize the instance in the same commit.
    /// Only honored by init routines.
    pub fn request_finalize(&mut self) -> &mut Self {
        self.finalize = true;
        self
    }

    pub fn writes(&self) -> &[(FieldKey, H256)] {
        &self.writes
    }

    pub fn events(&self) -> &[LogRecord] {
        &self.events
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn finalize_requested(&self) -> bool {
        self.finalize
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.events.is_empty() && self.payments.is_empty()
    }

    /// Sum of all payment amounts, `None` on overflow.
    pub fn payment_total(&self) -> Option<u128> {
        self.payments
            .iter()
            .try_fold(0u128, |acc, p| acc.checked_add(p.amount))
    }

    pub(crate) fn into_parts(self) -> (Vec<(FieldKey, H256)>, Vec<LogRecord>, Vec<Payment>) {
        (self.writes, self.events, self.payments)
    }
}

/// What a handler decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppOutcome {
    /// Commit the write set.
    Commit(WriteSet),
    /// Domain-level rejection: commit nothing, log an `ApplicationException`.
    Reject(ReasonCode),
}

impl AppOutcome {
    pub fn reject(reason: ReasonCode) -> Self {
        AppOutcome::Reject(reason)
    }
}

impl From<WriteSet> for AppOutcome {
    fn from(writes: WriteSet) -> Self {
        AppOutcome::Commit(writes)
    }
}
