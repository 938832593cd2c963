//! Domain log records emitted by the crowdsale handlers.

use scriptexec_engine::LogRecord;
use scriptexec_primitives::{Address, ExecutionId};

pub const TRANSFER: &str = "Transfer";
pub const APPROVAL: &str = "Approval";
pub const TRANSFER_AGENT_STATUS_UPDATE: &str = "TransferAgentStatusUpdate";
pub const CROWDSALE_FINALIZED: &str = "CrowdsaleFinalized";

/// `Transfer(from, to, amount)`. Mints use the zero address as `from`.
pub fn transfer(from: Address, to: Address, amount: u128) -> LogRecord {
    LogRecord::new(TRANSFER).topic(from).topic(to).data(amount)
}

pub fn approval(owner: Address, spender: Address, amount: u128) -> LogRecord {
    LogRecord::new(APPROVAL).topic(owner).topic(spender).data(amount)
}

pub fn transfer_agent_status_update(execution_id: &ExecutionId, agent: Address, status: bool) -> LogRecord {
    LogRecord::new(TRANSFER_AGENT_STATUS_UPDATE)
        .topic(*execution_id.as_word())
        .topic(agent)
        .data(status)
}

pub fn crowdsale_finalized(execution_id: &ExecutionId, wei_raised: u128) -> LogRecord {
    LogRecord::new(CROWDSALE_FINALIZED)
        .topic(*execution_id.as_word())
        .data(wei_raised)
}
