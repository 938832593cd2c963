//! The `buy()` entry point.

use scriptexec_engine::{
    AppOutcome, Application, EngineResult, ExecutionContext, ReasonCode, WriteSet,
};
use scriptexec_primitives::{Address, Selector};
use tracing::debug;

use crate::calls::{signature_of, signatures};
use crate::{events, fields, reasons};

/// Sells tokens at a fixed price until the sell cap is reached.
///
/// A purchase that would exceed the remaining supply is filled partially;
/// the unspent part of the sent value is not forwarded to the team wallet.
pub struct CrowdsaleSale {
    selectors: Vec<Selector>,
}

impl CrowdsaleSale {
    pub const NAME: &'static str = "DutchCrowdsaleSale";

    pub fn new() -> Self {
        Self {
            selectors: signatures::SALE
                .iter()
                .map(|signature| Selector::from_signature(signature))
                .collect(),
        }
    }
}

impl Default for CrowdsaleSale {
    fn default() -> Self {
        Self::new()
    }
}

impl Application for CrowdsaleSale {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        signature_of(ctx, &signatures::SALE)?;
        ctx.args().finish()?;

        let storage = ctx.storage();
        let value = ctx.value();
        let now = ctx.timestamp();
        if value == 0 {
            return Ok(AppOutcome::reject(ReasonCode::NO_WEI_SENT));
        }
        if !storage.read_bool(&fields::is_initialized())? {
            return Ok(AppOutcome::reject(reasons::SALE_NOT_INITIALIZED));
        }
        if storage.read_bool(&fields::is_finalized())? {
            return Ok(AppOutcome::reject(reasons::SALE_FINALIZED));
        }
        let start = storage.read_u64(&fields::start_time())?;
        if now < start {
            return Ok(AppOutcome::reject(reasons::BEFORE_START_TIME));
        }
        if now >= start.saturating_add(storage.read_u64(&fields::duration())?) {
            return Ok(AppOutcome::reject(reasons::SALE_ENDED));
        }
        let remaining = storage.read_u128(&fields::tokens_remaining())?;
        if remaining == 0 {
            return Ok(AppOutcome::reject(reasons::SOLD_OUT));
        }
        if value < storage.read_u128(&fields::min_contribution())? {
            return Ok(AppOutcome::reject(reasons::UNDER_MIN_CONTRIBUTION));
        }

        let price = storage.read_u128(&fields::price())?;
        let affordable = value
            .checked_div(price)
            .ok_or_else(|| ctx.revert(reasons::INVALID_PRICE))?;
        if affordable == 0 {
            return Ok(AppOutcome::reject(reasons::INSUFFICIENT_PAYMENT));
        }
        let tokens = affordable.min(remaining);
        let overflow = || ctx.revert(ReasonCode::DEFAULT_EXCEPTION);
        let spent = tokens.checked_mul(price).ok_or_else(overflow)?;

        let buyer = ctx.sender();
        let balance = storage
            .read_u128(&fields::balance(&buyer))?
            .checked_add(tokens)
            .ok_or_else(overflow)?;
        let supply = storage
            .read_u128(&fields::total_supply())?
            .checked_add(tokens)
            .ok_or_else(overflow)?;
        let raised = storage
            .read_u128(&fields::wei_raised())?
            .checked_add(spent)
            .ok_or_else(overflow)?;
        let team_wallet = storage.read_address(&fields::team_wallet())?;

        let mut writes = WriteSet::new();
        writes
            .write(fields::balance(&buyer), balance)
            .write(fields::total_supply(), supply)
            .write(fields::tokens_remaining(), remaining - tokens)
            .write(fields::wei_raised(), raised);
        if !storage.read_bool(&fields::has_purchased(&buyer))? {
            let buyers = storage.read_u64(&fields::unique_buyers())?;
            writes
                .write(fields::has_purchased(&buyer), true)
                .write(fields::unique_buyers(), buyers.saturating_add(1));
        }
        writes
            .emit(events::transfer(Address::ZERO, buyer, tokens))
            .pay(team_wallet, spent);

        debug!(
            execution_id = %ctx.execution_id(),
            %buyer,
            tokens,
            spent,
            "tokens purchased"
        );
        Ok(writes.into())
    }
}
