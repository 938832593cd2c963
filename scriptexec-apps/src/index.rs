//! Init routine of a crowdsale instance.

use scriptexec_engine::{
    AppOutcome, Application, EngineResult, ExecutionContext, ReasonCode, WriteSet,
};
use scriptexec_primitives::Selector;
use tracing::debug;

use crate::calls::InitParams;
use crate::{fields, reasons};

/// Validates the sale parameters, lays out the initial state and finalizes the
/// instance so no further configuration of its targets is possible.
#[derive(Debug, Default)]
pub struct CrowdsaleIndex;

impl CrowdsaleIndex {
    pub const NAME: &'static str = "DutchCrowdsaleIdx";

    fn check(params: &InitParams, now: u64) -> Option<ReasonCode> {
        if params.team_wallet.is_zero() {
            return Some(reasons::INVALID_TEAM_WALLET);
        }
        if params.start_time == 0 || params.start_time < now {
            return Some(reasons::INVALID_START_TIME);
        }
        if params.price == 0 {
            return Some(reasons::INVALID_PRICE);
        }
        if params.duration == 0 || params.start_time.checked_add(params.duration).is_none() {
            return Some(reasons::INVALID_DURATION);
        }
        if params.sell_cap == 0 {
            return Some(reasons::INVALID_SELL_CAP);
        }
        if params.admin.is_zero() {
            return Some(reasons::INVALID_ADMIN);
        }
        None
    }
}

impl Application for CrowdsaleIndex {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn selectors(&self) -> &[Selector] {
        &[]
    }

    fn initialize(&self, ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        let mut args = ctx.args();
        let params = InitParams {
            team_wallet: args.read_address()?,
            start_time: args.read_u64()?,
            price: args.read_u128()?,
            duration: args.read_u64()?,
            sell_cap: args.read_u128()?,
            admin: args.read_address()?,
        };
        args.finish()?;

        if let Some(reason) = Self::check(&params, ctx.timestamp()) {
            return Ok(AppOutcome::reject(reason));
        }
        debug!(
            execution_id = %ctx.execution_id(),
            admin = %params.admin,
            sell_cap = params.sell_cap,
            "laying out crowdsale"
        );

        let mut writes = WriteSet::new();
        writes
            .write(fields::admin(), params.admin)
            .write(fields::team_wallet(), params.team_wallet)
            .write(fields::start_time(), params.start_time)
            .write(fields::duration(), params.duration)
            .write(fields::price(), params.price)
            .write(fields::sell_cap(), params.sell_cap)
            .write(fields::tokens_remaining(), params.sell_cap)
            .request_finalize();
        Ok(writes.into())
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        Err(ctx.unknown_selector())
    }
}
