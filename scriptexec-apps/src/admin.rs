//! Administrative entry points, callable only by the crowdsale admin.

use scriptexec_engine::{
    AppOutcome, Application, CalldataReader, EngineResult, ExecutionContext, WriteSet,
};
use scriptexec_primitives::{Address, Selector};
use tracing::debug;

use crate::calls::{signature_of, signatures};
use crate::{events, fields, reasons};

/// Largest accepted number of token decimals.
pub const MAX_DECIMALS: u64 = 18;

pub struct CrowdsaleAdmin {
    selectors: Vec<Selector>,
}

impl CrowdsaleAdmin {
    pub const NAME: &'static str = "DutchCrowdsaleAdmin";

    pub fn new() -> Self {
        Self {
            selectors: signatures::ADMIN
                .iter()
                .map(|signature| Selector::from_signature(signature))
                .collect(),
        }
    }

    fn init_token(
        ctx: &ExecutionContext<'_>,
        args: &mut CalldataReader<'_>,
    ) -> EngineResult<AppOutcome> {
        let name = args.read_word()?;
        let symbol = args.read_word()?;
        let decimals = args.read_u64()?;
        args.finish()?;

        if ctx.storage().read_bool(&fields::is_initialized())? {
            return Ok(AppOutcome::reject(reasons::SALE_ALREADY_INITIALIZED));
        }
        if name.is_zero() || symbol.is_zero() || decimals > MAX_DECIMALS {
            return Ok(AppOutcome::reject(reasons::INVALID_TOKEN_INFO));
        }
        let mut writes = WriteSet::new();
        writes
            .write(fields::token_name(), name)
            .write(fields::token_symbol(), symbol)
            .write(fields::token_decimals(), decimals);
        Ok(writes.into())
    }

    fn update_min_contribution(
        ctx: &ExecutionContext<'_>,
        args: &mut CalldataReader<'_>,
    ) -> EngineResult<AppOutcome> {
        let amount = args.read_u128()?;
        args.finish()?;

        if ctx.storage().read_bool(&fields::is_initialized())? {
            return Ok(AppOutcome::reject(reasons::SALE_ALREADY_INITIALIZED));
        }
        let mut writes = WriteSet::new();
        writes.write(fields::min_contribution(), amount);
        Ok(writes.into())
    }

    fn set_transfer_agent(
        ctx: &ExecutionContext<'_>,
        args: &mut CalldataReader<'_>,
    ) -> EngineResult<AppOutcome> {
        let agent = args.read_address()?;
        let status = args.read_bool()?;
        args.finish()?;

        if agent.is_zero() {
            return Ok(AppOutcome::reject(reasons::INVALID_ADDRESS));
        }
        let mut writes = WriteSet::new();
        writes
            .write(fields::transfer_agent(&agent), status)
            .emit(events::transfer_agent_status_update(ctx.execution_id(), agent, status));
        Ok(writes.into())
    }

    fn mint(ctx: &ExecutionContext<'_>, args: &mut CalldataReader<'_>) -> EngineResult<AppOutcome> {
        let to = args.read_address()?;
        let amount = args.read_u128()?;
        args.finish()?;

        let storage = ctx.storage();
        if storage.read_bool(&fields::is_initialized())? {
            return Ok(AppOutcome::reject(reasons::SALE_ALREADY_INITIALIZED));
        }
        if to.is_zero() || amount == 0 {
            return Ok(AppOutcome::reject(reasons::INVALID_MINT));
        }
        let balance = storage
            .read_u128(&fields::balance(&to))?
            .checked_add(amount)
            .ok_or_else(|| ctx.revert(reasons::INVALID_MINT))?;
        let supply = storage
            .read_u128(&fields::total_supply())?
            .checked_add(amount)
            .ok_or_else(|| ctx.revert(reasons::INVALID_MINT))?;

        let mut writes = WriteSet::new();
        writes
            .write(fields::balance(&to), balance)
            .write(fields::total_supply(), supply)
            .emit(events::transfer(Address::ZERO, to, amount));
        Ok(writes.into())
    }

    fn update_team_wallet(
        ctx: &ExecutionContext<'_>,
        args: &mut CalldataReader<'_>,
    ) -> EngineResult<AppOutcome> {
        let wallet = args.read_address()?;
        args.finish()?;

        if ctx.storage().read_bool(&fields::is_finalized())? {
            return Ok(AppOutcome::reject(reasons::SALE_FINALIZED));
        }
        if wallet.is_zero() {
            return Ok(AppOutcome::reject(reasons::INVALID_ADDRESS));
        }
        let mut writes = WriteSet::new();
        writes.write(fields::team_wallet(), wallet);
        Ok(writes.into())
    }

    fn initialize_sale(ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        let storage = ctx.storage();
        if storage.read_bool(&fields::is_initialized())? {
            return Ok(AppOutcome::reject(reasons::SALE_ALREADY_INITIALIZED));
        }
        if storage.read(&fields::token_name())?.is_zero() {
            return Ok(AppOutcome::reject(reasons::TOKEN_NOT_INITIALIZED));
        }
        if storage.read_u64(&fields::start_time())? <= ctx.timestamp() {
            return Ok(AppOutcome::reject(reasons::INVALID_START_TIME));
        }
        let mut writes = WriteSet::new();
        writes.write(fields::is_initialized(), true);
        Ok(writes.into())
    }

    fn finalize_sale(ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        let storage = ctx.storage();
        if !storage.read_bool(&fields::is_initialized())? {
            return Ok(AppOutcome::reject(reasons::SALE_NOT_INITIALIZED));
        }
        if storage.read_bool(&fields::is_finalized())? {
            return Ok(AppOutcome::reject(reasons::SALE_FINALIZED));
        }
        let wei_raised = storage.read_u128(&fields::wei_raised())?;
        let mut writes = WriteSet::new();
        writes
            .write(fields::is_finalized(), true)
            .emit(events::crowdsale_finalized(ctx.execution_id(), wei_raised));
        Ok(writes.into())
    }
}

impl Default for CrowdsaleAdmin {
    fn default() -> Self {
        Self::new()
    }
}

impl Application for CrowdsaleAdmin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        let signature = signature_of(ctx, &signatures::ADMIN)?;
        if ctx.storage().read_address(&fields::admin())? != ctx.sender() {
            return Ok(AppOutcome::reject(reasons::SENDER_IS_NOT_ADMIN));
        }
        debug!(execution_id = %ctx.execution_id(), signature, "admin call");

        let mut args = ctx.args();
        match signature {
            signatures::INIT_CROWDSALE_TOKEN => Self::init_token(ctx, &mut args),
            signatures::UPDATE_GLOBAL_MIN_CONTRIBUTION => Self::update_min_contribution(ctx, &mut args),
            signatures::SET_TRANSFER_AGENT_STATUS => Self::set_transfer_agent(ctx, &mut args),
            signatures::MINT_TOKENS => Self::mint(ctx, &mut args),
            signatures::UPDATE_TEAM_WALLET => Self::update_team_wallet(ctx, &mut args),
            signatures::INITIALIZE_CROWDSALE => {
                args.finish()?;
                Self::initialize_sale(ctx)
            }
            signatures::FINALIZE_CROWDSALE => {
                args.finish()?;
                Self::finalize_sale(ctx)
            }
            _ => Err(ctx.unknown_selector()),
        }
    }
}
