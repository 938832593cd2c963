//! Token entry points: transfers and allowances.
//!
//! Transfers are locked until the crowdsale is finalized, except for accounts
//! the admin marked as transfer agents.

use scriptexec_engine::{
    AppOutcome, Application, CalldataReader, EngineResult, ExecutionContext, ReasonCode,
    StorageView, WriteSet,
};
use scriptexec_primitives::{Address, Selector};

use crate::calls::{signature_of, signatures};
use crate::{events, fields};

pub struct CrowdsaleToken {
    selectors: Vec<Selector>,
}

/// Whether `owner` may not move tokens yet.
fn transfers_locked(storage: &StorageView<'_>, owner: &Address) -> EngineResult<bool> {
    Ok(!storage.read_bool(&fields::is_finalized())?
        && !storage.read_bool(&fields::transfer_agent(owner))?)
}

impl CrowdsaleToken {
    pub const NAME: &'static str = "DutchCrowdsaleToken";

    pub fn new() -> Self {
        Self {
            selectors: signatures::TOKEN
                .iter()
                .map(|signature| Selector::from_signature(signature))
                .collect(),
        }
    }

    /// Hard-fails on every violation.
    fn transfer(ctx: &ExecutionContext<'_>, args: &mut CalldataReader<'_>) -> EngineResult<AppOutcome> {
        let to = args.read_address()?;
        let amount = args.read_u128()?;
        args.finish()?;

        let storage = ctx.storage();
        let from = ctx.sender();
        if transfers_locked(storage, &from)? {
            return Err(ctx.revert(ReasonCode::TRANSFERS_LOCKED));
        }
        if to.is_zero() {
            return Err(ctx.revert(ReasonCode::INVALID_SENDER_OR_RECIPIENT));
        }
        let from_balance = storage.read_u128(&fields::balance(&from))?;
        if from_balance < amount {
            return Err(ctx.revert(ReasonCode::INSUFFICIENT_BALANCE));
        }

        let mut writes = WriteSet::new();
        if from != to {
            let to_balance = storage
                .read_u128(&fields::balance(&to))?
                .checked_add(amount)
                .ok_or_else(|| ctx.revert(ReasonCode::DEFAULT_EXCEPTION))?;
            writes
                .write(fields::balance(&from), from_balance - amount)
                .write(fields::balance(&to), to_balance);
        }
        writes.emit(events::transfer(from, to, amount));
        Ok(writes.into())
    }

    /// Rejects softly on every violation.
    fn transfer_from(
        ctx: &ExecutionContext<'_>,
        args: &mut CalldataReader<'_>,
    ) -> EngineResult<AppOutcome> {
        let owner = args.read_address()?;
        let to = args.read_address()?;
        let amount = args.read_u128()?;
        args.finish()?;

        let storage = ctx.storage();
        let spender = ctx.sender();
        if transfers_locked(storage, &owner)? {
            return Ok(AppOutcome::reject(ReasonCode::TRANSFERS_LOCKED));
        }
        if owner.is_zero() || to.is_zero() || owner == to {
            return Ok(AppOutcome::reject(ReasonCode::INVALID_SENDER_OR_RECIPIENT));
        }
        let allowance = storage.read_u128(&fields::allowance(&owner, &spender))?;
        if allowance < amount {
            return Ok(AppOutcome::reject(ReasonCode::INSUFFICIENT_ALLOWANCE));
        }
        let owner_balance = storage.read_u128(&fields::balance(&owner))?;
        if owner_balance < amount {
            return Ok(AppOutcome::reject(ReasonCode::INSUFFICIENT_BALANCE));
        }
        let to_balance = storage
            .read_u128(&fields::balance(&to))?
            .checked_add(amount)
            .ok_or_else(|| ctx.revert(ReasonCode::DEFAULT_EXCEPTION))?;

        let mut writes = WriteSet::new();
        writes
            .write(fields::balance(&owner), owner_balance - amount)
            .write(fields::balance(&to), to_balance)
            .write(fields::allowance(&owner, &spender), allowance - amount)
            .emit(events::transfer(owner, to, amount));
        Ok(writes.into())
    }

    /// `approve`, `increaseApproval` and `decreaseApproval` share one shape:
    /// compute the new allowance from the old one.
    fn update_allowance(
        ctx: &ExecutionContext<'_>,
        args: &mut CalldataReader<'_>,
        update: impl FnOnce(u128, u128) -> u128,
    ) -> EngineResult<AppOutcome> {
        let spender = args.read_address()?;
        let amount = args.read_u128()?;
        args.finish()?;

        if spender.is_zero() {
            return Ok(AppOutcome::reject(ReasonCode::INVALID_SENDER_OR_RECIPIENT));
        }
        let owner = ctx.sender();
        let key = fields::allowance(&owner, &spender);
        let allowance = update(ctx.storage().read_u128(&key)?, amount);

        let mut writes = WriteSet::new();
        writes
            .write(key, allowance)
            .emit(events::approval(owner, spender, allowance));
        Ok(writes.into())
    }
}

impl Default for CrowdsaleToken {
    fn default() -> Self {
        Self::new()
    }
}

impl Application for CrowdsaleToken {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> EngineResult<AppOutcome> {
        let signature = signature_of(ctx, &signatures::TOKEN)?;
        let mut args = ctx.args();
        match signature {
            signatures::TRANSFER => Self::transfer(ctx, &mut args),
            signatures::TRANSFER_FROM => Self::transfer_from(ctx, &mut args),
            signatures::APPROVE => Self::update_allowance(ctx, &mut args, |_, amount| amount),
            signatures::INCREASE_APPROVAL => {
                Self::update_allowance(ctx, &mut args, u128::saturating_add)
            }
            signatures::DECREASE_APPROVAL => {
                Self::update_allowance(ctx, &mut args, u128::saturating_sub)
            }
            _ => Err(ctx.unknown_selector()),
        }
    }
}
