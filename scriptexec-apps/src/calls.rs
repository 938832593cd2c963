//! Signatures and calldata builders for every crowdsale entry point.

use scriptexec_engine::{CalldataBuilder, EngineError, EngineResult, ExecutionContext};
use scriptexec_primitives::{Address, Selector, H256};

pub mod signatures {
    pub const INIT: &str = "init(address,uint64,uint128,uint64,uint128,address)";

    pub const INIT_CROWDSALE_TOKEN: &str = "initCrowdsaleToken(bytes32,bytes32,uint64)";
    pub const UPDATE_GLOBAL_MIN_CONTRIBUTION: &str = "updateGlobalMinContribution(uint128)";
    pub const SET_TRANSFER_AGENT_STATUS: &str = "setTransferAgentStatus(address,bool)";
    pub const MINT_TOKENS: &str = "mintTokens(address,uint128)";
    pub const UPDATE_TEAM_WALLET: &str = "updateTeamWallet(address)";
    pub const INITIALIZE_CROWDSALE: &str = "initializeCrowdsale()";
    pub const FINALIZE_CROWDSALE: &str = "finalizeCrowdsale()";

    pub const BUY: &str = "buy()";

    pub const TRANSFER: &str = "transfer(address,uint128)";
    pub const TRANSFER_FROM: &str = "transferFrom(address,address,uint128)";
    pub const APPROVE: &str = "approve(address,uint128)";
    pub const INCREASE_APPROVAL: &str = "increaseApproval(address,uint128)";
    pub const DECREASE_APPROVAL: &str = "decreaseApproval(address,uint128)";

    pub const ADMIN: [&str; 7] = [
        INIT_CROWDSALE_TOKEN,
        UPDATE_GLOBAL_MIN_CONTRIBUTION,
        SET_TRANSFER_AGENT_STATUS,
        MINT_TOKENS,
        UPDATE_TEAM_WALLET,
        INITIALIZE_CROWDSALE,
        FINALIZE_CROWDSALE,
    ];
    pub const SALE: [&str; 1] = [BUY];
    pub const TOKEN: [&str; 5] = [
        TRANSFER,
        TRANSFER_FROM,
        APPROVE,
        INCREASE_APPROVAL,
        DECREASE_APPROVAL,
    ];
}

/// Signature in `table` whose selector the call carries.
pub(crate) fn signature_of(
    ctx: &ExecutionContext<'_>,
    table: &[&'static str],
) -> EngineResult<&'static str> {
    let selector = ctx.selector();
    table
        .iter()
        .copied()
        .find(|signature| Selector::from_signature(signature) == selector)
        .ok_or_else(|| ctx.unknown_selector())
}

/// Arguments of the crowdsale init routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitParams {
    pub team_wallet: Address,
    pub start_time: u64,
    /// Wei per smallest token unit.
    pub price: u128,
    pub duration: u64,
    /// Tokens available to buyers.
    pub sell_cap: u128,
    pub admin: Address,
}

impl InitParams {
    pub fn to_calldata(&self) -> Vec<u8> {
        CalldataBuilder::signature(signatures::INIT)
            .address(&self.team_wallet)
            .u64(self.start_time)
            .u128(self.price)
            .u64(self.duration)
            .u128(self.sell_cap)
            .address(&self.admin)
            .to_bytes()
    }
}

/// Encodes a short string as a left-aligned `bytes32`.
pub fn short_string(text: &str) -> EngineResult<H256> {
    H256::from_left_bytes(text.as_bytes())
        .map_err(|err| EngineError::malformed(format!("'{text}' does not fit one word: {err}")))
}

pub fn init_crowdsale_token(name: &str, symbol: &str, decimals: u64) -> EngineResult<Vec<u8>> {
    Ok(CalldataBuilder::signature(signatures::INIT_CROWDSALE_TOKEN)
        .word(&short_string(name)?)
        .word(&short_string(symbol)?)
        .u64(decimals)
        .to_bytes())
}

pub fn update_global_min_contribution(amount: u128) -> Vec<u8> {
    CalldataBuilder::signature(signatures::UPDATE_GLOBAL_MIN_CONTRIBUTION)
        .u128(amount)
        .to_bytes()
}

pub fn set_transfer_agent_status(agent: &Address, status: bool) -> Vec<u8> {
    CalldataBuilder::signature(signatures::SET_TRANSFER_AGENT_STATUS)
        .address(agent)
        .bool(status)
        .to_bytes()
}

pub fn mint_tokens(to: &Address, amount: u128) -> Vec<u8> {
    CalldataBuilder::signature(signatures::MINT_TOKENS)
        .address(to)
        .u128(amount)
        .to_bytes()
}

pub fn update_team_wallet(wallet: &Address) -> Vec<u8> {
    CalldataBuilder::signature(signatures::UPDATE_TEAM_WALLET)
        .address(wallet)
        .to_bytes()
}

pub fn initialize_crowdsale() -> Vec<u8> {
    CalldataBuilder::signature(signatures::INITIALIZE_CROWDSALE).to_bytes()
}

pub fn finalize_crowdsale() -> Vec<u8> {
    CalldataBuilder::signature(signatures::FINALIZE_CROWDSALE).to_bytes()
}

pub fn buy() -> Vec<u8> {
    CalldataBuilder::signature(signatures::BUY).to_bytes()
}

pub fn transfer(to: &Address, amount: u128) -> Vec<u8> {
    CalldataBuilder::signature(signatures::TRANSFER)
        .address(to)
        .u128(amount)
        .to_bytes()
}

pub fn transfer_from(owner: &Address, to: &Address, amount: u128) -> Vec<u8> {
    CalldataBuilder::signature(signatures::TRANSFER_FROM)
        .address(owner)
        .address(to)
        .u128(amount)
        .to_bytes()
}

pub fn approve(spender: &Address, amount: u128) -> Vec<u8> {
    CalldataBuilder::signature(signatures::APPROVE)
        .address(spender)
        .u128(amount)
        .to_bytes()
}

pub fn increase_approval(spender: &Address, amount: u128) -> Vec<u8> {
    CalldataBuilder::signature(signatures::INCREASE_APPROVAL)
        .address(spender)
        .u128(amount)
        .to_bytes()
}

pub fn decrease_approval(spender: &Address, amount: u128) -> Vec<u8> {
    CalldataBuilder::signature(signatures::DECREASE_APPROVAL)
        .address(spender)
        .u128(amount)
        .to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptexec_engine::CalldataReader;

    #[test]
    fn test_init_params_layout() {
        let params = InitParams {
            team_wallet: Address::derive(b"team"),
            start_time: 100,
            price: 3,
            duration: 3600,
            sell_cap: 1_000,
            admin: Address::derive(b"admin"),
        };
        let calldata = params.to_calldata();
        let mut reader = CalldataReader::new(&calldata).unwrap();
        assert_eq!(reader.selector(), Selector::from_signature(signatures::INIT));
        assert_eq!(reader.read_address().unwrap(), params.team_wallet);
        assert_eq!(reader.read_u64().unwrap(), 100);
        assert_eq!(reader.read_u128().unwrap(), 3);
        assert_eq!(reader.read_u64().unwrap(), 3600);
        assert_eq!(reader.read_u128().unwrap(), 1_000);
        assert_eq!(reader.read_address().unwrap(), params.admin);
        reader.finish().unwrap();
    }

    #[test]
    fn test_short_string_limits() {
        assert_eq!(&short_string("Token").unwrap().as_bytes()[..5], b"Token");
        assert!(short_string(&"x".repeat(33)).is_err());
    }

    #[test]
    fn test_thirteen_distinct_selectors() {
        let all: std::collections::BTreeSet<Selector> = signatures::ADMIN
            .iter()
            .chain(&signatures::SALE)
            .chain(&signatures::TOKEN)
            .map(|sig| Selector::from_signature(sig))
            .collect();
        assert_eq!(all.len(), 13);
    }
}
