//! Read-only views over a crowdsale instance's state.

use scriptexec_engine::{EngineResult, StorageView};
use scriptexec_primitives::{Address, H256};
use serde::Serialize;

use crate::fields;

/// Token metadata and supply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u64,
    pub total_supply: u128,
}

/// Sale progress as reported by `crowdsale_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrowdsaleInfo {
    pub wei_raised: u128,
    pub team_wallet: Address,
    pub min_contribution: u128,
    pub is_initialized: bool,
    pub is_finalized: bool,
}

/// Start time, end time and price of the sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaleWindow {
    pub start_time: u64,
    pub end_time: u64,
    pub price: u128,
}

/// Typed queries over one instance.
#[derive(Debug, Clone, Copy)]
pub struct CrowdsaleView<'a> {
    storage: StorageView<'a>,
}

impl<'a> CrowdsaleView<'a> {
    pub fn new(storage: StorageView<'a>) -> Self {
        Self { storage }
    }

    pub fn admin(&self) -> EngineResult<Address> {
        self.storage.read_address(&fields::admin())
    }

    pub fn balance_of(&self, owner: &Address) -> EngineResult<u128> {
        self.storage.read_u128(&fields::balance(owner))
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> EngineResult<u128> {
        self.storage.read_u128(&fields::allowance(owner, spender))
    }

    pub fn is_transfer_agent(&self, agent: &Address) -> EngineResult<bool> {
        self.storage.read_bool(&fields::transfer_agent(agent))
    }

    pub fn token_info(&self) -> EngineResult<TokenInfo> {
        Ok(TokenInfo {
            name: short_string(&self.storage.read(&fields::token_name())?),
            symbol: short_string(&self.storage.read(&fields::token_symbol())?),
            decimals: self.storage.read_u64(&fields::token_decimals())?,
            total_supply: self.storage.read_u128(&fields::total_supply())?,
        })
    }

    pub fn crowdsale_info(&self) -> EngineResult<CrowdsaleInfo> {
        Ok(CrowdsaleInfo {
            wei_raised: self.storage.read_u128(&fields::wei_raised())?,
            team_wallet: self.storage.read_address(&fields::team_wallet())?,
            min_contribution: self.storage.read_u128(&fields::min_contribution())?,
            is_initialized: self.storage.read_bool(&fields::is_initialized())?,
            is_finalized: self.storage.read_bool(&fields::is_finalized())?,
        })
    }

    pub fn sale_window(&self) -> EngineResult<SaleWindow> {
        let start_time = self.storage.read_u64(&fields::start_time())?;
        let duration = self.storage.read_u64(&fields::duration())?;
        Ok(SaleWindow {
            start_time,
            end_time: start_time.saturating_add(duration),
            price: self.storage.read_u128(&fields::price())?,
        })
    }

    pub fn tokens_remaining(&self) -> EngineResult<u128> {
        self.storage.read_u128(&fields::tokens_remaining())
    }

    pub fn unique_buyers(&self) -> EngineResult<u64> {
        self.storage.read_u64(&fields::unique_buyers())
    }

    pub fn is_sold_out(&self) -> EngineResult<bool> {
        Ok(self.tokens_remaining()? == 0)
    }
}

/// Decodes a left-aligned `bytes32` string, dropping trailing padding.
/// Bytes that are not valid UTF-8 are replaced.
fn short_string(word: &H256) -> String {
    let bytes = word.as_bytes();
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_string_strips_padding() {
        let word = crate::calls::short_string("Token").unwrap();
        assert_eq!(short_string(&word), "Token");
        assert_eq!(short_string(&H256::ZERO), "");
    }

    #[test]
    fn test_query_results_render_as_json() {
        let wallet = Address::derive(b"team");
        let info = CrowdsaleInfo {
            wei_raised: 1_600,
            team_wallet: wallet,
            min_contribution: 0,
            is_initialized: true,
            is_finalized: false,
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            serde_json::json!({
                "wei_raised": 1_600,
                "team_wallet": wallet.to_string(),
                "min_contribution": 0,
                "is_initialized": true,
                "is_finalized": false,
            })
        );

        let token = TokenInfo {
            name: "Wizard".into(),
            symbol: "WIZ".into(),
            decimals: 0,
            total_supply: 1_000,
        };
        let rendered = serde_json::to_string(&token).unwrap();
        assert_eq!(
            rendered,
            r#"{"name":"Wizard","symbol":"WIZ","decimals":0,"total_supply":1000}"#
        );
    }
}
