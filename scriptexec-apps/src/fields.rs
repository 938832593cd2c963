//! Storage layout of a crowdsale instance.
//!
//! All fields live in the instance's application namespace.

use scriptexec_primitives::Address;
use scriptexec_store::FieldKey;

pub fn admin() -> FieldKey {
    FieldKey::new("admin")
}

pub fn team_wallet() -> FieldKey {
    FieldKey::new("sale").add_str("team_wallet")
}

pub fn start_time() -> FieldKey {
    FieldKey::new("sale").add_str("start_time")
}

pub fn duration() -> FieldKey {
    FieldKey::new("sale").add_str("duration")
}

/// Wei per smallest token unit.
pub fn price() -> FieldKey {
    FieldKey::new("sale").add_str("price")
}

pub fn sell_cap() -> FieldKey {
    FieldKey::new("sale").add_str("sell_cap")
}

pub fn tokens_remaining() -> FieldKey {
    FieldKey::new("sale").add_str("tokens_remaining")
}

pub fn wei_raised() -> FieldKey {
    FieldKey::new("sale").add_str("wei_raised")
}

pub fn min_contribution() -> FieldKey {
    FieldKey::new("sale").add_str("min_contribution")
}

pub fn is_initialized() -> FieldKey {
    FieldKey::new("sale").add_str("initialized")
}

pub fn is_finalized() -> FieldKey {
    FieldKey::new("sale").add_str("finalized")
}

pub fn unique_buyers() -> FieldKey {
    FieldKey::new("sale").add_str("unique_buyers")
}

pub fn has_purchased(buyer: &Address) -> FieldKey {
    FieldKey::new("sale").add_str("buyer").add_address(buyer)
}

pub fn token_name() -> FieldKey {
    FieldKey::new("token").add_str("name")
}

pub fn token_symbol() -> FieldKey {
    FieldKey::new("token").add_str("symbol")
}

pub fn token_decimals() -> FieldKey {
    FieldKey::new("token").add_str("decimals")
}

pub fn total_supply() -> FieldKey {
    FieldKey::new("token").add_str("total_supply")
}

pub fn balance(owner: &Address) -> FieldKey {
    FieldKey::new("token").add_str("balance").add_address(owner)
}

pub fn allowance(owner: &Address, spender: &Address) -> FieldKey {
    FieldKey::new("token")
        .add_str("allowance")
        .add_address(owner)
        .add_address(spender)
}

pub fn transfer_agent(agent: &Address) -> FieldKey {
    FieldKey::new("token").add_str("agent").add_address(agent)
}
