//! Application-defined reason codes of the crowdsale handlers.

use scriptexec_engine::ReasonCode;

pub const SENDER_IS_NOT_ADMIN: ReasonCode = ReasonCode::from_static("SenderIsNotAdmin");

pub const INVALID_TEAM_WALLET: ReasonCode = ReasonCode::from_static("InvalidTeamWallet");
pub const INVALID_START_TIME: ReasonCode = ReasonCode::from_static("InvalidStartTime");
pub const INVALID_PRICE: ReasonCode = ReasonCode::from_static("InvalidPrice");
pub const INVALID_DURATION: ReasonCode = ReasonCode::from_static("InvalidDuration");
pub const INVALID_SELL_CAP: ReasonCode = ReasonCode::from_static("InvalidSellCap");
pub const INVALID_ADMIN: ReasonCode = ReasonCode::from_static("InvalidAdmin");

pub const SALE_ALREADY_INITIALIZED: ReasonCode = ReasonCode::from_static("SaleAlreadyInitialized");
pub const TOKEN_NOT_INITIALIZED: ReasonCode = ReasonCode::from_static("TokenNotInitialized");
pub const INVALID_TOKEN_INFO: ReasonCode = ReasonCode::from_static("InvalidTokenInfo");
pub const INVALID_ADDRESS: ReasonCode = ReasonCode::from_static("InvalidAddress");
pub const INVALID_MINT: ReasonCode = ReasonCode::from_static("InvalidMint");

pub const SALE_NOT_INITIALIZED: ReasonCode = ReasonCode::from_static("SaleNotInitialized");
pub const SALE_FINALIZED: ReasonCode = ReasonCode::from_static("SaleFinalized");
pub const BEFORE_START_TIME: ReasonCode = ReasonCode::from_static("BeforeStartTime");
pub const SALE_ENDED: ReasonCode = ReasonCode::from_static("SaleEnded");
pub const SOLD_OUT: ReasonCode = ReasonCode::from_static("SoldOut");
pub const UNDER_MIN_CONTRIBUTION: ReasonCode = ReasonCode::from_static("UnderMinContribution");
pub const INSUFFICIENT_PAYMENT: ReasonCode = ReasonCode::from_static("InsufficientPayment");
