//! # scriptexec apps
//!
//! Reference applications for the scriptexec engine: a fixed-price token sale
//! split into four stateless handlers that share one instance's storage.
//!
//! - [`CrowdsaleIndex`]: init routine, validates the sale parameters
//! - [`CrowdsaleAdmin`]: seven admin-only configuration entry points
//! - [`CrowdsaleSale`]: `buy()`
//! - [`CrowdsaleToken`]: transfers and allowances
//!
//! [`CrowdsaleSuite`] deploys all four and registers them under one name.
//! [`CrowdsaleView`] reads the resulting state.

pub mod admin;
pub mod calls;
pub mod events;
pub mod fields;
pub mod index;
pub mod queries;
pub mod reasons;
pub mod sale;
pub mod suite;
pub mod token;

pub use admin::CrowdsaleAdmin;
pub use calls::InitParams;
pub use index::CrowdsaleIndex;
pub use queries::{CrowdsaleInfo, CrowdsaleView, SaleWindow, TokenInfo};
pub use sale::CrowdsaleSale;
pub use suite::{CrowdsaleSuite, APP_NAME};
pub use token::CrowdsaleToken;
