//! Takara Vaults Economics Module
//!
//! Implements the token-economics core:
//! - Circulating-supply ledger
//! - Dynamic reward-token pricing
//! - Mining accrual per investment

pub mod mining;
pub mod pricing;
pub mod supply;

pub use mining::{AccrualCalculator, MiningAccrual};
pub use pricing::{PriceBreakdown, PriceCache, PricingEngine, ProjectedPrice};
pub use supply::{SupplyLedger, SupplySnapshot};
