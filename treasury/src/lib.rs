//! Takara Vaults Treasury Module
//!
//! The treasury accumulates tax withheld from instant sales and reward
//! claims. Its balance is collected minus withdrawn, derived entirely
//! from the append-only tax ledger, and feeds the supply ledger's
//! treasury figure.

pub mod ledger;

pub use ledger::{TaxLedger, TreasuryReport};
