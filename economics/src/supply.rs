//! Circulating-supply ledger
//!
//! Locked-but-user-owned tokens count as circulating before unlock: they
//! affect scarcity perception the moment they exist. The treasury balance
//! is tracked separately and is not part of circulating supply.

use serde::{Deserialize, Serialize};

use vault_core::Result;
use vault_storage::InvestmentStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SupplySnapshot {
    pub total_mined: f64,
    pub total_entry_locked: f64,
    pub total_boost_locked: f64,
    pub treasury_balance: f64,
    pub circulating_supply: f64,
}

pub struct SupplyLedger;

impl SupplyLedger {
    /// Aggregate a fresh supply snapshot from the store
    ///
    /// Fails closed: any unavailable aggregate fails the whole snapshot.
    /// Substituting zero would understate supply and overstate price.
    pub fn compute(store: &dyn InvestmentStore) -> Result<SupplySnapshot> {
        let total_mined = store.aggregate_mined()?;
        let total_entry_locked = store.aggregate_entry_locked()?;
        let total_boost_locked = store.aggregate_boost_locked()?;
        let collected = store.aggregate_tax_collected()?;
        let withdrawn = store.aggregate_tax_withdrawn()?;

        Ok(SupplySnapshot {
            total_mined,
            total_entry_locked,
            total_boost_locked,
            treasury_balance: collected - withdrawn,
            circulating_supply: total_mined + total_entry_locked + total_boost_locked,
        })
    }
}
