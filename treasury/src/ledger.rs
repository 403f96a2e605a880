//! Tax ledger operations and financial reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use vault_core::{EngineError, Result, TaxEntry, TaxEntryKind};
use vault_storage::InvestmentStore;

/// Summary for the admin surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryReport {
    pub collected_total: f64,
    pub withdrawn_total: f64,
    pub balance: f64,
    pub from_instant_sales: f64,
    pub from_reward_claims: f64,
    pub entry_count: usize,
}

pub struct TaxLedger;

impl TaxLedger {
    /// Record a tax collection against the ledger
    pub fn collect(
        store: &dyn InvestmentStore,
        kind: TaxEntryKind,
        amount: f64,
        reference: &str,
        at: DateTime<Utc>,
    ) -> Result<TaxEntry> {
        if kind == TaxEntryKind::Withdrawal {
            return Err(EngineError::InvalidParameter {
                field: "kind",
                message: "withdrawals go through TaxLedger::withdraw".to_string(),
            });
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::InvalidAmount(format!(
                "tax amount must be positive, got {}",
                amount
            )));
        }

        let entry = TaxEntry::new(kind, amount, reference.to_string(), at);
        store.append_tax_entry(entry.clone())?;
        info!(amount, reference, "tax collected");
        Ok(entry)
    }

    /// Withdraw from the treasury; guarded by the current balance
    pub fn withdraw(
        store: &dyn InvestmentStore,
        amount: f64,
        reference: &str,
        at: DateTime<Utc>,
    ) -> Result<TaxEntry> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::InvalidAmount(format!(
                "withdrawal must be positive, got {}",
                amount
            )));
        }

        let available = Self::balance(store)?;
        if amount > available {
            return Err(EngineError::InsufficientTreasuryBalance {
                requested: amount,
                available,
            });
        }

        let entry = TaxEntry::new(TaxEntryKind::Withdrawal, amount, reference.to_string(), at);
        store.append_tax_entry(entry.clone())?;
        info!(amount, reference, "treasury withdrawal");
        Ok(entry)
    }

    pub fn balance(store: &dyn InvestmentStore) -> Result<f64> {
        Ok(store.aggregate_tax_collected()? - store.aggregate_tax_withdrawn()?)
    }

    pub fn report(store: &dyn InvestmentStore) -> Result<TreasuryReport> {
        let entries = store.tax_entries()?;

        let mut collected_total = 0.0;
        let mut withdrawn_total = 0.0;
        let mut from_instant_sales = 0.0;
        let mut from_reward_claims = 0.0;

        for entry in &entries {
            match entry.kind {
                TaxEntryKind::InstantSale => {
                    collected_total += entry.amount;
                    from_instant_sales += entry.amount;
                }
                TaxEntryKind::RewardClaim => {
                    collected_total += entry.amount;
                    from_reward_claims += entry.amount;
                }
                TaxEntryKind::Withdrawal => withdrawn_total += entry.amount,
            }
        }

        Ok(TreasuryReport {
            collected_total,
            withdrawn_total,
            balance: collected_total - withdrawn_total,
            from_instant_sales,
            from_reward_claims,
            entry_count: entries.len(),
        })
    }
}
