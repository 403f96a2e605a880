//! In-memory reference store
//!
//! Every conditional update takes the single write lock, checks its guard
//! and applies the write while still holding it, which gives the same
//! exactly-once behavior a SQL `UPDATE ... WHERE` provides.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use vault_core::{
    EngineError, Investment, InvestmentStatus, Result, RewardBoost, TaxEntry, TaxEntryKind,
};

use crate::InvestmentStore;

/// Full persisted state, snapshotable as one unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerState {
    pub investments: HashMap<String, Investment>,
    /// Keyed by investment id; at most one boost per investment
    pub boosts: HashMap<String, RewardBoost>,
    pub tax_entries: Vec<TaxEntry>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<LedgerState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: LedgerState) -> Self {
        Self {
            inner: RwLock::new(state),
        }
    }

    /// Clone of the full state, for snapshotting
    pub fn state(&self) -> LedgerState {
        self.inner.read().clone()
    }
}

impl InvestmentStore for MemoryStore {
    fn investment(&self, id: &str) -> Result<Investment> {
        self.inner
            .read()
            .investments
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::InvestmentNotFound(id.to_string()))
    }

    fn insert_investment(&self, investment: Investment) -> Result<()> {
        self.inner
            .write()
            .investments
            .insert(investment.id.clone(), investment);
        Ok(())
    }

    fn activate(&self, id: &str) -> Result<Investment> {
        let mut state = self.inner.write();
        let inv = state
            .investments
            .get_mut(id)
            .ok_or_else(|| EngineError::InvestmentNotFound(id.to_string()))?;
        if inv.status != InvestmentStatus::Pending {
            return Err(EngineError::InvestmentNotActive {
                id: id.to_string(),
                status: inv.status.to_string(),
            });
        }
        inv.status = InvestmentStatus::Active;
        Ok(inv.clone())
    }

    fn boost_for(&self, investment_id: &str) -> Result<Option<RewardBoost>> {
        Ok(self.inner.read().boosts.get(investment_id).cloned())
    }

    fn aggregate_entry_locked(&self) -> Result<f64> {
        Ok(self
            .inner
            .read()
            .investments
            .values()
            .filter(|inv| inv.holds_entry_lock())
            .map(|inv| inv.entry_locked_tokens)
            .sum())
    }

    fn aggregate_boost_locked(&self) -> Result<f64> {
        Ok(self
            .inner
            .read()
            .boosts
            .values()
            .filter(|b| b.is_locked())
            .map(|b| b.amount)
            .sum())
    }

    fn aggregate_mined(&self) -> Result<f64> {
        Ok(self
            .inner
            .read()
            .investments
            .values()
            .map(|inv| inv.mined_total)
            .sum())
    }

    fn insert_boost_and_set_yield(&self, boost: RewardBoost, new_yield_pct: f64) -> Result<()> {
        let mut state = self.inner.write();
        let investment_id = boost.investment_id.clone();

        if state.boosts.contains_key(&investment_id) {
            return Err(EngineError::BoostAlreadyPosted(investment_id));
        }
        let inv = state
            .investments
            .get_mut(&investment_id)
            .ok_or_else(|| EngineError::InvestmentNotFound(investment_id.clone()))?;
        if inv.status != InvestmentStatus::Active {
            return Err(EngineError::InvestmentNotActive {
                id: investment_id,
                status: inv.status.to_string(),
            });
        }

        // Both writes under the same lock: boost row and yield update land
        // together or not at all
        inv.yield_pct = new_yield_pct;
        state.boosts.insert(investment_id, boost);
        Ok(())
    }

    fn mark_boost_returned(&self, investment_id: &str, at: DateTime<Utc>) -> Result<RewardBoost> {
        let mut state = self.inner.write();
        let boost = state
            .boosts
            .get_mut(investment_id)
            .ok_or_else(|| EngineError::BoostNotFound(investment_id.to_string()))?;
        if boost.returned {
            return Err(EngineError::BoostAlreadyReturned(investment_id.to_string()));
        }
        boost.returned = true;
        boost.returned_at = Some(at);
        Ok(boost.clone())
    }

    fn record_mined(&self, investment_id: &str, cumulative: f64) -> Result<f64> {
        let mut state = self.inner.write();
        let inv = state
            .investments
            .get_mut(investment_id)
            .ok_or_else(|| EngineError::InvestmentNotFound(investment_id.to_string()))?;
        if cumulative > inv.mined_total {
            inv.mined_total = cumulative;
        }
        Ok(inv.mined_total)
    }

    fn transition_to_sold(
        &self,
        investment_id: &str,
        sale_price: f64,
        at: DateTime<Utc>,
    ) -> Result<Investment> {
        let mut state = self.inner.write();
        let inv = state
            .investments
            .get_mut(investment_id)
            .ok_or_else(|| EngineError::InvestmentNotFound(investment_id.to_string()))?;
        match inv.status {
            InvestmentStatus::Active => {
                inv.status = InvestmentStatus::Sold;
                inv.instant_sale_price = Some(sale_price);
                inv.sold_at = Some(at);
                Ok(inv.clone())
            }
            InvestmentStatus::Sold => Err(EngineError::AlreadySold(investment_id.to_string())),
            status => Err(EngineError::InvestmentNotActive {
                id: investment_id.to_string(),
                status: status.to_string(),
            }),
        }
    }

    fn append_tax_entry(&self, entry: TaxEntry) -> Result<()> {
        self.inner.write().tax_entries.push(entry);
        Ok(())
    }

    fn tax_entries(&self) -> Result<Vec<TaxEntry>> {
        Ok(self.inner.read().tax_entries.clone())
    }

    fn aggregate_tax_collected(&self) -> Result<f64> {
        Ok(self
            .inner
            .read()
            .tax_entries
            .iter()
            .filter(|e| e.kind.is_collection())
            .map(|e| e.amount)
            .sum())
    }

    fn aggregate_tax_withdrawn(&self) -> Result<f64> {
        Ok(self
            .inner
            .read()
            .tax_entries
            .iter()
            .filter(|e| e.kind == TaxEntryKind::Withdrawal)
            .map(|e| e.amount)
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vault_core::VaultTier;

    fn active_investment() -> Investment {
        let mut inv = Investment::new(
            "user1".to_string(),
            VaultTier::Pro,
            10_000.0,
            9.0,
            500.0,
            500.0,
            Utc::now(),
            1095,
        );
        inv.status = InvestmentStatus::Active;
        inv
    }

    fn boost_for_investment(inv: &Investment) -> RewardBoost {
        RewardBoost::new(inv.id.clone(), 1_000.0, 50.0, 2_000.0, 2.0, Utc::now())
    }

    #[test]
    fn test_boost_insert_is_atomic_with_yield_update() {
        let store = MemoryStore::new();
        let inv = active_investment();
        let id = inv.id.clone();
        store.insert_investment(inv.clone()).unwrap();

        let boost = boost_for_investment(&inv);
        store.insert_boost_and_set_yield(boost, 11.0).unwrap();

        assert_eq!(store.investment(&id).unwrap().yield_pct, 11.0);
        assert!(store.boost_for(&id).unwrap().is_some());

        // Second post must not change the yield
        let again = boost_for_investment(&inv);
        let err = store.insert_boost_and_set_yield(again, 15.0).unwrap_err();
        assert!(matches!(err, EngineError::BoostAlreadyPosted(_)));
        assert_eq!(store.investment(&id).unwrap().yield_pct, 11.0);
    }

    #[test]
    fn test_mark_boost_returned_distinguishes_missing_from_returned() {
        let store = MemoryStore::new();
        let inv = active_investment();
        let id = inv.id.clone();
        store.insert_investment(inv.clone()).unwrap();

        let err = store.mark_boost_returned(&id, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::BoostNotFound(_)));

        let boost = boost_for_investment(&inv);
        store.insert_boost_and_set_yield(boost, 11.0).unwrap();

        let returned = store.mark_boost_returned(&id, Utc::now()).unwrap();
        assert!(returned.returned);
        assert!(returned.returned_at.is_some());

        let err = store.mark_boost_returned(&id, Utc::now()).unwrap_err();
        assert!(matches!(err, EngineError::BoostAlreadyReturned(_)));
    }

    #[test]
    fn test_concurrent_boost_return_succeeds_exactly_once() {
        let store = Arc::new(MemoryStore::new());
        let inv = active_investment();
        let id = inv.id.clone();
        store.insert_investment(inv.clone()).unwrap();
        store
            .insert_boost_and_set_yield(boost_for_investment(&inv), 11.0)
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                std::thread::spawn(move || store.mark_boost_returned(&id, Utc::now()).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn test_concurrent_sale_succeeds_exactly_once() {
        let store = Arc::new(MemoryStore::new());
        let inv = active_investment();
        let id = inv.id.clone();
        store.insert_investment(inv).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                std::thread::spawn(move || {
                    store.transition_to_sold(&id, 8_740.0, Utc::now()).is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(
            store.investment(&id).unwrap().status,
            InvestmentStatus::Sold
        );
    }

    #[test]
    fn test_record_mined_is_monotonic() {
        let store = MemoryStore::new();
        let inv = active_investment();
        let id = inv.id.clone();
        store.insert_investment(inv).unwrap();

        assert_eq!(store.record_mined(&id, 100.0).unwrap(), 100.0);
        // Retried accrual with a stale lower total is a no-op
        assert_eq!(store.record_mined(&id, 60.0).unwrap(), 100.0);
        assert_eq!(store.record_mined(&id, 150.0).unwrap(), 150.0);
        assert_eq!(store.aggregate_mined().unwrap(), 150.0);
    }

    #[test]
    fn test_entry_lock_aggregate_excludes_terminal_states() {
        let store = MemoryStore::new();
        let mut a = active_investment();
        a.entry_locked_tokens = 300.0;
        let mut b = active_investment();
        b.entry_locked_tokens = 200.0;
        b.status = InvestmentStatus::Completed;
        store.insert_investment(a).unwrap();
        store.insert_investment(b).unwrap();

        assert_eq!(store.aggregate_entry_locked().unwrap(), 300.0);
    }

    #[test]
    fn test_tax_aggregates() {
        let store = MemoryStore::new();
        store
            .append_tax_entry(TaxEntry::new(
                TaxEntryKind::InstantSale,
                460.0,
                "inv1".to_string(),
                Utc::now(),
            ))
            .unwrap();
        store
            .append_tax_entry(TaxEntry::new(
                TaxEntryKind::RewardClaim,
                40.0,
                "inv2".to_string(),
                Utc::now(),
            ))
            .unwrap();
        store
            .append_tax_entry(TaxEntry::new(
                TaxEntryKind::Withdrawal,
                100.0,
                "ops budget".to_string(),
                Utc::now(),
            ))
            .unwrap();

        assert_eq!(store.aggregate_tax_collected().unwrap(), 500.0);
        assert_eq!(store.aggregate_tax_withdrawn().unwrap(), 100.0);
    }
}
