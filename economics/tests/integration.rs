use chrono::{DateTime, Duration, TimeZone, Utc};

use economics::{AccrualCalculator, PricingEngine, SupplyLedger};
use vault_core::{
    DifficultyCurve, EngineConfig, EngineError, ErrorKind, FixedDifficulty, Investment,
    InvestmentStatus, Result, RewardBoost, TaxEntry, VaultTier,
};
use vault_storage::{InvestmentStore, MemoryStore};

fn launch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn config() -> EngineConfig {
    EngineConfig {
        launch_date: Some(launch()),
        ..EngineConfig::default()
    }
}

fn active_investment(store: &MemoryStore) -> Investment {
    let mut inv = Investment::new(
        "user1".to_string(),
        VaultTier::Pro,
        10_000.0,
        9.0,
        500.0,
        500.0,
        launch(),
        1095,
    );
    inv.status = InvestmentStatus::Active;
    store.insert_investment(inv.clone()).unwrap();
    inv
}

#[test]
fn test_accrual_feeds_supply_which_feeds_price() {
    let store = MemoryStore::new();
    let inv = active_investment(&store);

    let pricing = PricingEngine::new(&config()).unwrap();
    let accrual = AccrualCalculator::new(DifficultyCurve::default());
    let provider = FixedDifficulty(2.0);
    let now = launch() + Duration::days(30);

    let before = pricing.current_price(now, &store, &provider).unwrap();

    // Record 30 days of mining, invalidate, and reprice
    let mined = accrual.accrue_at(&inv, now, 2.0);
    store.record_mined(&inv.id, mined.cumulative).unwrap();
    pricing.invalidate_cache();

    let after = pricing
        .current_price(now + Duration::seconds(1), &store, &provider)
        .unwrap();
    assert!(after.supply_factor > before.supply_factor);
    assert!(after.price > before.price);
}

#[test]
fn test_boost_lock_and_return_move_supply() {
    let store = MemoryStore::new();
    let inv = active_investment(&store);

    store
        .insert_boost_and_set_yield(
            RewardBoost::new(inv.id.clone(), 2_000.0, 100.0, 2_000.0, 3.0, launch()),
            12.0,
        )
        .unwrap();

    let locked = SupplyLedger::compute(&store).unwrap();
    assert_eq!(locked.total_boost_locked, 2_000.0);
    assert_eq!(
        locked.circulating_supply,
        locked.total_mined + locked.total_entry_locked + locked.total_boost_locked
    );

    store.mark_boost_returned(&inv.id, Utc::now()).unwrap();
    let released = SupplyLedger::compute(&store).unwrap();
    assert_eq!(released.total_boost_locked, 0.0);
    assert_eq!(
        released.circulating_supply,
        locked.circulating_supply - 2_000.0
    );
}

/// Store whose aggregates are unreachable; everything else delegates
struct PartitionedStore {
    inner: MemoryStore,
}

impl PartitionedStore {
    fn unavailable<T>() -> Result<T> {
        Err(EngineError::StoreUnavailable("connection reset".into()))
    }
}

impl InvestmentStore for PartitionedStore {
    fn investment(&self, id: &str) -> Result<Investment> {
        self.inner.investment(id)
    }
    fn insert_investment(&self, investment: Investment) -> Result<()> {
        self.inner.insert_investment(investment)
    }
    fn activate(&self, id: &str) -> Result<Investment> {
        self.inner.activate(id)
    }
    fn boost_for(&self, investment_id: &str) -> Result<Option<RewardBoost>> {
        self.inner.boost_for(investment_id)
    }
    fn aggregate_entry_locked(&self) -> Result<f64> {
        Self::unavailable()
    }
    fn aggregate_boost_locked(&self) -> Result<f64> {
        Self::unavailable()
    }
    fn aggregate_mined(&self) -> Result<f64> {
        Self::unavailable()
    }
    fn insert_boost_and_set_yield(&self, boost: RewardBoost, new_yield_pct: f64) -> Result<()> {
        self.inner.insert_boost_and_set_yield(boost, new_yield_pct)
    }
    fn mark_boost_returned(&self, investment_id: &str, at: DateTime<Utc>) -> Result<RewardBoost> {
        self.inner.mark_boost_returned(investment_id, at)
    }
    fn record_mined(&self, investment_id: &str, cumulative: f64) -> Result<f64> {
        self.inner.record_mined(investment_id, cumulative)
    }
    fn transition_to_sold(
        &self,
        investment_id: &str,
        sale_price: f64,
        at: DateTime<Utc>,
    ) -> Result<Investment> {
        self.inner.transition_to_sold(investment_id, sale_price, at)
    }
    fn append_tax_entry(&self, entry: TaxEntry) -> Result<()> {
        self.inner.append_tax_entry(entry)
    }
    fn tax_entries(&self) -> Result<Vec<TaxEntry>> {
        self.inner.tax_entries()
    }
    fn aggregate_tax_collected(&self) -> Result<f64> {
        Self::unavailable()
    }
    fn aggregate_tax_withdrawn(&self) -> Result<f64> {
        Self::unavailable()
    }
}

#[test]
fn test_supply_fails_closed_when_aggregates_unavailable() {
    let store = PartitionedStore {
        inner: MemoryStore::new(),
    };

    let err = SupplyLedger::compute(&store).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DependencyUnavailable);
}

#[test]
fn test_pricing_fails_when_supply_unavailable_even_with_cache() {
    let store = PartitionedStore {
        inner: MemoryStore::new(),
    };
    let pricing = PricingEngine::new(&config()).unwrap();

    // A wrong price is worse than a failed request: no fallback to zero
    let err = pricing
        .current_price(Utc::now(), &store, &FixedDifficulty(1.0))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DependencyUnavailable);
}
