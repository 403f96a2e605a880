//! Takara Vaults Storage Layer
//!
//! The engine is stateless and horizontally scaled; every concurrency
//! guarantee it relies on lives behind this boundary as an atomic
//! conditional update ("update where returned = false"), never as an
//! in-engine lock. `MemoryStore` is the reference implementation and the
//! one the test suite runs against; `SnapshotStore` persists its state
//! between runs.

pub mod memory;
pub mod snapshot;

pub use memory::{LedgerState, MemoryStore};
pub use snapshot::SnapshotStore;

use chrono::{DateTime, Utc};

use vault_core::{Investment, Result, RewardBoost, TaxEntry};

/// Persistence boundary for investments, boosts and the tax ledger
///
/// Reads return a snapshot of persisted state. Writes marked "conditional"
/// are compare-and-set operations: of N concurrent attempts exactly one
/// succeeds and the rest receive a named state-conflict error. Any
/// transport failure surfaces as `EngineError::StoreUnavailable`; the
/// engine never substitutes a default for a failed read.
pub trait InvestmentStore: Send + Sync {
    fn investment(&self, id: &str) -> Result<Investment>;

    fn insert_investment(&self, investment: Investment) -> Result<()>;

    /// Activate a pending investment
    fn activate(&self, id: &str) -> Result<Investment>;

    fn boost_for(&self, investment_id: &str) -> Result<Option<RewardBoost>>;

    /// Sum of entry-locked reward tokens across investments that have not
    /// reached a terminal state
    fn aggregate_entry_locked(&self) -> Result<f64>;

    /// Sum of un-returned boost amounts
    fn aggregate_boost_locked(&self) -> Result<f64>;

    /// Sum of recorded cumulative mined totals
    fn aggregate_mined(&self) -> Result<f64>;

    /// Conditional: create the boost row and update the investment's
    /// effective yield as one atomic write; fails `BoostAlreadyPosted`
    /// if a boost row already exists for the investment
    fn insert_boost_and_set_yield(&self, boost: RewardBoost, new_yield_pct: f64) -> Result<()>;

    /// Conditional: set `returned = true` where it is false; distinguishes
    /// `BoostNotFound` from `BoostAlreadyReturned`
    fn mark_boost_returned(&self, investment_id: &str, at: DateTime<Utc>) -> Result<RewardBoost>;

    /// Monotonic: raises the stored cumulative mined total to `cumulative`
    /// if higher, otherwise leaves it unchanged. Returns the stored total,
    /// so a retried accrual never double-counts.
    fn record_mined(&self, investment_id: &str, cumulative: f64) -> Result<f64>;

    /// Conditional: ACTIVE -> SOLD, guarded on the prior status; sets the
    /// instant-sale price snapshot. Exactly one of two concurrent sale
    /// attempts succeeds.
    fn transition_to_sold(
        &self,
        investment_id: &str,
        sale_price: f64,
        at: DateTime<Utc>,
    ) -> Result<Investment>;

    fn append_tax_entry(&self, entry: TaxEntry) -> Result<()>;

    fn tax_entries(&self) -> Result<Vec<TaxEntry>>;

    fn aggregate_tax_collected(&self) -> Result<f64>;

    fn aggregate_tax_withdrawn(&self) -> Result<f64>;
}
