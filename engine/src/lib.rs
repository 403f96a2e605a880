//! Takara Vaults Engine
//!
//! Facade over the token-economics core. Wires the configuration, the
//! persistence boundary and the difficulty source into the supply ledger,
//! pricing engine, accrual calculator, boost lifecycle and exit
//! calculator, and exposes the operation set the HTTP/admin layer
//! consumes. Every operation returns a typed `EngineError` on failure.

pub mod boost;
pub mod exit;

pub use boost::{BoostManager, BoostOutcome};
pub use exit::{ClaimTax, ExitCalculator, InstantSaleQuote, SaleOutcome};

use chrono::{DateTime, Utc};
use tracing::info;

use economics::{
    AccrualCalculator, MiningAccrual, PriceBreakdown, PricingEngine, ProjectedPrice, SupplyLedger,
    SupplySnapshot,
};
use treasury::{TaxLedger, TreasuryReport};
use vault_core::{DifficultyProvider, EngineConfig, Result, RewardBoost, TaxEntryKind};
use vault_storage::InvestmentStore;

pub struct VaultEngine<S, D>
where
    S: InvestmentStore,
    D: DifficultyProvider,
{
    store: S,
    difficulty: D,
    pricing: PricingEngine,
    accrual: AccrualCalculator,
    boosts: BoostManager,
    exits: ExitCalculator,
}

impl<S, D> VaultEngine<S, D>
where
    S: InvestmentStore,
    D: DifficultyProvider,
{
    pub fn new(config: EngineConfig, store: S, difficulty: D) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pricing: PricingEngine::new(&config)?,
            accrual: AccrualCalculator::new(config.difficulty_curve),
            boosts: BoostManager::new(config.tiers),
            exits: ExitCalculator::new(config.discount_pct, config.tax_pct),
            store,
            difficulty,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fresh supply snapshot; fails closed on any unavailable aggregate
    pub fn compute_supply(&self) -> Result<SupplySnapshot> {
        SupplyLedger::compute(&self.store)
    }

    pub fn current_price(&self, now: DateTime<Utc>) -> Result<PriceBreakdown> {
        self.pricing.current_price(now, &self.store, &self.difficulty)
    }

    pub fn project_price(&self, now: DateTime<Utc>, days_ahead: u32) -> Result<ProjectedPrice> {
        self.pricing
            .project_price(now, days_ahead, &self.store, &self.difficulty)
    }

    /// Reward tokens per day for an investment at current difficulty
    pub fn daily_rate(&self, investment_id: &str) -> Result<f64> {
        let investment = self.store.investment(investment_id)?;
        let reading = self.difficulty.latest()?;
        Ok(self.accrual.daily_rate(&investment, reading.value))
    }

    /// Pure accrual computation as of `now`; no state change
    pub fn accrue(&self, investment_id: &str, now: DateTime<Utc>) -> Result<MiningAccrual> {
        let investment = self.store.investment(investment_id)?;
        let reading = self.difficulty.latest()?;
        Ok(self.accrual.accrue_at(&investment, now, reading.value))
    }

    /// Accrue and persist the cumulative mined total
    ///
    /// The store write is monotonic, so retries cannot double-accrue. The
    /// new total changes supply, which invalidates the price cache within
    /// this same request.
    pub fn record_accrual(&self, investment_id: &str, now: DateTime<Utc>) -> Result<MiningAccrual> {
        let accrual = self.accrue(investment_id, now)?;
        self.store.record_mined(investment_id, accrual.cumulative)?;
        self.pricing.invalidate_cache();
        Ok(accrual)
    }

    /// Post a boost against an active investment, priced at post time
    pub fn post_boost(
        &self,
        investment_id: &str,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<BoostOutcome> {
        let price = self.current_price(now)?;
        let outcome = self
            .boosts
            .post(&self.store, investment_id, amount, &price, now)?;
        self.pricing.invalidate_cache();
        Ok(outcome)
    }

    /// Return a posted boost to its owner, exactly once
    pub fn return_boost(&self, investment_id: &str, now: DateTime<Utc>) -> Result<RewardBoost> {
        let boost = self.boosts.return_boost(&self.store, investment_id, now)?;
        self.pricing.invalidate_cache();
        Ok(boost)
    }

    /// Pure instant-sale quote, repeatable for display
    pub fn instant_sale_quote(&self, investment_id: &str) -> Result<InstantSaleQuote> {
        let investment = self.store.investment(investment_id)?;
        self.exits.quote(&investment)
    }

    /// One-way early exit; at most one success per investment
    pub fn execute_instant_sale(
        &self,
        investment_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SaleOutcome> {
        let outcome = self.exits.execute(&self.store, investment_id, now)?;
        self.pricing.invalidate_cache();
        Ok(outcome)
    }

    /// Withhold claim tax on a reward-token withdrawal and record it
    pub fn claim_tax(
        &self,
        investment_id: &str,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<ClaimTax> {
        let claim = self.exits.claim_tax(amount)?;
        TaxLedger::collect(
            &self.store,
            TaxEntryKind::RewardClaim,
            claim.tax,
            investment_id,
            now,
        )?;
        info!(investment_id, gross = claim.gross, tax = claim.tax, "claim tax withheld");
        Ok(claim)
    }

    pub fn treasury_report(&self) -> Result<TreasuryReport> {
        TaxLedger::report(&self.store)
    }
}
