//! Dynamic reward-token pricing
//!
//! The current price interpolates between a configured initial and target
//! price from three normalized factors:
//!
//! - `t`: elapsed fraction of the distribution period (linear)
//! - `s`: circulating share of total supply, logarithmically compressed
//!   so early supply growth moves price more than late growth
//! - `d`: mining difficulty, normalized against the expected maximum
//!
//! `price = initial + (target - initial) * (w_t*t + w_s*s + w_d*d)`
//!
//! The returned breakdown exposes each factor and its dollar contribution;
//! the audit trail and the admin view both depend on that decomposition.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vault_core::{DifficultyProvider, EngineConfig, PriceWeights, Result};
use vault_storage::InvestmentStore;

use crate::supply::{SupplyLedger, SupplySnapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub price: f64,

    pub time_factor: f64,
    pub supply_factor: f64,
    pub difficulty_factor: f64,

    /// Dollar contribution of each factor to the spread above initial price
    pub time_contribution_usd: f64,
    pub supply_contribution_usd: f64,
    pub difficulty_contribution_usd: f64,

    pub weights: PriceWeights,

    /// True when the operator override short-circuited the formula
    pub manual_override: bool,
    /// True when the difficulty source was down and a cached difficulty
    /// factor was reused
    pub stale_difficulty: bool,

    pub computed_at: DateTime<Utc>,
}

/// Price projection under the conservative extrapolation assumption:
/// only elapsed time moves; supply and difficulty are held at their
/// current readings. Not a forecast of either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectedPrice {
    pub days_ahead: u32,
    pub price: f64,
    pub time_factor: f64,
    pub supply_factor: f64,
    pub difficulty_factor: f64,
}

/// Short-TTL price cache, safe for concurrent readers
///
/// One slot guarded by a lock: readers see either the previous or the new
/// breakdown, never a torn value. Any operation that changes supply must
/// call `invalidate` within the same request lifecycle.
pub struct PriceCache {
    ttl_secs: i64,
    slot: RwLock<Option<PriceBreakdown>>,
}

impl PriceCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs: ttl_secs as i64,
            slot: RwLock::new(None),
        }
    }

    /// Cached breakdown, only if still within TTL at `now`
    pub fn get(&self, now: DateTime<Utc>) -> Option<PriceBreakdown> {
        let slot = self.slot.read();
        slot.as_ref()
            .filter(|b| (now - b.computed_at).num_seconds() <= self.ttl_secs)
            .cloned()
    }

    /// Last cached breakdown regardless of age, for the stale-difficulty
    /// fallback
    pub fn last(&self) -> Option<PriceBreakdown> {
        self.slot.read().clone()
    }

    pub fn put(&self, breakdown: PriceBreakdown) {
        *self.slot.write() = Some(breakdown);
    }

    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}

pub struct PricingEngine {
    config: EngineConfig,
    launch: DateTime<Utc>,
    cache: PriceCache,
}

impl PricingEngine {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            launch: config.launch_date()?,
            cache: PriceCache::new(config.price_cache_ttl_secs),
            config: config.clone(),
        })
    }

    /// Elapsed fraction of the distribution period, clamped to [0, 1]
    pub fn time_factor(&self, now: DateTime<Utc>) -> f64 {
        let elapsed_days = (now - self.launch).num_seconds() as f64 / 86_400.0;
        (elapsed_days / self.config.distribution_days as f64).clamp(0.0, 1.0)
    }

    /// Logarithmically compressed circulating share, clamped to [0, 1]
    pub fn supply_factor(&self, supply: &SupplySnapshot) -> f64 {
        let ratio = (supply.circulating_supply / self.config.total_supply).clamp(0.0, 1.0);
        let k = self.config.supply_curve_k;
        ((1.0 + k * ratio).ln() / (1.0 + k).ln()).clamp(0.0, 1.0)
    }

    /// Difficulty normalized against the expected maximum, clamped to [0, 1]
    pub fn difficulty_factor(&self, difficulty: f64) -> f64 {
        ((difficulty - 1.0) / (self.config.max_expected_difficulty - 1.0)).clamp(0.0, 1.0)
    }

    fn interpolate(&self, t: f64, s: f64, d: f64) -> f64 {
        let w = &self.config.weights;
        let blend = w.time * t + w.supply * s + w.difficulty * d;
        self.config.initial_price + (self.config.target_price - self.config.initial_price) * blend
    }

    /// Pure formula evaluation over explicit inputs
    pub fn breakdown(
        &self,
        now: DateTime<Utc>,
        supply: &SupplySnapshot,
        difficulty: f64,
    ) -> PriceBreakdown {
        let t = self.time_factor(now);
        let s = self.supply_factor(supply);
        let d = self.difficulty_factor(difficulty);

        let spread = self.config.target_price - self.config.initial_price;
        let w = self.config.weights;

        PriceBreakdown {
            price: self.interpolate(t, s, d),
            time_factor: t,
            supply_factor: s,
            difficulty_factor: d,
            time_contribution_usd: w.time * t * spread,
            supply_contribution_usd: w.supply * s * spread,
            difficulty_contribution_usd: w.difficulty * d * spread,
            weights: w,
            manual_override: false,
            stale_difficulty: false,
            computed_at: now,
        }
    }

    fn override_breakdown(&self, price: f64, now: DateTime<Utc>) -> PriceBreakdown {
        PriceBreakdown {
            price,
            time_factor: 0.0,
            supply_factor: 0.0,
            difficulty_factor: 0.0,
            time_contribution_usd: 0.0,
            supply_contribution_usd: 0.0,
            difficulty_contribution_usd: 0.0,
            weights: self.config.weights,
            manual_override: true,
            stale_difficulty: false,
            computed_at: now,
        }
    }

    /// Current price at `now`
    ///
    /// Supply is always aggregated fresh; an unavailable supply aggregate
    /// fails the call. When only the difficulty refresh fails, the last
    /// cached breakdown is returned marked stale: supply-changing
    /// operations invalidate the cache, so a surviving entry still
    /// reflects current supply.
    pub fn current_price(
        &self,
        now: DateTime<Utc>,
        store: &dyn InvestmentStore,
        difficulty: &dyn DifficultyProvider,
    ) -> Result<PriceBreakdown> {
        if let Some(price) = self.config.manual_price_override {
            return Ok(self.override_breakdown(price, now));
        }

        if let Some(hit) = self.cache.get(now) {
            debug!(price = hit.price, "price cache hit");
            return Ok(hit);
        }

        let supply = SupplyLedger::compute(store)?;

        match difficulty.latest() {
            Ok(reading) => {
                let breakdown = self.breakdown(now, &supply, reading.value);
                self.cache.put(breakdown.clone());
                Ok(breakdown)
            }
            Err(err) => match self.cache.last() {
                Some(mut stale) => {
                    warn!(error = %err, "difficulty source down, serving stale price");
                    stale.stale_difficulty = true;
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    /// Price `days_ahead` from `now`: time factor extrapolated, supply and
    /// difficulty factors held at their current values
    pub fn project_price(
        &self,
        now: DateTime<Utc>,
        days_ahead: u32,
        store: &dyn InvestmentStore,
        difficulty: &dyn DifficultyProvider,
    ) -> Result<ProjectedPrice> {
        let current = self.current_price(now, store, difficulty)?;
        if current.manual_override {
            return Ok(ProjectedPrice {
                days_ahead,
                price: current.price,
                time_factor: current.time_factor,
                supply_factor: current.supply_factor,
                difficulty_factor: current.difficulty_factor,
            });
        }

        let future = now + chrono::Duration::days(days_ahead as i64);
        let t = self.time_factor(future);
        Ok(ProjectedPrice {
            days_ahead,
            price: self.interpolate(t, current.supply_factor, current.difficulty_factor),
            time_factor: t,
            supply_factor: current.supply_factor,
            difficulty_factor: current.difficulty_factor,
        })
    }

    /// Drop the cached price; called by every supply-changing operation
    pub fn invalidate_cache(&self) {
        debug!("price cache invalidated");
        self.cache.invalidate();
    }
}
