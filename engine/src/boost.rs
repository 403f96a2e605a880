//! Boost lifecycle: NO_BOOST -> BOOSTED -> RETURNED
//!
//! The yield bonus is sized at post time and locked in once granted; the
//! boost's later return does not reprice it. Over-posting is allowed but
//! clamped: the user may lock excess collateral, it just buys no extra
//! yield.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use economics::PriceBreakdown;
use vault_core::{EngineError, Result, RewardBoost, TierSchedule};
use vault_storage::InvestmentStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoostOutcome {
    pub boost: RewardBoost,
    /// Share of the tier's boost allowance this posting filled, in [0, 1]
    pub fill_percent: f64,
    /// True when the posted value exceeded the allowance and was clamped
    pub clamped: bool,
    pub previous_yield_pct: f64,
    pub new_yield_pct: f64,
}

pub struct BoostManager {
    tiers: TierSchedule,
}

impl BoostManager {
    pub fn new(tiers: TierSchedule) -> Self {
        Self { tiers }
    }

    /// Post a boost against an active investment
    ///
    /// The store's conditional insert is the real exactly-once guard; the
    /// precondition reads here only produce friendlier errors for the
    /// common paths.
    pub fn post(
        &self,
        store: &dyn InvestmentStore,
        investment_id: &str,
        amount: f64,
        price: &PriceBreakdown,
        now: DateTime<Utc>,
    ) -> Result<BoostOutcome> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::InvalidAmount(format!(
                "boost amount must be positive, got {}",
                amount
            )));
        }

        let investment = store.investment(investment_id)?;
        if !investment.is_active() {
            return Err(EngineError::InvestmentNotActive {
                id: investment_id.to_string(),
                status: investment.status.to_string(),
            });
        }
        if store.boost_for(investment_id)?.is_some() {
            return Err(EngineError::BoostAlreadyPosted(investment_id.to_string()));
        }

        let policy = self.tiers.policy(investment.tier);
        let value_usd = amount * price.price;
        let max_allowed_usd = investment.principal_usd * policy.max_boost_pct / 100.0;

        let raw_fill = value_usd / max_allowed_usd;
        let clamped = raw_fill > 1.0;
        let fill_percent = raw_fill.min(1.0);
        if clamped {
            warn!(
                investment_id,
                value_usd, max_allowed_usd, "boost over-posted, excess earns no yield"
            );
        }

        let headroom = (policy.max_yield_pct - investment.yield_pct).max(0.0);
        let additional_yield_pct = fill_percent * headroom;
        let new_yield_pct = (investment.yield_pct + additional_yield_pct).min(policy.max_yield_pct);

        let boost = RewardBoost::new(
            investment_id.to_string(),
            amount,
            value_usd,
            max_allowed_usd,
            additional_yield_pct,
            now,
        );
        store.insert_boost_and_set_yield(boost.clone(), new_yield_pct)?;

        info!(
            investment_id,
            amount, value_usd, fill_percent, new_yield_pct, "boost posted"
        );

        Ok(BoostOutcome {
            boost,
            fill_percent,
            clamped,
            previous_yield_pct: investment.yield_pct,
            new_yield_pct,
        })
    }

    /// Return a posted boost to its owner, exactly once
    pub fn return_boost(
        &self,
        store: &dyn InvestmentStore,
        investment_id: &str,
        now: DateTime<Utc>,
    ) -> Result<RewardBoost> {
        let boost = store.mark_boost_returned(investment_id, now)?;
        info!(investment_id, amount = boost.amount, "boost returned");
        Ok(boost)
    }
}
