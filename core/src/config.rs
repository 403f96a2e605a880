//! Engine configuration
//!
//! Every tunable the engine consumes lives in one explicit struct that is
//! passed to each component at construction. Nothing reads the process
//! environment; tests override fields directly and deployments load a TOML
//! file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::tier::VaultTier;

/// Factor weights for the pricing formula; must sum to 1
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceWeights {
    pub time: f64,
    pub supply: f64,
    pub difficulty: f64,
}

impl PriceWeights {
    pub fn sum(&self) -> f64 {
        self.time + self.supply + self.difficulty
    }
}

impl Default for PriceWeights {
    fn default() -> Self {
        Self {
            time: 0.40,
            supply: 0.40,
            difficulty: 0.20,
        }
    }
}

/// Shape of the accrual multiplier as a function of difficulty
///
/// The exact curve is a policy knob, not a hard-coded formula. Every
/// variant is monotonically increasing and evaluates to 1.0 at
/// difficulty 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "curve", rename_all = "snake_case")]
pub enum DifficultyCurve {
    Linear { slope: f64 },
    Sqrt { scale: f64 },
}

impl DifficultyCurve {
    pub fn multiplier(&self, difficulty: f64) -> f64 {
        let d = difficulty.max(1.0);
        match self {
            DifficultyCurve::Linear { slope } => 1.0 + slope * (d - 1.0),
            DifficultyCurve::Sqrt { scale } => 1.0 + scale * (d - 1.0).sqrt(),
        }
    }
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        DifficultyCurve::Linear { slope: 0.25 }
    }
}

/// Per-tier limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierPolicy {
    /// Maximum effective yield for the tier (percent APY)
    pub max_yield_pct: f64,
    /// Maximum boost valuation as a percentage of committed principal
    pub max_boost_pct: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TierSchedule {
    pub starter: TierPolicy,
    pub pro: TierPolicy,
    pub elite: TierPolicy,
}

impl TierSchedule {
    pub fn policy(&self, tier: VaultTier) -> TierPolicy {
        match tier {
            VaultTier::Starter => self.starter,
            VaultTier::Pro => self.pro,
            VaultTier::Elite => self.elite,
        }
    }
}

impl Default for TierSchedule {
    fn default() -> Self {
        Self {
            starter: VaultTier::Starter.default_policy(),
            pro: VaultTier::Pro.default_policy(),
            elite: VaultTier::Elite.default_policy(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reward-token launch date; required, there is no sensible default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_date: Option<DateTime<Utc>>,

    /// Price at launch (USD per reward token)
    pub initial_price: f64,
    /// Price at the end of the distribution period
    pub target_price: f64,
    /// Length of the distribution period in days
    pub distribution_days: u32,
    /// Total reward-token supply the circulating ratio is measured against
    pub total_supply: f64,

    pub weights: PriceWeights,
    /// Compression constant for the supply factor; higher k means early
    /// supply growth moves price more
    pub supply_curve_k: f64,
    /// Difficulty reading that maps to a difficulty factor of 1.0
    pub max_expected_difficulty: f64,
    pub difficulty_curve: DifficultyCurve,

    /// Early-exit penalty (percent of market value)
    pub discount_pct: f64,
    /// Claim tax routed to the treasury (percent)
    pub tax_pct: f64,

    pub tiers: TierSchedule,

    /// Price cache lifetime; cross-request staleness up to this is accepted
    pub price_cache_ttl_secs: u64,

    /// Emergency kill-switch: when set, used verbatim as the current price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_price_override: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            launch_date: None,
            initial_price: 0.001,
            target_price: 0.10,
            distribution_days: 1095,
            total_supply: 1_000_000_000.0,
            weights: PriceWeights::default(),
            supply_curve_k: 9.0,
            max_expected_difficulty: 10.0,
            difficulty_curve: DifficultyCurve::default(),
            discount_pct: 20.0,
            tax_pct: 5.0,
            tiers: TierSchedule::default(),
            price_cache_ttl_secs: 30,
            manual_price_override: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| EngineError::InvalidConfig(format!("read config file: {}", e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| EngineError::InvalidConfig(format!("parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn launch_date(&self) -> Result<DateTime<Utc>> {
        self.launch_date
            .ok_or(EngineError::MissingConfig("launch_date"))
    }

    pub fn validate(&self) -> Result<()> {
        self.launch_date()?;

        if self.initial_price <= 0.0 || self.target_price <= self.initial_price {
            return Err(EngineError::InvalidConfig(format!(
                "prices must satisfy 0 < initial ({}) < target ({})",
                self.initial_price, self.target_price
            )));
        }
        if self.distribution_days == 0 {
            return Err(EngineError::InvalidConfig(
                "distribution_days must be positive".to_string(),
            ));
        }
        if self.total_supply <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "total_supply must be positive".to_string(),
            ));
        }
        if (self.weights.sum() - 1.0).abs() > 1e-9 {
            return Err(EngineError::InvalidConfig(format!(
                "factor weights must sum to 1, got {}",
                self.weights.sum()
            )));
        }
        if self.supply_curve_k <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "supply_curve_k must be positive".to_string(),
            ));
        }
        if self.max_expected_difficulty <= 1.0 {
            return Err(EngineError::InvalidConfig(
                "max_expected_difficulty must exceed 1.0".to_string(),
            ));
        }
        if !(0.0..100.0).contains(&self.discount_pct) || !(0.0..100.0).contains(&self.tax_pct) {
            return Err(EngineError::InvalidConfig(
                "discount_pct and tax_pct must be in [0, 100)".to_string(),
            ));
        }
        if let Some(price) = self.manual_price_override {
            if !price.is_finite() || price <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "manual_price_override must be positive, got {}",
                    price
                )));
            }
        }
        for tier in VaultTier::all() {
            let policy = self.tiers.policy(tier);
            if policy.max_yield_pct <= 0.0 || policy.max_boost_pct <= 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "tier {} limits must be positive",
                    tier
                )));
            }
        }
        Ok(())
    }
}
