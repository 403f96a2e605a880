//! Vault tiers and their default limits

use serde::{Deserialize, Serialize};

use crate::config::TierPolicy;

/// Ordered vault tier: Starter < Pro < Elite
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum VaultTier {
    Starter, // entry product
    Pro,
    Elite,
}

impl VaultTier {
    /// Default maximum effective yield for the tier (percent APY)
    pub fn default_max_yield_pct(&self) -> f64 {
        match self {
            VaultTier::Starter => 12.0,
            VaultTier::Pro => 18.0,
            VaultTier::Elite => 24.0,
        }
    }

    /// Default maximum boost valuation as a percentage of committed principal
    pub fn default_max_boost_pct(&self) -> f64 {
        match self {
            VaultTier::Starter => 10.0,
            VaultTier::Pro => 20.0,
            VaultTier::Elite => 30.0,
        }
    }

    pub fn default_policy(&self) -> TierPolicy {
        TierPolicy {
            max_yield_pct: self.default_max_yield_pct(),
            max_boost_pct: self.default_max_boost_pct(),
        }
    }

    pub fn all() -> Vec<Self> {
        vec![VaultTier::Starter, VaultTier::Pro, VaultTier::Elite]
    }
}

impl std::fmt::Display for VaultTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VaultTier::Starter => write!(f, "STARTER"),
            VaultTier::Pro => write!(f, "PRO"),
            VaultTier::Elite => write!(f, "ELITE"),
        }
    }
}
