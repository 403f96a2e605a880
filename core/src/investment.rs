//! Investment records and lifecycle status

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::tier::VaultTier;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InvestmentStatus {
    Pending,
    Active,
    Completed,
    Sold,
}

impl std::fmt::Display for InvestmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvestmentStatus::Pending => write!(f, "PENDING"),
            InvestmentStatus::Active => write!(f, "ACTIVE"),
            InvestmentStatus::Completed => write!(f, "COMPLETED"),
            InvestmentStatus::Sold => write!(f, "SOLD"),
        }
    }
}

/// One user's capital commitment to one vault instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub id: String,
    pub owner: String,
    pub tier: VaultTier,

    /// Committed principal in stable-asset units (USD)
    pub principal_usd: f64,

    /// Yield configured at entry (percent APY)
    pub base_yield_pct: f64,
    /// Effective yield, raised by a posted boost up to the tier ceiling
    pub yield_pct: f64,
    /// Reward-token accrual rate (percent APY against principal)
    pub reward_apy_pct: f64,

    /// Reward tokens locked at vault entry, returned to the user at term end
    pub entry_locked_tokens: f64,

    pub start: DateTime<Utc>,
    pub duration_days: u32,

    /// Cumulative stable-asset yield already paid out
    pub yield_earned_usd: f64,
    /// Recorded cumulative mined reward tokens (monotonic)
    pub mined_total: f64,

    pub status: InvestmentStatus,
    /// Net sale price snapshot, set once when the investment is sold early
    pub instant_sale_price: Option<f64>,
    pub sold_at: Option<DateTime<Utc>>,
}

impl Investment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: String,
        tier: VaultTier,
        principal_usd: f64,
        base_yield_pct: f64,
        reward_apy_pct: f64,
        entry_locked_tokens: f64,
        start: DateTime<Utc>,
        duration_days: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner,
            tier,
            principal_usd,
            base_yield_pct,
            yield_pct: base_yield_pct,
            reward_apy_pct,
            entry_locked_tokens,
            start,
            duration_days,
            yield_earned_usd: 0.0,
            mined_total: 0.0,
            status: InvestmentStatus::Pending,
            instant_sale_price: None,
            sold_at: None,
        }
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::days(self.duration_days as i64)
    }

    /// Whole days elapsed since the start timestamp; negative before start
    pub fn elapsed_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start).num_days()
    }

    pub fn is_active(&self) -> bool {
        self.status == InvestmentStatus::Active
    }

    /// Entry-locked tokens still count toward circulating supply until the
    /// investment reaches a terminal state
    pub fn holds_entry_lock(&self) -> bool {
        matches!(
            self.status,
            InvestmentStatus::Pending | InvestmentStatus::Active
        )
    }
}

/// Vault product definition: the template an investment is created from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vault {
    pub id: String,
    pub name: String,
    pub tier: VaultTier,
    pub min_principal_usd: f64,
    pub max_principal_usd: f64,
    pub base_yield_pct: f64,
    pub max_yield_pct: f64,
    pub base_reward_apy_pct: f64,
    pub max_reward_apy_pct: f64,
    pub duration_days: u32,
}

impl Vault {
    /// Validate a proposed principal against the vault's configured range
    pub fn validate_entry(&self, principal_usd: f64) -> Result<()> {
        if !principal_usd.is_finite() || principal_usd <= 0.0 {
            return Err(EngineError::InvalidAmount(format!(
                "principal must be positive, got {}",
                principal_usd
            )));
        }
        if principal_usd < self.min_principal_usd || principal_usd > self.max_principal_usd {
            return Err(EngineError::InvalidParameter {
                field: "principal_usd",
                message: format!(
                    "{} outside vault range [{}, {}]",
                    principal_usd, self.min_principal_usd, self.max_principal_usd
                ),
            });
        }
        Ok(())
    }

    /// Create a pending investment in this vault
    pub fn enter(
        &self,
        owner: String,
        principal_usd: f64,
        entry_locked_tokens: f64,
        start: DateTime<Utc>,
    ) -> Result<Investment> {
        self.validate_entry(principal_usd)?;
        Ok(Investment::new(
            owner,
            self.tier,
            principal_usd,
            self.base_yield_pct,
            self.base_reward_apy_pct,
            entry_locked_tokens,
            start,
            self.duration_days,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vault() -> Vault {
        Vault {
            id: "vault-pro-36".to_string(),
            name: "Pro 36".to_string(),
            tier: VaultTier::Pro,
            min_principal_usd: 1_000.0,
            max_principal_usd: 100_000.0,
            base_yield_pct: 9.0,
            max_yield_pct: 18.0,
            base_reward_apy_pct: 500.0,
            max_reward_apy_pct: 650.0,
            duration_days: 1095,
        }
    }

    #[test]
    fn test_vault_entry_creates_pending_investment() {
        let vault = sample_vault();
        let inv = vault
            .enter("user1".to_string(), 10_000.0, 500.0, Utc::now())
            .unwrap();

        assert_eq!(inv.status, InvestmentStatus::Pending);
        assert_eq!(inv.yield_pct, vault.base_yield_pct);
        assert_eq!(inv.duration_days, 1095);
        assert!(inv.holds_entry_lock());
    }

    #[test]
    fn test_vault_entry_rejects_out_of_range_principal() {
        let vault = sample_vault();
        assert!(vault.validate_entry(500.0).is_err());
        assert!(vault.validate_entry(200_000.0).is_err());
        assert!(vault.validate_entry(-5.0).is_err());
        assert!(vault.validate_entry(10_000.0).is_ok());
    }

    #[test]
    fn test_elapsed_days() {
        let vault = sample_vault();
        let start = Utc::now();
        let inv = vault
            .enter("user1".to_string(), 10_000.0, 500.0, start)
            .unwrap();

        assert_eq!(inv.elapsed_days(start + Duration::days(30)), 30);
        assert!(inv.elapsed_days(start - Duration::days(2)) < 0);
        assert_eq!(inv.end(), start + Duration::days(1095));
    }
}
