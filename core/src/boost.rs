//! Reward-token boost records
//!
//! At most one boost per investment. Once `returned` is set the record is
//! immutable; a second return attempt must fail with a named error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardBoost {
    pub id: String,
    pub investment_id: String,

    /// Posted reward-token amount
    pub amount: f64,
    /// USD valuation of the posted amount at post time
    pub value_usd_at_post: f64,
    /// Tier-specific maximum valuation that counted toward the yield bonus
    pub max_allowed_usd: f64,
    /// Additional yield granted by this boost (percentage points)
    pub additional_yield_pct: f64,

    pub returned: bool,
    pub returned_at: Option<DateTime<Utc>>,
    pub posted_at: DateTime<Utc>,
}

impl RewardBoost {
    pub fn new(
        investment_id: String,
        amount: f64,
        value_usd_at_post: f64,
        max_allowed_usd: f64,
        additional_yield_pct: f64,
        posted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            investment_id,
            amount,
            value_usd_at_post,
            max_allowed_usd,
            additional_yield_pct,
            returned: false,
            returned_at: None,
            posted_at,
        }
    }

    /// Still locked and therefore still counted in circulating supply
    pub fn is_locked(&self) -> bool {
        !self.returned
    }
}
