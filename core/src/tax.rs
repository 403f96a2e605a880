//! Tax ledger entries
//!
//! Collections (instant-sale tax, reward-claim tax) and withdrawals share
//! one append-only ledger; the treasury balance is collected minus
//! withdrawn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaxEntryKind {
    InstantSale,
    RewardClaim,
    Withdrawal,
}

impl TaxEntryKind {
    pub fn is_collection(&self) -> bool {
        !matches!(self, TaxEntryKind::Withdrawal)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxEntry {
    pub id: String,
    pub kind: TaxEntryKind,
    pub amount: f64,
    /// Investment id, withdrawal memo, or other correlation handle
    pub reference: String,
    pub recorded_at: DateTime<Utc>,
}

impl TaxEntry {
    pub fn new(kind: TaxEntryKind, amount: f64, reference: String, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            amount,
            reference,
            recorded_at: at,
        }
    }
}
