//! Instant-sale quoting and execution
//!
//! Quoting is pure and repeatable for UI display. Execution is gated by
//! the store's ACTIVE -> SOLD conditional transition, so two concurrent
//! sale attempts produce exactly one payout. Secondary steps (boost
//! return, tax recording) never block a completed sale but their failure
//! is surfaced on the outcome for later reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use treasury::TaxLedger;
use vault_core::{EngineError, Investment, Result, TaxEntryKind};
use vault_storage::InvestmentStore;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InstantSaleQuote {
    /// principal + earnings accrued so far
    pub market_value: f64,
    /// Early-exit penalty taken off market value
    pub discount: f64,
    pub net_before_tax: f64,
    /// Withholding routed to the treasury
    pub tax: f64,
    pub net_to_user: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleOutcome {
    pub investment: Investment,
    pub quote: InstantSaleQuote,
    /// Boost released back to the user during this sale
    pub boost_returned: bool,
    /// Boost release was attempted and failed; reconcile out of band
    pub boost_return_failed: bool,
    /// Tax entry was appended; false means reconcile out of band
    pub tax_recorded: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClaimTax {
    pub gross: f64,
    pub tax: f64,
    pub net: f64,
}

pub struct ExitCalculator {
    discount_pct: f64,
    tax_pct: f64,
}

impl ExitCalculator {
    pub fn new(discount_pct: f64, tax_pct: f64) -> Self {
        Self {
            discount_pct,
            tax_pct,
        }
    }

    /// Pure quote; no side effects, identical output for identical state
    pub fn quote(&self, investment: &Investment) -> Result<InstantSaleQuote> {
        if !investment.is_active() {
            return match investment.status {
                vault_core::InvestmentStatus::Sold => {
                    Err(EngineError::AlreadySold(investment.id.clone()))
                }
                status => Err(EngineError::InvestmentNotActive {
                    id: investment.id.clone(),
                    status: status.to_string(),
                }),
            };
        }

        let market_value = investment.principal_usd + investment.yield_earned_usd;
        let discount = market_value * self.discount_pct / 100.0;
        let net_before_tax = market_value - discount;
        let tax = net_before_tax * self.tax_pct / 100.0;

        Ok(InstantSaleQuote {
            market_value,
            discount,
            net_before_tax,
            tax,
            net_to_user: net_before_tax - tax,
        })
    }

    /// Execute the early exit: one-way ACTIVE -> SOLD, then best-effort
    /// boost return and tax recording
    pub fn execute(
        &self,
        store: &dyn InvestmentStore,
        investment_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SaleOutcome> {
        let investment = store.investment(investment_id)?;
        let quote = self.quote(&investment)?;

        // The conditional transition is the single source of truth for
        // "already sold"; the quote above only rejects the obvious cases
        let sold = store.transition_to_sold(investment_id, quote.net_to_user, now)?;

        let (boost_returned, boost_return_failed) = match store.mark_boost_returned(
            investment_id,
            now,
        ) {
            Ok(_) => (true, false),
            // No boost, or it already went back at term end: nothing to do
            Err(EngineError::BoostNotFound(_)) | Err(EngineError::BoostAlreadyReturned(_)) => {
                (false, false)
            }
            Err(err) => {
                warn!(investment_id, error = %err, "boost return failed during instant sale");
                (false, true)
            }
        };

        let tax_recorded = match TaxLedger::collect(
            store,
            TaxEntryKind::InstantSale,
            quote.tax,
            investment_id,
            now,
        ) {
            Ok(_) => true,
            Err(err) => {
                warn!(investment_id, error = %err, "tax recording failed during instant sale");
                false
            }
        };

        info!(
            investment_id,
            net_to_user = quote.net_to_user,
            boost_returned,
            "instant sale executed"
        );

        Ok(SaleOutcome {
            investment: sold,
            quote,
            boost_returned,
            boost_return_failed,
            tax_recorded,
        })
    }

    /// Withholding on an ordinary reward-token claim: same rate, applied
    /// to the raw token amount rather than USD value
    pub fn claim_tax(&self, amount: f64) -> Result<ClaimTax> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::InvalidAmount(format!(
                "claim amount must be positive, got {}",
                amount
            )));
        }
        let tax = amount * self.tax_pct / 100.0;
        Ok(ClaimTax {
            gross: amount,
            tax,
            net: amount - tax,
        })
    }
}
