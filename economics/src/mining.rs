//! Mining accrual for reward tokens
//!
//! Accrual is pure and recomputable: the same `(principal, rate, duration,
//! difficulty)` always produces the same totals, so re-running after a
//! correction or retry yields the identical answer. Nothing here mutates
//! state; recording a cumulative total goes through the store's monotonic
//! `record_mined` write.

use serde::{Deserialize, Serialize};

use vault_core::{DifficultyCurve, Investment};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MiningAccrual {
    /// Reward tokens per day at the given difficulty
    pub daily_rate: f64,
    /// Whole days that counted toward the total
    pub accrued_days: u32,
    pub cumulative: f64,
    /// True when elapsed time ran past the investment's term
    pub capped: bool,
}

pub struct AccrualCalculator {
    curve: DifficultyCurve,
}

impl AccrualCalculator {
    pub fn new(curve: DifficultyCurve) -> Self {
        Self { curve }
    }

    /// `principal * (reward_apy / 100 / 365) * multiplier(difficulty)`
    ///
    /// Higher difficulty raises the nominal rate, compensating miners for
    /// a harder environment; the multiplier's shape is configuration.
    pub fn daily_rate(&self, investment: &Investment, difficulty: f64) -> f64 {
        investment.principal_usd * (investment.reward_apy_pct / 100.0 / 365.0)
            * self.curve.multiplier(difficulty)
    }

    /// Accrual over `elapsed_days` whole days since investment start
    ///
    /// Negative elapsed time (not yet started) accrues nothing; elapsed
    /// time past the term clamps to the configured duration.
    pub fn accrue(
        &self,
        investment: &Investment,
        elapsed_days: i64,
        difficulty: f64,
    ) -> MiningAccrual {
        let daily_rate = self.daily_rate(investment, difficulty);
        let capped = elapsed_days > investment.duration_days as i64;
        let days = elapsed_days.clamp(0, investment.duration_days as i64);

        MiningAccrual {
            daily_rate,
            accrued_days: days as u32,
            cumulative: daily_rate * days as f64,
            capped,
        }
    }

    /// Accrual as of a wall-clock instant
    pub fn accrue_at(
        &self,
        investment: &Investment,
        now: chrono::DateTime<chrono::Utc>,
        difficulty: f64,
    ) -> MiningAccrual {
        self.accrue(investment, investment.elapsed_days(now), difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vault_core::VaultTier;

    fn investment() -> Investment {
        // principal 10,000 at 500% reward APY over 36 months
        Investment::new(
            "user1".to_string(),
            VaultTier::Pro,
            10_000.0,
            9.0,
            500.0,
            500.0,
            Utc::now(),
            1095,
        )
    }

    fn calculator() -> AccrualCalculator {
        AccrualCalculator::new(DifficultyCurve::default())
    }

    #[test]
    fn test_daily_rate_at_base_difficulty() {
        let rate = calculator().daily_rate(&investment(), 1.0);
        // 10000 * (5.0 / 365) = 136.9863...
        assert!((rate - 136.986_301_369_863).abs() < 1e-6);
    }

    #[test]
    fn test_cumulative_at_day_thirty() {
        let accrual = calculator().accrue(&investment(), 30, 1.0);
        assert_eq!(accrual.accrued_days, 30);
        assert!(!accrual.capped);
        // ~4,109.6 reward tokens
        assert!((accrual.cumulative - 4_109.589_041).abs() < 1e-3);
    }

    #[test]
    fn test_not_yet_started_accrues_nothing() {
        let accrual = calculator().accrue(&investment(), -3, 1.0);
        assert_eq!(accrual.accrued_days, 0);
        assert_eq!(accrual.cumulative, 0.0);
    }

    #[test]
    fn test_no_accrual_beyond_term() {
        let calc = calculator();
        let inv = investment();
        let at_term = calc.accrue(&inv, 1095, 1.0);
        let past_term = calc.accrue(&inv, 4_000, 1.0);

        assert_eq!(past_term.cumulative, at_term.cumulative);
        assert_eq!(past_term.accrued_days, 1095);
        assert!(past_term.capped);
        assert!(!at_term.capped);
    }

    #[test]
    fn test_difficulty_raises_the_rate() {
        let calc = calculator();
        let inv = investment();
        let base = calc.daily_rate(&inv, 1.0);
        let harder = calc.daily_rate(&inv, 3.0);
        assert!(harder > base);
        // Linear { slope: 0.25 }: multiplier 1.5 at difficulty 3
        assert!((harder - base * 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_accrual_is_idempotent() {
        let calc = calculator();
        let inv = investment();
        let a = calc.accrue(&inv, 200, 2.0);
        let b = calc.accrue(&inv, 200, 2.0);
        assert_eq!(a.cumulative, b.cumulative);
        assert_eq!(a.daily_rate, b.daily_rate);
    }
}
