//! Shock detector — flags abnormal single-day drops against trailing
//! volatility.
//!
//! A shock is a 1-day return at or below `-shock_sigma` times the rolling
//! population standard deviation of returns. The threshold multiplier is its
//! own configuration knob, independent of the stop/target ATR multiplier.

use crate::domain::Bar;
use crate::indicators::{atr, pct_returns, population_std};
use serde::{Deserialize, Serialize};

/// Per-instrument, per-bar derived statistics. Read-only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub atr14: f64,
    pub ret_1d: f64,
    pub sigma20: f64,
    pub shock: bool,
}

/// Pure function of the trailing bar window; no side effects.
#[derive(Debug, Clone)]
pub struct ShockDetector {
    atr_period: usize,
    sigma_window: usize,
    shock_sigma: f64,
}

impl ShockDetector {
    pub const DEFAULT_ATR_PERIOD: usize = 14;
    pub const DEFAULT_SIGMA_WINDOW: usize = 20;

    pub fn new(shock_sigma: f64) -> Self {
        Self {
            atr_period: Self::DEFAULT_ATR_PERIOD,
            sigma_window: Self::DEFAULT_SIGMA_WINDOW,
            shock_sigma,
        }
    }

    /// Minimum trailing bars before a snapshot can form: the sigma window
    /// needs one extra close for its first return, the ATR one extra bar for
    /// its first true range.
    pub fn min_history(&self) -> usize {
        (self.sigma_window + 1).max(self.atr_period + 1)
    }

    /// Evaluate the bar at the end of `bars`. Returns `None` until enough
    /// history has accumulated, or when a void bar corrupts any input stat.
    pub fn evaluate(&self, bars: &[Bar]) -> Option<SignalSnapshot> {
        if bars.len() < self.min_history() {
            return None;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let rets = pct_returns(&closes);
        let ret_1d = rets[rets.len() - 1];
        let sigma20 = population_std(&rets[rets.len() - self.sigma_window..]);
        let atr14 = atr(bars, self.atr_period)
            .last()
            .copied()
            .unwrap_or(f64::NAN);

        if !ret_1d.is_finite() || !sigma20.is_finite() || !atr14.is_finite() {
            return None;
        }

        // A dead-flat window has sigma 0 and would flag every down tick.
        let shock = sigma20 > 0.0 && ret_1d <= -self.shock_sigma * sigma20;

        Some(SignalSnapshot {
            atr14,
            ret_1d,
            sigma20,
            shock,
        })
    }
}

/// Optional opaque scoring hook. Supplied at engine construction as a decision
/// input for future model-driven filtering; the deterministic trigger logic
/// does not consult it.
pub trait ReboundScorer: Send + Sync {
    fn score(&self, symbol: &str, snapshot: &SignalSnapshot) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Bars with unit daily range around the given closes.
    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                symbol: "TEST".into(),
                date: base_date + chrono::Duration::days(i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1_000,
            })
            .collect()
    }

    /// 21 closes oscillating ±1% around 100, then a crash.
    fn shock_closes() -> Vec<f64> {
        let mut closes = vec![100.0];
        for i in 1..21 {
            closes.push(if i % 2 == 0 { 100.0 } else { 101.0 });
        }
        closes.push(80.0);
        closes
    }

    #[test]
    fn needs_min_history() {
        let detector = ShockDetector::new(2.5);
        assert_eq!(detector.min_history(), 21);
        let bars = bars_from_closes(&shock_closes());
        assert!(detector.evaluate(&bars[..20]).is_none());
        assert!(detector.evaluate(&bars[..21]).is_some());
    }

    #[test]
    fn crash_flags_shock() {
        let detector = ShockDetector::new(2.5);
        let bars = bars_from_closes(&shock_closes());
        let snap = detector.evaluate(&bars).unwrap();
        assert!(snap.shock);
        assert!(snap.ret_1d < -0.2);
        assert!(snap.atr14 > 0.0);
    }

    #[test]
    fn quiet_market_no_shock() {
        let detector = ShockDetector::new(2.5);
        let closes = shock_closes();
        let bars = bars_from_closes(&closes[..21]);
        let snap = detector.evaluate(&bars).unwrap();
        assert!(!snap.shock);
    }

    #[test]
    fn flat_window_never_flags() {
        // sigma20 == 0; a literal reading of the threshold would flag ret == 0.
        let detector = ShockDetector::new(2.5);
        let bars = bars_from_closes(&[100.0; 25]);
        let snap = detector.evaluate(&bars).unwrap();
        assert_eq!(snap.sigma20, 0.0);
        assert!(!snap.shock);
    }

    #[test]
    fn void_bar_suppresses_snapshot() {
        let detector = ShockDetector::new(2.5);
        let mut bars = bars_from_closes(&shock_closes());
        let last = bars.len() - 1;
        bars[last].close = f64::NAN;
        assert!(detector.evaluate(&bars).is_none());
    }

    #[test]
    fn threshold_multiplier_is_respected() {
        // The same window flags at 2.5 sigma but not at an absurd multiplier.
        let bars = bars_from_closes(&shock_closes());
        assert!(ShockDetector::new(2.5).evaluate(&bars).unwrap().shock);
        assert!(!ShockDetector::new(50.0).evaluate(&bars).unwrap().shock);
    }
}
