//! Summary metrics — pure functions over the equity curve and trade list.

use rebound_core::domain::{EquitySample, TradeRecord};
use serde::{Deserialize, Serialize};

/// Aggregate statistics for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_return: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub trade_count: usize,
    pub win_rate: f64,
    pub total_tax: f64,
    pub total_slippage: f64,
}

impl SummaryMetrics {
    pub fn compute(equity: &[EquitySample], trades: &[TradeRecord]) -> Self {
        Self {
            total_return: total_return(equity),
            cagr: cagr(equity),
            max_drawdown: max_drawdown(equity),
            trade_count: trades.len(),
            win_rate: win_rate(trades),
            total_tax: trades.iter().map(|t| t.tax).sum(),
            total_slippage: trades.iter().map(|t| t.slippage).sum(),
        }
    }
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(equity: &[EquitySample]) -> f64 {
    let (Some(first), Some(last)) = (equity.first(), equity.last()) else {
        return 0.0;
    };
    if first.value <= 0.0 {
        return 0.0;
    }
    (last.value - first.value) / first.value
}

/// Compound annual growth rate over the calendar span of the curve.
///
/// Daily bars carry real dates, so years are measured as elapsed days over
/// 365.25 rather than assuming a trading-day count.
pub fn cagr(equity: &[EquitySample]) -> f64 {
    let (Some(first), Some(last)) = (equity.first(), equity.last()) else {
        return 0.0;
    };
    if first.value <= 0.0 || last.value <= 0.0 {
        return 0.0;
    }
    let days = (last.date - first.date).num_days();
    if days <= 0 {
        return 0.0;
    }
    let years = days as f64 / 365.25;
    (last.value / first.value).powf(1.0 / years) - 1.0
}

/// Maximum peak-to-trough drawdown as a positive fraction.
pub fn max_drawdown(equity: &[EquitySample]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    for sample in equity {
        peak = peak.max(sample.value);
        if peak > 0.0 {
            worst = worst.max((peak - sample.value) / peak);
        }
    }
    worst
}

/// Fraction of completed trades with positive net result. Open trades are
/// excluded; zero completed trades gives 0.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    let completed: Vec<&TradeRecord> = trades.iter().filter(|t| !t.is_open()).collect();
    if completed.is_empty() {
        return 0.0;
    }
    let wins = completed.iter().filter(|t| t.net > 0.0).count();
    wins as f64 / completed.len() as f64
}
