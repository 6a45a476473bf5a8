//! TradeRecord — a round-trip trade, opened on entry fill and completed on
//! exit fill.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One entry-then-exit cycle for a single instrument.
///
/// Exit fields are `None` while the position is open. Invariant maintained by
/// the recorder: at most one record per symbol with `exit_date == None`.
///
/// `slippage` accumulates both legs; `net = gross - tax - slippage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,
    pub shares: u64,

    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,

    pub exit_bar: Option<usize>,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<f64>,

    pub gross: f64,
    pub tax: f64,
    pub slippage: f64,
    pub net: f64,
}

impl TradeRecord {
    pub fn is_open(&self) -> bool {
        self.exit_date.is_none()
    }

    /// Bars between entry and exit decision; `None` while open.
    pub fn bars_held(&self) -> Option<usize> {
        self.exit_bar.map(|exit| exit - self.entry_bar)
    }

    /// Net return as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        let cost = self.entry_price * self.shares as f64;
        if cost == 0.0 {
            return 0.0;
        }
        self.net / cost
    }
}
