//! Position — one open long per instrument.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An open position. Exists only between entry fill and exit fill (or
/// liquidation); a flat instrument has no `Position` at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub shares: u64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub entry_bar: usize,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.shares as f64 * (price - self.entry_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position() -> Position {
        Position {
            symbol: "AAPL".into(),
            shares: 100,
            entry_price: 80.0,
            entry_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            entry_bar: 21,
        }
    }

    #[test]
    fn market_value_and_unrealized() {
        let pos = sample_position();
        assert_eq!(pos.market_value(85.0), 8_500.0);
        assert_eq!(pos.unrealized_pnl(85.0), 500.0);
        assert_eq!(pos.unrealized_pnl(75.0), -500.0);
    }
}
