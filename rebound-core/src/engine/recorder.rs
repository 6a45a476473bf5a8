//! Trade and equity recorder.
//!
//! Accumulates the equity curve and the round-trip trade log from fill
//! events. Invariant: at most one open trade record per symbol.

use crate::domain::{EquitySample, Position, Symbol, TradeRecord};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Recorder {
    equity: Vec<EquitySample>,
    trades: Vec<TradeRecord>,
    open_by_symbol: HashMap<Symbol, usize>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an equity sample. Dates must be non-decreasing; out-of-order
    /// samples indicate a driver bug and are logged, not recorded.
    pub fn record_equity(&mut self, date: NaiveDate, value: f64) {
        if let Some(last) = self.equity.last() {
            if date < last.date {
                tracing::error!(%date, last = %last.date, "equity sample out of order");
                return;
            }
        }
        self.equity.push(EquitySample { date, value });
    }

    /// Open a trade record on entry fill. `entry_slippage` is the entry leg's
    /// cost; the exit leg is added on completion.
    pub fn open_trade(&mut self, position: &Position, entry_slippage: f64) {
        if self.open_by_symbol.contains_key(&position.symbol) {
            tracing::error!(symbol = %position.symbol, "second open trade for symbol ignored");
            return;
        }
        let record = TradeRecord {
            symbol: position.symbol.clone(),
            shares: position.shares,
            entry_bar: position.entry_bar,
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            exit_bar: None,
            exit_date: None,
            exit_price: None,
            gross: 0.0,
            tax: 0.0,
            slippage: entry_slippage,
            net: -entry_slippage,
        };
        self.open_by_symbol
            .insert(position.symbol.clone(), self.trades.len());
        self.trades.push(record);
    }

    /// Complete the open trade for `symbol` on exit fill.
    #[allow(clippy::too_many_arguments)]
    pub fn complete_trade(
        &mut self,
        symbol: &str,
        exit_bar: usize,
        exit_date: NaiveDate,
        exit_price: f64,
        gross: f64,
        tax: f64,
        exit_slippage: f64,
    ) {
        let Some(index) = self.open_by_symbol.remove(symbol) else {
            tracing::error!(symbol, "exit fill without an open trade record");
            return;
        };
        let record = &mut self.trades[index];
        record.exit_bar = Some(exit_bar);
        record.exit_date = Some(exit_date);
        record.exit_price = Some(exit_price);
        record.gross = gross;
        record.tax = tax;
        record.slippage += exit_slippage;
        record.net = record.gross - record.tax - record.slippage;
    }

    pub fn has_open_trade(&self, symbol: &str) -> bool {
        self.open_by_symbol.contains_key(symbol)
    }

    pub fn equity(&self) -> &[EquitySample] {
        &self.equity
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn into_parts(self) -> (Vec<EquitySample>, Vec<TradeRecord>) {
        (self.equity, self.trades)
    }
}
