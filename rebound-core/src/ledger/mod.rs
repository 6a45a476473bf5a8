//! FIFO tax-lot ledger.
//!
//! Owns acquisition lots per instrument and computes after-tax gain on
//! disposal. Sells consume the oldest lot first; a partially consumed lot
//! keeps its original acquisition date. Only gains are taxed — losses are
//! never rebated. The ledger is the single place tax math lives.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Capital-gains treatment parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Rate applied to gains held shorter than the long-term threshold.
    pub short_term_rate: f64,
    /// Rate applied to gains held at least `long_term_days` (inclusive).
    pub long_term_rate: f64,
    pub long_term_days: i64,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            short_term_rate: 0.24,
            long_term_rate: 0.15,
            long_term_days: 365,
        }
    }
}

impl TaxConfig {
    pub fn rate_for(&self, held_days: i64) -> f64 {
        if held_days >= self.long_term_days {
            self.long_term_rate
        } else {
            self.short_term_rate
        }
    }
}

/// A parcel of shares with its own cost basis and acquisition date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLot {
    pub shares: u64,
    pub cost_basis: f64,
    pub acquired: NaiveDate,
}

/// Outcome of a disposal request.
///
/// `net_gain` is the after-tax P&L over the shares actually disposed:
/// `sum(chunk_gross - chunk_tax)`. `unfilled` is nonzero when the request
/// exhausted the lots — a reportable anomaly, never a silent success.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disposal {
    pub gross: f64,
    pub net_gain: f64,
    pub disposed: u64,
    pub unfilled: u64,
}

impl Disposal {
    pub fn tax(&self) -> f64 {
        self.gross - self.net_gain
    }
}

/// FIFO lots per symbol. Exclusively owned by the engine; mutated only through
/// `acquire` and `dispose`.
#[derive(Debug, Clone, Default)]
pub struct TaxLedger {
    config: TaxConfig,
    lots: HashMap<String, VecDeque<TaxLot>>,
}

impl TaxLedger {
    pub fn new(config: TaxConfig) -> Self {
        Self {
            config,
            lots: HashMap::new(),
        }
    }

    /// Append a lot for `symbol`. O(1).
    pub fn acquire(&mut self, symbol: &str, shares: u64, price: f64, date: NaiveDate) {
        if shares == 0 {
            return;
        }
        self.lots
            .entry(symbol.to_string())
            .or_default()
            .push_back(TaxLot {
                shares,
                cost_basis: price,
                acquired: date,
            });
    }

    /// Dispose `shares` of `symbol` at `price` on `date`, oldest lots first.
    ///
    /// Each consumed chunk is taxed by its own lot's holding period. The
    /// request stops when satisfied or when lots run out; the caller must not
    /// credit cash for the unfilled remainder.
    pub fn dispose(&mut self, symbol: &str, shares: u64, price: f64, date: NaiveDate) -> Disposal {
        let mut remaining = shares;
        let mut gross_total = 0.0;
        let mut net_gain = 0.0;

        if let Some(queue) = self.lots.get_mut(symbol) {
            while remaining > 0 {
                let Some(lot) = queue.front_mut() else {
                    break;
                };
                let take = remaining.min(lot.shares);
                let gross = (price - lot.cost_basis) * take as f64;
                let held_days = (date - lot.acquired).num_days();
                let tax = gross.max(0.0) * self.config.rate_for(held_days);
                gross_total += gross;
                net_gain += gross - tax;

                lot.shares -= take;
                remaining -= take;
                if lot.shares == 0 {
                    queue.pop_front();
                }
            }
        }

        if remaining > 0 {
            tracing::warn!(
                symbol,
                requested = shares,
                unfilled = remaining,
                "disposal request exceeds held shares"
            );
        }

        Disposal {
            gross: gross_total,
            net_gain,
            disposed: shares - remaining,
            unfilled: remaining,
        }
    }

    /// Total shares held across all lots of `symbol`.
    pub fn shares_held(&self, symbol: &str) -> u64 {
        self.lots
            .get(symbol)
            .map(|q| q.iter().map(|lot| lot.shares).sum())
            .unwrap_or(0)
    }

    /// Lots for a symbol, oldest first (empty when flat).
    pub fn lots<'a>(&'a self, symbol: &str) -> impl Iterator<Item = &'a TaxLot> + 'a {
        self.lots.get(symbol).into_iter().flatten()
    }
}
