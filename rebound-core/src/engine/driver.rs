//! Bar-driven simulation engine.
//!
//! One pass over the shared timeline. Per bar: resolve orders submitted on the
//! previous bar, then make this bar's decisions, then sample equity. Orders
//! fill at the close of the bar they were decided on, one bar after
//! submission. At the end of the run every open position is liquidated at the
//! final close; positions stuck on a void final bar are reported instead.

use crate::data::MarketData;
use crate::domain::{
    EquitySample, Fill, Order, OrderId, OrderSide, OrderStatus, Position, Symbol, TradeRecord,
};
use crate::engine::{
    OrderIntent, PositionState, Recorder, SimConfig, SimError, SymbolController,
};
use crate::ledger::TaxLedger;
use crate::signals::{ReboundScorer, ShockDetector};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cash comparisons tolerate accumulated float error from fee arithmetic.
const CASH_EPSILON: f64 = 1e-9;

/// An instrument excluded from the run before the first bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSkip {
    pub symbol: Symbol,
    pub reason: String,
}

/// A position that could not be liquidated because the final bar was void.
/// It stays open and keeps its shares; nothing is guessed about its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationSkip {
    pub symbol: Symbol,
    pub shares: u64,
    pub last_date: NaiveDate,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub config: SimConfig,
    pub equity: Vec<EquitySample>,
    pub trades: Vec<TradeRecord>,
    pub skipped: Vec<SymbolSkip>,
    pub unliquidated: Vec<LiquidationSkip>,
    pub final_cash: f64,
}

pub struct Engine {
    config: SimConfig,
    detector: ShockDetector,
    controllers: BTreeMap<Symbol, SymbolController>,
    ledger: TaxLedger,
    cash: f64,
    recorder: Recorder,
    pending: Vec<Order>,
    next_order_id: u64,
    scorer: Option<Box<dyn ReboundScorer>>,
    skipped: Vec<SymbolSkip>,
    unliquidated: Vec<LiquidationSkip>,
}

impl Engine {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let detector = ShockDetector::new(config.shock_sigma);
        let ledger = TaxLedger::new(config.tax);
        let cash = config.start_cash;
        Ok(Self {
            config,
            detector,
            controllers: BTreeMap::new(),
            ledger,
            cash,
            recorder: Recorder::new(),
            pending: Vec::new(),
            next_order_id: 1,
            scorer: None,
            skipped: Vec::new(),
            unliquidated: Vec::new(),
        })
    }

    pub fn with_scorer(mut self, scorer: Box<dyn ReboundScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Run the simulation over `data` and consume the engine.
    pub fn run(mut self, data: &MarketData) -> Result<RunResult, SimError> {
        let need = self.detector.min_history();
        for (symbol, series) in data.iter() {
            if series.bars.len() < need {
                tracing::info!(
                    symbol = %symbol,
                    bars = series.bars.len(),
                    need,
                    "excluding symbol with insufficient history"
                );
                self.skipped.push(SymbolSkip {
                    symbol: symbol.clone(),
                    reason: format!("only {} bars, need {need}", series.bars.len()),
                });
                continue;
            }
            self.controllers
                .insert(symbol.clone(), SymbolController::new(symbol.clone()));
        }
        if self.controllers.is_empty() {
            return Err(SimError::EmptyUniverse);
        }

        self.recorder
            .record_equity(data.timeline()[0], self.config.start_cash);

        for t in 0..data.len() {
            self.process_bar(data, t);
        }
        self.finalize(data);

        let (equity, trades) = self.recorder.into_parts();
        Ok(RunResult {
            config: self.config,
            equity,
            trades,
            skipped: self.skipped,
            unliquidated: self.unliquidated,
            final_cash: self.cash,
        })
    }

    fn process_bar(&mut self, data: &MarketData, t: usize) {
        self.resolve_pending();

        let symbols: Vec<Symbol> = self.controllers.keys().cloned().collect();
        for symbol in symbols {
            let Some(bars) = data.series(&symbol).and_then(|s| s.up_to(t)) else {
                continue; // not listed yet at this bar
            };
            let bar = &bars[bars.len() - 1];
            let snapshot = self.detector.evaluate(bars);

            if let (Some(snap), Some(scorer)) = (snapshot.as_ref(), self.scorer.as_ref()) {
                if snap.shock {
                    let score = scorer.score(&symbol, snap);
                    tracing::debug!(symbol = %symbol, score, ret_1d = snap.ret_1d, "rebound score");
                }
            }

            let intent =
                self.controllers[&symbol].decide(snapshot.as_ref(), bar.close, t, self.cash, &self.config);
            if let Some(intent) = intent {
                self.submit(&symbol, intent, bar.close, t, bar.date);
            }
        }

        self.sample_equity(data, t);
    }

    /// Resolve every order submitted on the previous bar, in submission order.
    fn resolve_pending(&mut self) {
        for mut order in std::mem::take(&mut self.pending) {
            if !order.reference_price.is_finite() {
                self.reject(&mut order, "void reference price");
                continue;
            }
            if order.side == OrderSide::Buy {
                let cost = order.notional() * (1.0 + self.config.slippage_rate);
                if cost > self.cash + CASH_EPSILON {
                    self.reject(&mut order, "insufficient cash");
                    continue;
                }
            }
            order.status = OrderStatus::Filled;
            let fill = Fill {
                order_id: order.id,
                symbol: order.symbol.clone(),
                side: order.side,
                shares: order.shares,
                price: order.reference_price,
                bar_index: order.submitted_bar,
                date: order.submitted_date,
            };
            self.on_fill(&fill);
        }
    }

    fn submit(&mut self, symbol: &str, intent: OrderIntent, close: f64, t: usize, date: NaiveDate) {
        let (side, shares, next_state) = match intent {
            OrderIntent::Enter { shares } => (OrderSide::Buy, shares, PositionState::PendingEntry),
            OrderIntent::Exit { shares, reason } => {
                tracing::debug!(symbol, ?reason, "exit triggered");
                (OrderSide::Sell, shares, PositionState::PendingExit)
            }
        };
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        self.pending.push(Order {
            id,
            symbol: symbol.to_string(),
            side,
            shares,
            reference_price: close,
            submitted_bar: t,
            submitted_date: date,
            status: OrderStatus::Pending,
        });
        if let Some(ctl) = self.controllers.get_mut(symbol) {
            ctl.state = next_state;
        }
    }

    /// A rejected entry leaves the instrument flat; a rejected exit leaves the
    /// position open. Both may retry on the next bar's decision pass.
    fn reject(&mut self, order: &mut Order, reason: &str) {
        tracing::warn!(id = %order.id, symbol = %order.symbol, reason, "order rejected");
        order.status = OrderStatus::Rejected {
            reason: reason.to_string(),
        };
        if let Some(ctl) = self.controllers.get_mut(&order.symbol) {
            ctl.state = match order.side {
                OrderSide::Buy => PositionState::Flat,
                OrderSide::Sell => PositionState::Open,
            };
        }
    }

    fn on_fill(&mut self, fill: &Fill) {
        match fill.side {
            OrderSide::Buy => {
                let notional = fill.shares as f64 * fill.price;
                let slip = notional * self.config.slippage_rate;
                self.ledger
                    .acquire(&fill.symbol, fill.shares, fill.price, fill.date);
                self.cash -= notional + slip;
                let position = Position {
                    symbol: fill.symbol.clone(),
                    shares: fill.shares,
                    entry_price: fill.price,
                    entry_date: fill.date,
                    entry_bar: fill.bar_index,
                };
                self.recorder.open_trade(&position, slip);
                if let Some(ctl) = self.controllers.get_mut(&fill.symbol) {
                    ctl.position = Some(position);
                    ctl.state = PositionState::Open;
                }
                tracing::debug!(symbol = %fill.symbol, shares = fill.shares, price = fill.price, "entry filled");
            }
            OrderSide::Sell => {
                let disposal = self
                    .ledger
                    .dispose(&fill.symbol, fill.shares, fill.price, fill.date);
                let proceeds = disposal.disposed as f64 * fill.price;
                let slip = proceeds * self.config.slippage_rate;
                self.cash += proceeds - disposal.tax() - slip;
                self.recorder.complete_trade(
                    &fill.symbol,
                    fill.bar_index,
                    fill.date,
                    fill.price,
                    disposal.gross,
                    disposal.tax(),
                    slip,
                );
                if let Some(ctl) = self.controllers.get_mut(&fill.symbol) {
                    ctl.position = None;
                    ctl.state = PositionState::Flat;
                }
                tracing::debug!(
                    symbol = %fill.symbol,
                    shares = disposal.disposed,
                    price = fill.price,
                    gross = disposal.gross,
                    tax = disposal.tax(),
                    "exit filled"
                );
            }
        }
    }

    /// Equity at bar `t`: cash plus mark-to-market of open positions. A void
    /// close marks the position at its entry price rather than poisoning the
    /// curve with NaN.
    fn sample_equity(&mut self, data: &MarketData, t: usize) {
        let mut value = self.cash;
        for (symbol, ctl) in &self.controllers {
            if let Some(position) = ctl.position.as_ref() {
                let close = data
                    .series(symbol)
                    .and_then(|s| s.bar_at(t))
                    .map(|b| b.close)
                    .unwrap_or(f64::NAN);
                let mark = if close.is_finite() {
                    close
                } else {
                    position.entry_price
                };
                value += position.market_value(mark);
            }
        }
        self.recorder.record_equity(data.timeline()[t], value);
    }

    /// End-of-run sweep: resolve the last bar's orders, liquidate whatever is
    /// still open at the final close, and sample final equity.
    fn finalize(&mut self, data: &MarketData) {
        for mut order in std::mem::take(&mut self.pending) {
            match order.side {
                OrderSide::Sell if order.reference_price.is_finite() => {
                    order.status = OrderStatus::Filled;
                    let fill = Fill {
                        order_id: order.id,
                        symbol: order.symbol.clone(),
                        side: order.side,
                        shares: order.shares,
                        price: order.reference_price,
                        bar_index: order.submitted_bar,
                        date: order.submitted_date,
                    };
                    self.on_fill(&fill);
                }
                OrderSide::Sell => self.reject(&mut order, "void reference price"),
                OrderSide::Buy => {
                    tracing::info!(id = %order.id, symbol = %order.symbol, "entry canceled at run end");
                    order.status = OrderStatus::Canceled {
                        reason: "run ended".to_string(),
                    };
                    if let Some(ctl) = self.controllers.get_mut(&order.symbol) {
                        ctl.state = PositionState::Flat;
                    }
                }
            }
        }

        let last = data.len() - 1;
        let last_date = data.timeline()[last];
        let symbols: Vec<Symbol> = self.controllers.keys().cloned().collect();
        for symbol in symbols {
            let Some(position) = self.controllers[&symbol].position.clone() else {
                continue;
            };
            let close = data
                .series(&symbol)
                .and_then(|s| s.bar_at(last))
                .map(|b| b.close)
                .unwrap_or(f64::NAN);
            if !close.is_finite() {
                tracing::warn!(
                    symbol = %symbol,
                    shares = position.shares,
                    "cannot liquidate on a void final bar"
                );
                self.unliquidated.push(LiquidationSkip {
                    symbol: symbol.clone(),
                    shares: position.shares,
                    last_date,
                });
                continue;
            }
            let fill = Fill {
                order_id: OrderId(self.next_order_id),
                symbol: symbol.clone(),
                side: OrderSide::Sell,
                shares: position.shares,
                price: close,
                bar_index: last,
                date: last_date,
            };
            self.next_order_id += 1;
            self.on_fill(&fill);
        }

        let mut value = self.cash;
        for ctl in self.controllers.values() {
            if let Some(position) = ctl.position.as_ref() {
                value += position.market_value(position.entry_price);
            }
        }
        self.recorder.record_equity(last_date, value);
    }
}
