//! Per-instrument entry/exit state machine.
//!
//! `FLAT -> PENDING_ENTRY -> OPEN -> PENDING_EXIT -> FLAT`. Decisions are
//! made once per bar from the detector snapshot and the open position; the
//! engine turns intents into orders and moves the state on submission, fill,
//! or rejection.

use crate::domain::{Position, Symbol};
use crate::engine::SimConfig;
use crate::signals::SignalSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionState {
    Flat,
    PendingEntry,
    Open,
    PendingExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    Stop,
    Target,
    TimeStop,
}

/// What the controller wants done this bar; at most one intent per bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderIntent {
    Enter { shares: u64 },
    Exit { shares: u64, reason: ExitReason },
}

#[derive(Debug, Clone)]
pub struct SymbolController {
    pub symbol: Symbol,
    pub state: PositionState,
    pub position: Option<Position>,
}

impl SymbolController {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            state: PositionState::Flat,
            position: None,
        }
    }

    /// Evaluate the bar at `bar_index` (whose close is `close`).
    ///
    /// Entry: shock flag plus a positive volatility-sized stake. Exit
    /// precedence while open: stop, then target, then time stop — the first
    /// hit wins and closes the full position. While an order is pending,
    /// nothing new is issued.
    pub fn decide(
        &self,
        snapshot: Option<&SignalSnapshot>,
        close: f64,
        bar_index: usize,
        cash: f64,
        config: &SimConfig,
    ) -> Option<OrderIntent> {
        match self.state {
            PositionState::PendingEntry | PositionState::PendingExit => None,
            PositionState::Flat => {
                let snap = snapshot?;
                if !snap.shock || snap.atr14 <= 0.0 {
                    return None;
                }
                let risk_per_share = snap.atr14 * config.atr_mult;
                let stake = cash * config.risk_budget / risk_per_share;
                if !stake.is_finite() || stake < 1.0 {
                    return None;
                }
                Some(OrderIntent::Enter {
                    shares: stake.floor() as u64,
                })
            }
            PositionState::Open => {
                let position = self.position.as_ref()?;
                if let Some(snap) = snapshot {
                    let band = snap.atr14 * config.atr_mult;
                    if close <= position.entry_price - band {
                        return Some(OrderIntent::Exit {
                            shares: position.shares,
                            reason: ExitReason::Stop,
                        });
                    }
                    if close >= position.entry_price + band {
                        return Some(OrderIntent::Exit {
                            shares: position.shares,
                            reason: ExitReason::Target,
                        });
                    }
                }
                // The time stop needs no price and fires through void bars.
                if bar_index - position.entry_bar >= config.max_hold_bars {
                    return Some(OrderIntent::Exit {
                        shares: position.shares,
                        reason: ExitReason::TimeStop,
                    });
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot(shock: bool, atr14: f64) -> SignalSnapshot {
        SignalSnapshot {
            atr14,
            ret_1d: if shock { -0.2 } else { 0.001 },
            sigma20: 0.01,
            shock,
        }
    }

    fn open_controller(entry_price: f64, entry_bar: usize, shares: u64) -> SymbolController {
        let mut ctl = SymbolController::new("AAPL".into());
        ctl.state = PositionState::Open;
        ctl.position = Some(Position {
            symbol: "AAPL".into(),
            shares,
            entry_price,
            entry_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            entry_bar,
        });
        ctl
    }

    fn config() -> SimConfig {
        SimConfig::default()
    }

    #[test]
    fn flat_shock_sizes_entry() {
        let ctl = SymbolController::new("AAPL".into());
        let snap = snapshot(true, 2.0);
        // 10_000 * 0.05 / (2.0 * 2.0) = 125
        let intent = ctl.decide(Some(&snap), 80.0, 21, 10_000.0, &config());
        assert_eq!(intent, Some(OrderIntent::Enter { shares: 125 }));
    }

    #[test]
    fn flat_without_shock_stays_flat() {
        let ctl = SymbolController::new("AAPL".into());
        let snap = snapshot(false, 2.0);
        assert_eq!(ctl.decide(Some(&snap), 80.0, 21, 10_000.0, &config()), None);
    }

    #[test]
    fn tiny_stake_means_no_order() {
        let ctl = SymbolController::new("AAPL".into());
        let snap = snapshot(true, 2.0);
        // 10 * 0.05 / 4.0 = 0.125 shares -> nothing to submit.
        assert_eq!(ctl.decide(Some(&snap), 80.0, 21, 10.0, &config()), None);
    }

    #[test]
    fn stop_takes_precedence() {
        let ctl = open_controller(100.0, 10, 50);
        let snap = snapshot(false, 2.0); // band = 4.0
        let intent = ctl.decide(Some(&snap), 96.0, 15, 0.0, &config());
        assert_eq!(
            intent,
            Some(OrderIntent::Exit {
                shares: 50,
                reason: ExitReason::Stop
            })
        );
    }

    #[test]
    fn target_fires_above_band() {
        let ctl = open_controller(100.0, 10, 50);
        let snap = snapshot(false, 2.0);
        let intent = ctl.decide(Some(&snap), 104.0, 15, 0.0, &config());
        assert_eq!(
            intent,
            Some(OrderIntent::Exit {
                shares: 50,
                reason: ExitReason::Target
            })
        );
    }

    #[test]
    fn time_stop_at_max_hold() {
        let ctl = open_controller(100.0, 10, 50);
        let snap = snapshot(false, 2.0);
        assert_eq!(ctl.decide(Some(&snap), 100.0, 39, 0.0, &config()), None);
        let intent = ctl.decide(Some(&snap), 100.0, 40, 0.0, &config());
        assert_eq!(
            intent,
            Some(OrderIntent::Exit {
                shares: 50,
                reason: ExitReason::TimeStop
            })
        );
    }

    #[test]
    fn time_stop_fires_without_snapshot() {
        let ctl = open_controller(100.0, 10, 50);
        let intent = ctl.decide(None, f64::NAN, 40, 0.0, &config());
        assert_eq!(
            intent,
            Some(OrderIntent::Exit {
                shares: 50,
                reason: ExitReason::TimeStop
            })
        );
    }

    #[test]
    fn pending_states_issue_nothing() {
        let mut ctl = SymbolController::new("AAPL".into());
        ctl.state = PositionState::PendingEntry;
        let snap = snapshot(true, 2.0);
        assert_eq!(ctl.decide(Some(&snap), 80.0, 21, 10_000.0, &config()), None);

        let mut ctl = open_controller(100.0, 10, 50);
        ctl.state = PositionState::PendingExit;
        assert_eq!(ctl.decide(Some(&snap), 50.0, 60, 0.0, &config()), None);
    }

    #[test]
    fn no_shock_entry_while_open() {
        // A second shock while holding must not pyramid.
        let ctl = open_controller(100.0, 10, 50);
        let snap = snapshot(true, 2.0);
        let intent = ctl.decide(Some(&snap), 99.0, 12, 10_000.0, &config());
        assert_eq!(intent, None);
    }
}
