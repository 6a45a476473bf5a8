//! Rebound Core — the shock-rebound backtest engine.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (bars, orders, fills, positions, trades, equity samples)
//! - Return/volatility indicators and the shock detector
//! - FIFO tax-lot ledger with holding-period-aware gain treatment
//! - Per-symbol entry/exit state machine with one-bar fill lag
//! - Bar-driven engine with end-of-run liquidation

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod ledger;
pub mod signals;
