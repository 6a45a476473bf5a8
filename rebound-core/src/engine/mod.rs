//! Simulation engine: configuration, per-symbol state machines, recording,
//! and the bar-driven driver.

pub mod config;
pub mod controller;
pub mod driver;
pub mod recorder;

pub use config::SimConfig;
pub use controller::{ExitReason, OrderIntent, PositionState, SymbolController};
pub use driver::{Engine, LiquidationSkip, RunResult, SymbolSkip};
pub use recorder::Recorder;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("no tradable instruments after warm-up exclusions")]
    EmptyUniverse,
}
