//! Backtest runner — wires together config, data loading, the engine, and
//! metrics.
//!
//! Two entry points:
//! - `run_backtest()`: loads bars from disk per the config. Used by the CLI.
//! - `run_backtest_from_data()`: takes pre-loaded `MarketData` — no I/O.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rebound_core::data::{MarketData, MarketDataError};
use rebound_core::engine::{Engine, RunResult, SimError};

use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{load_market_data, LoadError};
use crate::metrics::SummaryMetrics;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("alignment error: {0}")]
    Alignment(#[from] MarketDataError),
    #[error("simulation error: {0}")]
    Sim(#[from] SimError),
}

/// Complete result of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub metrics: SummaryMetrics,
    pub run: RunResult,
    pub symbols: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: usize,
}

/// Run a backtest from a `RunConfig`, loading bars from disk.
pub fn run_backtest(config: &RunConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let data = load_market_data(
        &config.data_dir,
        &config.universe,
        config.start_date,
        config.end_date,
    )?;
    run_backtest_from_data(config, &data)
}

/// Run a backtest on pre-loaded data — no I/O.
pub fn run_backtest_from_data(
    config: &RunConfig,
    data: &MarketData,
) -> Result<BacktestResult, RunError> {
    tracing::info!(
        symbols = config.universe.len(),
        bars = data.len(),
        "starting backtest"
    );
    let run = Engine::new(config.strategy.clone())?.run(data)?;
    let metrics = SummaryMetrics::compute(&run.equity, &run.trades);
    tracing::info!(
        trades = run.trades.len(),
        final_cash = run.final_cash,
        total_return = metrics.total_return,
        "backtest finished"
    );
    Ok(BacktestResult {
        metrics,
        bar_count: data.len(),
        symbols: data.symbols().map(str::to_string).collect(),
        start_date: data.timeline().first().copied(),
        end_date: data.timeline().last().copied(),
        run,
    })
}
