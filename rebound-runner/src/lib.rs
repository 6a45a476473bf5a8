//! Rebound Runner — backtest orchestration.
//!
//! Turns a TOML run configuration into a finished, exported backtest:
//! config parsing, per-symbol CSV bar loading with date alignment, the core
//! engine run, summary metrics, and artifact export.

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod report;
pub mod runner;

pub use config::{ConfigError, RunConfig};
pub use data_loader::{load_market_data, LoadError};
pub use metrics::SummaryMetrics;
pub use report::{export_equity_csv, export_json, export_trades_csv, import_json, save_artifacts};
pub use runner::{run_backtest, run_backtest_from_data, BacktestResult, RunError};
