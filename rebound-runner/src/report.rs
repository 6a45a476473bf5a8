//! Artifact export — JSON result, trade tape, and equity curve.
//!
//! Three files per run under the output directory:
//! - `result.json`: the full `BacktestResult`, round-trippable
//! - `trades.csv`: one row per round-trip trade
//! - `equity.csv`: date,value samples

use anyhow::{Context, Result};
use rebound_core::domain::{EquitySample, TradeRecord};
use std::path::Path;

use crate::runner::BacktestResult;

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")
}

/// Export the trade tape as CSV.
///
/// Columns: symbol, shares, entry_bar, entry_date, entry_price, exit_bar,
/// exit_date, exit_price, bars_held, gross, tax, slippage, net. Open trades
/// leave exit columns empty.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "shares",
        "entry_bar",
        "entry_date",
        "entry_price",
        "exit_bar",
        "exit_date",
        "exit_price",
        "bars_held",
        "gross",
        "tax",
        "slippage",
        "net",
    ])?;

    for t in trades {
        let opt = |s: Option<String>| s.unwrap_or_default();
        wtr.write_record([
            t.symbol.clone(),
            t.shares.to_string(),
            t.entry_bar.to_string(),
            t.entry_date.to_string(),
            format!("{:.6}", t.entry_price),
            opt(t.exit_bar.map(|b| b.to_string())),
            opt(t.exit_date.map(|d| d.to_string())),
            opt(t.exit_price.map(|p| format!("{p:.6}"))),
            opt(t.bars_held().map(|b| b.to_string())),
            format!("{:.2}", t.gross),
            format!("{:.2}", t.tax),
            format!("{:.2}", t.slippage),
            format!("{:.2}", t.net),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush trades CSV")?;
    String::from_utf8(bytes).context("trades CSV was not valid UTF-8")
}

/// Export the equity curve as CSV (`date,value`).
pub fn export_equity_csv(equity: &[EquitySample]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "value"])?;
    for sample in equity {
        wtr.write_record([sample.date.to_string(), format!("{:.2}", sample.value)])?;
    }
    let bytes = wtr.into_inner().context("failed to flush equity CSV")?;
    String::from_utf8(bytes).context("equity CSV was not valid UTF-8")
}

/// Write all artifacts for one run into `output_dir`, creating it if needed.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir '{}'", output_dir.display()))?;

    let json = export_json(result)?;
    std::fs::write(output_dir.join("result.json"), json).context("failed to write result.json")?;

    let trades = export_trades_csv(&result.run.trades)?;
    std::fs::write(output_dir.join("trades.csv"), trades).context("failed to write trades.csv")?;

    let equity = export_equity_csv(&result.run.equity)?;
    std::fs::write(output_dir.join("equity.csv"), equity).context("failed to write equity.csv")?;

    tracing::info!(dir = %output_dir.display(), "artifacts saved");
    Ok(())
}
