//! End-to-end runner tests: CSV on disk -> config -> engine -> artifacts.

use rebound_runner::{import_json, run_backtest, save_artifacts, RunConfig, RunError};
use std::io::Write;
use std::path::Path;

/// Write a CSV with 21 quiet closes around 100, a crash to 80, then a slow
/// drift that only the time stop ends.
fn write_shock_csv(dir: &Path, symbol: &str) {
    let mut closes = vec![100.0];
    for i in 1..21 {
        closes.push(if i % 2 == 0 { 100.0 } else { 101.0 });
    }
    closes.push(80.0);
    for i in 1..=38 {
        closes.push(80.0 + 0.05 * i as f64);
    }

    let mut file = std::fs::File::create(dir.join(format!("{symbol}.csv"))).unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    for (i, close) in closes.iter().enumerate() {
        let date = base + chrono::Duration::days(i as i64);
        writeln!(
            file,
            "{date},{close},{},{},{close},1000",
            close + 0.5,
            close - 0.5
        )
        .unwrap();
    }
}

fn config_toml(data_dir: &Path, output_dir: &Path) -> String {
    format!(
        r#"
            universe = ["SPY"]
            data_dir = "{}"
            output_dir = "{}"
        "#,
        data_dir.display(),
        output_dir.display()
    )
}

#[test]
fn full_run_produces_trades_and_metrics() {
    let data_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_shock_csv(data_dir.path(), "SPY");

    let config = RunConfig::from_toml(&config_toml(data_dir.path(), out_dir.path())).unwrap();
    let result = run_backtest(&config).unwrap();

    assert_eq!(result.symbols, vec!["SPY"]);
    assert_eq!(result.bar_count, 60);
    assert_eq!(result.run.trades.len(), 1);
    assert_eq!(result.metrics.trade_count, 1);
    assert!(result.metrics.total_tax > 0.0);

    // Equity-derived return matches the cash outcome for a flat-at-end run.
    let expected = (result.run.final_cash - 10_000.0) / 10_000.0;
    assert!((result.metrics.total_return - expected).abs() < 1e-9);
}

#[test]
fn artifacts_round_trip() {
    let data_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    write_shock_csv(data_dir.path(), "SPY");

    let config = RunConfig::from_toml(&config_toml(data_dir.path(), out_dir.path())).unwrap();
    let result = run_backtest(&config).unwrap();
    save_artifacts(&result, &config.output_dir).unwrap();

    for name in ["result.json", "trades.csv", "equity.csv"] {
        assert!(config.output_dir.join(name).exists(), "{name} missing");
    }

    let json = std::fs::read_to_string(config.output_dir.join("result.json")).unwrap();
    let restored = import_json(&json).unwrap();
    assert_eq!(restored, result);

    let trades = std::fs::read_to_string(config.output_dir.join("trades.csv")).unwrap();
    assert_eq!(trades.lines().count(), 2); // header + one trade

    let equity = std::fs::read_to_string(config.output_dir.join("equity.csv")).unwrap();
    assert_eq!(equity.lines().count(), 60 + 2 + 1); // samples + header
}

#[test]
fn missing_data_file_surfaces_as_run_error() {
    let data_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let config = RunConfig::from_toml(&config_toml(data_dir.path(), out_dir.path())).unwrap();
    assert!(matches!(run_backtest(&config), Err(RunError::Data(_))));
}
