//! Rebound CLI — run shock-rebound backtests.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML config file, with optional
//!   universe/date/directory overrides, print a summary, save artifacts

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rebound_runner::{run_backtest, save_artifacts, BacktestResult, RunConfig};

#[derive(Parser)]
#[command(name = "rebound", about = "Shock-rebound backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Override the config's symbol universe (e.g. SPY QQQ AAPL).
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Override the start date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Override the end date (YYYY-MM-DD, inclusive).
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Override the directory holding {SYMBOL}.csv bar files.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Override the artifact output directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            symbols,
            from,
            to,
            data_dir,
            output_dir,
        } => run_command(config, symbols, from, to, data_dir, output_dir),
    }
}

fn run_command(
    config_path: PathBuf,
    symbols: Vec<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = RunConfig::from_file(&config_path)
        .with_context(|| format!("failed to load config '{}'", config_path.display()))?;

    if !symbols.is_empty() {
        config.universe = symbols;
    }
    if from.is_some() {
        config.start_date = from;
    }
    if to.is_some() {
        config.end_date = to;
    }
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    config.validate().context("invalid run configuration")?;

    let result = run_backtest(&config).context("backtest failed")?;
    print_summary(&result);
    save_artifacts(&result, &config.output_dir)?;
    println!("Artifacts saved to: {}", config.output_dir.display());
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    println!();
    println!("=== Backtest Result ===");
    println!("Symbols:        {}", result.symbols.join(", "));
    if let (Some(start), Some(end)) = (result.start_date, result.end_date) {
        println!("Period:         {start} to {end}");
    }
    println!("Bars:           {}", result.bar_count);
    println!("Trades:         {}", result.metrics.trade_count);
    println!();
    println!("--- Performance ---");
    println!(
        "Total Return:   {:.2}%",
        result.metrics.total_return * 100.0
    );
    println!("CAGR:           {:.2}%", result.metrics.cagr * 100.0);
    println!(
        "Max Drawdown:   {:.2}%",
        result.metrics.max_drawdown * 100.0
    );
    println!("Win Rate:       {:.1}%", result.metrics.win_rate * 100.0);
    println!("Taxes Paid:     {:.2}", result.metrics.total_tax);
    println!("Slippage Paid:  {:.2}", result.metrics.total_slippage);
    println!("Final Cash:     {:.2}", result.run.final_cash);
    for skip in &result.run.skipped {
        println!("WARNING: skipped {}: {}", skip.symbol, skip.reason);
    }
    for stuck in &result.run.unliquidated {
        println!(
            "WARNING: {} still holds {} shares (void final bar on {})",
            stuck.symbol, stuck.shares, stuck.last_date
        );
    }
    println!();
}
