//! Bar loading for the runner.
//!
//! One OHLCV CSV per symbol under the configured data directory, columns
//! `date,open,high,low,close,volume`. Empty price cells become NaN (a void
//! bar the engine carries, not a dropped row). After the date-range filter,
//! symbols are aligned on the intersection of their trading dates, so every
//! series drives the same timeline.

use chrono::NaiveDate;
use rebound_core::data::{MarketData, MarketDataError};
use rebound_core::domain::Bar;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open bar file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("bar dates in '{path}' are not strictly increasing")]
    UnsortedDates { path: PathBuf },
    #[error("no bars for '{symbol}' in the requested date range")]
    NoBars { symbol: String },
    #[error("no dates shared by every symbol in the universe")]
    EmptyIntersection,
    #[error(transparent)]
    Alignment(#[from] MarketDataError),
}

/// One CSV row. Missing price cells deserialize to `None` and become NaN.
#[derive(Debug, Deserialize)]
struct BarRow {
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<u64>,
}

impl BarRow {
    fn into_bar(self, symbol: &str) -> Bar {
        Bar {
            symbol: symbol.to_string(),
            date: self.date,
            open: self.open.unwrap_or(f64::NAN),
            high: self.high.unwrap_or(f64::NAN),
            low: self.low.unwrap_or(f64::NAN),
            close: self.close.unwrap_or(f64::NAN),
            volume: self.volume.unwrap_or(0),
        }
    }
}

/// Load `{data_dir}/{SYMBOL}.csv` for every symbol, filter to the date range,
/// and align on the intersection of trading dates.
pub fn load_market_data(
    data_dir: &Path,
    universe: &[String],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<MarketData, LoadError> {
    let mut all_bars: BTreeMap<String, Vec<Bar>> = BTreeMap::new();
    for symbol in universe {
        let bars = load_symbol(data_dir, symbol, start, end)?;
        tracing::info!(symbol, bars = bars.len(), "loaded bar series");
        all_bars.insert(symbol.clone(), bars);
    }

    // Intersection of trading dates across the universe.
    let mut shared: Option<BTreeSet<NaiveDate>> = None;
    for bars in all_bars.values() {
        let dates: BTreeSet<NaiveDate> = bars.iter().map(|b| b.date).collect();
        shared = Some(match shared {
            None => dates,
            Some(prev) => prev.intersection(&dates).copied().collect(),
        });
    }
    let shared = shared.unwrap_or_default();
    if shared.is_empty() && !all_bars.is_empty() {
        return Err(LoadError::EmptyIntersection);
    }

    let aligned: BTreeMap<String, Vec<Bar>> = all_bars
        .into_iter()
        .map(|(symbol, bars)| {
            let kept: Vec<Bar> = bars
                .into_iter()
                .filter(|b| shared.contains(&b.date))
                .collect();
            (symbol, kept)
        })
        .collect();

    Ok(MarketData::new(aligned)?)
}

fn load_symbol(
    data_dir: &Path,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<Bar>, LoadError> {
    let path = data_dir.join(format!("{symbol}.csv"));
    let mut reader = csv::Reader::from_path(&path).map_err(|source| {
        if source.is_io_error() {
            LoadError::Io {
                path: path.clone(),
                source: std::io::Error::other(source.to_string()),
            }
        } else {
            LoadError::Csv {
                path: path.clone(),
                source,
            }
        }
    })?;

    let mut bars = Vec::new();
    for row in reader.deserialize::<BarRow>() {
        let row = row.map_err(|source| LoadError::Csv {
            path: path.clone(),
            source,
        })?;
        if start.is_some_and(|s| row.date < s) || end.is_some_and(|e| row.date > e) {
            continue;
        }
        bars.push(row.into_bar(symbol));
    }

    if bars.windows(2).any(|w| w[0].date >= w[1].date) {
        return Err(LoadError::UnsortedDates { path });
    }
    if bars.is_empty() {
        return Err(LoadError::NoBars {
            symbol: symbol.to_string(),
        });
    }
    Ok(bars)
}
