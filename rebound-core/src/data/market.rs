//! Aligned multi-symbol bar container.
//!
//! The data collaborator delivers ordered, gap-free daily series. Here we only
//! pin them to a shared timeline: every series must cover a contiguous suffix
//! of it (instruments listed mid-window start late; nothing may end early —
//! late gaps arrive as void bars, not missing rows).

use crate::domain::{Bar, Symbol};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("series for '{symbol}' does not align with the run timeline")]
    MisalignedSeries { symbol: String },
}

/// One symbol's bars, starting `offset` bars into the run timeline.
#[derive(Debug, Clone)]
pub struct SymbolSeries {
    pub offset: usize,
    pub bars: Vec<Bar>,
}

impl SymbolSeries {
    /// Local index for global bar index `t`, if this series covers it.
    pub fn local_index(&self, t: usize) -> Option<usize> {
        t.checked_sub(self.offset).filter(|i| *i < self.bars.len())
    }

    /// Bars from the series start through global index `t`.
    pub fn up_to(&self, t: usize) -> Option<&[Bar]> {
        self.local_index(t).map(|i| &self.bars[..=i])
    }

    pub fn bar_at(&self, t: usize) -> Option<&Bar> {
        self.local_index(t).map(|i| &self.bars[i])
    }
}

/// All bar series for a run, keyed by symbol in a `BTreeMap` so every
/// iteration over instruments happens in one deterministic order.
#[derive(Debug, Clone)]
pub struct MarketData {
    timeline: Vec<NaiveDate>,
    series: BTreeMap<Symbol, SymbolSeries>,
}

impl MarketData {
    pub fn new(bars_by_symbol: BTreeMap<Symbol, Vec<Bar>>) -> Result<Self, MarketDataError> {
        let timeline: Vec<NaiveDate> = bars_by_symbol
            .values()
            .max_by_key(|bars| bars.len())
            .map(|bars| bars.iter().map(|b| b.date).collect())
            .unwrap_or_default();

        let mut series = BTreeMap::new();
        for (symbol, bars) in bars_by_symbol {
            if bars.is_empty() {
                tracing::warn!(symbol, "dropping symbol with no bars");
                continue;
            }
            let offset = timeline.len() - bars.len().min(timeline.len());
            let aligned = bars.len() <= timeline.len()
                && bars
                    .iter()
                    .zip(&timeline[offset..])
                    .all(|(bar, date)| bar.date == *date);
            if !aligned {
                return Err(MarketDataError::MisalignedSeries { symbol });
            }
            series.insert(symbol, SymbolSeries { offset, bars });
        }

        Ok(Self { timeline, series })
    }

    pub fn timeline(&self) -> &[NaiveDate] {
        &self.timeline
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|s| s.as_str())
    }

    pub fn series(&self, symbol: &str) -> Option<&SymbolSeries> {
        self.series.get(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &SymbolSeries)> {
        self.series.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(symbol: &str, start_day: u32, n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024, 1, start_day).unwrap()
                    + chrono::Duration::days(i as i64);
                Bar {
                    symbol: symbol.into(),
                    date,
                    open: 100.0,
                    high: 101.0,
                    low: 99.0,
                    close: 100.0,
                    volume: 1_000,
                }
            })
            .collect()
    }

    #[test]
    fn aligned_series_share_timeline() {
        let mut map = BTreeMap::new();
        map.insert("AAA".to_string(), bars("AAA", 1, 10));
        map.insert("BBB".to_string(), bars("BBB", 1, 10));
        let data = MarketData::new(map).unwrap();
        assert_eq!(data.len(), 10);
        assert_eq!(data.symbols().count(), 2);
    }

    #[test]
    fn late_listing_gets_offset() {
        let mut map = BTreeMap::new();
        map.insert("AAA".to_string(), bars("AAA", 1, 10));
        map.insert("NEW".to_string(), bars("NEW", 5, 6)); // starts 4 days later
        let data = MarketData::new(map).unwrap();
        let series = data.series("NEW").unwrap();
        assert_eq!(series.offset, 4);
        assert!(series.bar_at(3).is_none());
        assert!(series.bar_at(4).is_some());
        assert_eq!(series.up_to(9).unwrap().len(), 6);
    }

    #[test]
    fn misaligned_series_rejected() {
        let mut map = BTreeMap::new();
        map.insert("AAA".to_string(), bars("AAA", 1, 10));
        map.insert("BAD".to_string(), bars("BAD", 2, 10)); // shifted by a day
        assert!(matches!(
            MarketData::new(map),
            Err(MarketDataError::MisalignedSeries { .. })
        ));
    }

    #[test]
    fn empty_input_is_empty_not_error() {
        let data = MarketData::new(BTreeMap::new()).unwrap();
        assert!(data.is_empty());
    }
}
