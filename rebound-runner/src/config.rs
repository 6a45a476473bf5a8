//! Serializable run configuration.
//!
//! A run is a TOML file: universe, date range, data/output directories, and a
//! `[strategy]` table mapped straight onto the core `SimConfig`. Every field
//! except the universe has a default, so a minimal file is just a symbol list.

use chrono::NaiveDate;
use rebound_core::engine::SimConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("universe is empty")]
    EmptyUniverse,
    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Symbols to trade. One CSV file per symbol under `data_dir`.
    pub universe: Vec<String>,

    /// Bars strictly before this date are dropped at load time.
    pub start_date: Option<NaiveDate>,

    /// Bars strictly after this date are dropped at load time.
    pub end_date: Option<NaiveDate>,

    /// Directory holding `{SYMBOL}.csv` bar files.
    pub data_dir: PathBuf,

    /// Directory where run artifacts are written.
    pub output_dir: PathBuf,

    /// Strategy parameters, passed through to the engine.
    pub strategy: SimConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            universe: Vec::new(),
            start_date: None,
            end_date: None,
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            strategy: SimConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ConfigError::InvertedDateRange { start, end });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = RunConfig::from_toml(r#"universe = ["SPY"]"#).unwrap();
        assert_eq!(config.universe, vec!["SPY"]);
        assert_eq!(config.strategy, SimConfig::default());
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.start_date.is_none());
    }

    #[test]
    fn full_config_parses() {
        let text = r#"
            universe = ["SPY", "QQQ"]
            start_date = "2015-01-02"
            end_date = "2020-12-31"
            data_dir = "bars"
            output_dir = "runs"

            [strategy]
            start_cash = 25000.0
            risk_budget = 0.1
            max_hold_bars = 60

            [strategy.tax]
            short_term_rate = 0.3
            long_term_rate = 0.2
            long_term_days = 365
        "#;
        let config = RunConfig::from_toml(text).unwrap();
        assert_eq!(config.universe.len(), 2);
        assert_eq!(
            config.start_date,
            Some(NaiveDate::from_ymd_opt(2015, 1, 2).unwrap())
        );
        assert_eq!(config.strategy.start_cash, 25_000.0);
        assert_eq!(config.strategy.max_hold_bars, 60);
        assert_eq!(config.strategy.tax.short_term_rate, 0.3);
        // Unspecified strategy fields keep their defaults.
        assert_eq!(config.strategy.atr_mult, 2.0);
    }

    #[test]
    fn empty_universe_is_rejected() {
        assert!(matches!(
            RunConfig::from_toml(r#"universe = []"#),
            Err(ConfigError::EmptyUniverse)
        ));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let text = r#"
            universe = ["SPY"]
            start_date = "2020-01-01"
            end_date = "2015-01-01"
        "#;
        assert!(matches!(
            RunConfig::from_toml(text),
            Err(ConfigError::InvertedDateRange { .. })
        ));
    }
}
