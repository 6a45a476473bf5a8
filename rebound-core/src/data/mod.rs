//! Run input data containers.

pub mod market;

pub use market::{MarketData, MarketDataError, SymbolSeries};
