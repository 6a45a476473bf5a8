//! Volatility indicators feeding the shock detector and position sizing.

pub mod atr;
pub mod rolling;

pub use atr::{atr, true_range};
pub use rolling::{pct_returns, population_std};
