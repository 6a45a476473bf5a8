//! Entry signal generation.

pub mod shock;

pub use shock::{ReboundScorer, ShockDetector, SignalSnapshot};
