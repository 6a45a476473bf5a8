//! Simulation configuration.
//!
//! One explicit value handed to the engine at construction — there is no
//! module-level mutable configuration anywhere in the core.

use crate::engine::SimError;
use crate::ledger::TaxConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub start_cash: f64,
    /// Fraction of available cash put at risk per entry.
    pub risk_budget: f64,
    /// Stop/target distance in ATR14 multiples; also scales the per-share
    /// risk used for sizing.
    pub atr_mult: f64,
    /// Time stop: maximum bars a position may be held.
    pub max_hold_bars: usize,
    /// Shock trigger: 1-day return at or below `-shock_sigma * sigma20`.
    pub shock_sigma: f64,
    /// Execution cost per fill, as a fraction of filled notional.
    pub slippage_rate: f64,
    pub tax: TaxConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_cash: 10_000.0,
            risk_budget: 0.05,
            atr_mult: 2.0,
            max_hold_bars: 30,
            shock_sigma: 2.5,
            slippage_rate: 0.0005,
            tax: TaxConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        fn bad(msg: impl Into<String>) -> Result<(), SimError> {
            Err(SimError::InvalidConfig(msg.into()))
        }

        if !(self.start_cash > 0.0) {
            return bad("start_cash must be positive");
        }
        if !(self.risk_budget > 0.0 && self.risk_budget <= 1.0) {
            return bad("risk_budget must be in (0, 1]");
        }
        if !(self.atr_mult > 0.0) {
            return bad("atr_mult must be positive");
        }
        if self.max_hold_bars == 0 {
            return bad("max_hold_bars must be positive");
        }
        if !(self.shock_sigma > 0.0) {
            return bad("shock_sigma must be positive");
        }
        if !(self.slippage_rate >= 0.0 && self.slippage_rate < 1.0) {
            return bad("slippage_rate must be in [0, 1)");
        }
        for (name, rate) in [
            ("short_term_rate", self.tax.short_term_rate),
            ("long_term_rate", self.tax.long_term_rate),
        ] {
            if !(0.0..1.0).contains(&rate) {
                return bad(format!("tax {name} must be in [0, 1)"));
            }
        }
        if self.tax.long_term_days <= 0 {
            return bad("tax long_term_days must be positive");
        }
        Ok(())
    }
}
