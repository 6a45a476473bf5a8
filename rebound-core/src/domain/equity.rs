//! Equity curve sample.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Portfolio value (cash + mark-to-market of open positions) at a point in
/// time. The recorder appends one sample at run start, one per bar, and one
/// final post-liquidation sample; dates are non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquitySample {
    pub date: NaiveDate,
    pub value: f64,
}
