//! Order and fill types for the simulated execution path.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic order identifier, assigned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Submitted, waiting for the next resolution pass.
    Pending,
    /// Completely filled.
    Filled,
    /// Cancelled with a reason (e.g. end-of-run sweep of unresolved entries).
    Canceled { reason: String },
    /// Rejected with a reason (e.g. insufficient cash at resolution).
    Rejected { reason: String },
}

/// A single order in flight.
///
/// Orders submitted while processing bar *t* resolve before bar *t + 1*
/// decisions and fill at `reference_price`, the close of the decision bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub shares: u64,
    pub reference_price: f64,
    pub submitted_bar: usize,
    pub submitted_date: NaiveDate,
    pub status: OrderStatus,
}

impl Order {
    pub fn is_active(&self) -> bool {
        matches!(self.status, OrderStatus::Pending)
    }

    pub fn notional(&self) -> f64 {
        self.shares as f64 * self.reference_price
    }
}

/// Fill record delivered to `Engine::on_fill`.
///
/// Carries the decision bar's index, date, and price so entry/exit bookkeeping
/// is anchored to the bar the order was decided on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub shares: u64,
    pub price: f64,
    pub bar_index: usize,
    pub date: NaiveDate,
}
