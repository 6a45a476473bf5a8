//! Domain types for the shock-rebound simulation core.

pub mod bar;
pub mod equity;
pub mod order;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use equity::EquitySample;
pub use order::{Fill, Order, OrderId, OrderSide, OrderStatus};
pub use position::Position;
pub use trade::TradeRecord;

/// Symbol type alias
pub type Symbol = String;
