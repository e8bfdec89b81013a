//! Order book engine.
//!
//! This module handles:
//! - Order and trade event values
//! - The price level index (time priority within a level)
//! - Best bid/ask tracking with lazy deletion
//! - The order book itself: lifecycle operations, trade feasibility checks,
//!   crossed-market accounting, midquote and snapshots

pub mod levels;
pub mod order;
pub mod orderbook;
pub mod trade;
pub mod tracker;

pub use levels::{LevelRemoval, PriceLevelIndex};
pub use order::{EventKind, Order, OrderId, Quantity, RestingOrder, Side};
pub use orderbook::{BookSnapshot, LevelSnapshot, OrderBook};
pub use trade::{Trade, TradePrint};
pub use tracker::BestPriceTracker;
