//! Externally reported trades.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::order::Quantity;

/// An execution reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trade {
    /// Execution price.
    pub price: Decimal,
    /// Executed quantity.
    pub quantity: Quantity,
}

impl Trade {
    /// Create a new trade.
    pub fn new(price: Decimal, quantity: Quantity) -> Self {
        Self { price, quantity }
    }
}

/// Running traded quantity at the most recent trade price.
///
/// Consecutive trades at one price accumulate; a trade at a different price
/// starts a new total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradePrint {
    /// Accumulated quantity at `price`.
    pub quantity: Quantity,
    /// Price of the most recent trade.
    pub price: Decimal,
}

/// `{quantity}@{price}`, the price in its shortest form with at least one
/// fractional digit (`1025.0`, `1025.5`).
impl fmt::Display for TradePrint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let price = self.price.normalize();
        if price.scale() == 0 {
            write!(f, "{}@{}.0", self.quantity, price)
        } else {
            write!(f, "{}@{}", self.quantity, price)
        }
    }
}
