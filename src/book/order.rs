//! Order event values and resting order state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FeedError;

/// Order identifier. Valid ids are strictly positive.
pub type OrderId = i64;

/// Order quantity. Signed so that non-positive values reach validation.
pub type Quantity = i64;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Side {
    /// Buy order.
    #[strum(serialize = "B")]
    Buy,
    /// Sell order.
    #[strum(serialize = "S")]
    Sell,
}

/// Intent of the event that produced an [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum EventKind {
    /// New resting order.
    #[strum(serialize = "A")]
    Add,
    /// Quantity replacement.
    #[strum(serialize = "M")]
    Modify,
    /// Quantity decrement / cancel.
    #[strum(serialize = "X")]
    Remove,
}

/// One order event as read from the feed.
///
/// Fields that may be absent on the wire are optional here; [`Order::validate`]
/// decides whether the event may touch book state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Event intent.
    pub kind: EventKind,
    /// Order id (0 when blank).
    pub id: OrderId,
    /// Side, if recognized.
    pub side: Option<Side>,
    /// Limit price, if present.
    pub price: Option<Decimal>,
    /// Quantity carried by the event.
    pub quantity: Quantity,
}

impl Order {
    /// Build an order event with every field present.
    pub fn new(kind: EventKind, id: OrderId, side: Side, price: Decimal, quantity: Quantity) -> Self {
        Self {
            kind,
            id,
            side: Some(side),
            price: Some(price),
            quantity,
        }
    }

    /// Add event.
    pub fn add(id: OrderId, side: Side, price: Decimal, quantity: Quantity) -> Self {
        Self::new(EventKind::Add, id, side, price, quantity)
    }

    /// Modify event.
    pub fn modify(id: OrderId, side: Side, price: Decimal, quantity: Quantity) -> Self {
        Self::new(EventKind::Modify, id, side, price, quantity)
    }

    /// Remove event.
    pub fn remove(id: OrderId, side: Side, price: Decimal, quantity: Quantity) -> Self {
        Self::new(EventKind::Remove, id, side, price, quantity)
    }

    /// Check the validity invariant, returning the confirmed side and price.
    pub fn validate(&self) -> Result<(Side, Decimal), FeedError> {
        let invalid = FeedError::InvalidOrder { order_id: self.id };
        if self.id <= 0 || self.quantity <= 0 {
            return Err(invalid);
        }
        let (Some(side), Some(price)) = (self.side, self.price) else {
            return Err(invalid);
        };
        if price < Decimal::ZERO {
            return Err(invalid);
        }
        Ok((side, price))
    }

    /// Validate and build the resting form with the book-assigned arrival key.
    pub fn to_resting(&self, sequence: u64) -> Result<RestingOrder, FeedError> {
        let (side, price) = self.validate()?;
        Ok(RestingOrder {
            id: self.id,
            side,
            price,
            quantity: self.quantity,
            sequence,
        })
    }
}

/// An order resting in the book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestingOrder {
    /// Order id.
    pub id: OrderId,
    /// Side.
    pub side: Side,
    /// Limit price.
    pub price: Decimal,
    /// Remaining quantity, always > 0 while resting.
    pub quantity: Quantity,
    /// Arrival sequence key (time priority).
    pub sequence: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn side_from_feed_token() {
        assert_eq!(Side::from_str("B").unwrap(), Side::Buy);
        assert_eq!(Side::from_str("S").unwrap(), Side::Sell);
        assert!(Side::from_str("Q").is_err());
    }

    #[test]
    fn event_kind_from_feed_token() {
        assert_eq!(EventKind::from_str("A").unwrap(), EventKind::Add);
        assert_eq!(EventKind::from_str("M").unwrap(), EventKind::Modify);
        assert_eq!(EventKind::from_str("X").unwrap(), EventKind::Remove);
        assert!(EventKind::from_str("T").is_err());
    }

    #[test]
    fn validate_accepts_complete_order() {
        let order = Order::add(7, Side::Sell, dec!(1025.5), 3);
        let resting = order.to_resting(42).unwrap();
        assert_eq!(resting.id, 7);
        assert_eq!(resting.side, Side::Sell);
        assert_eq!(resting.price, dec!(1025.5));
        assert_eq!(resting.sequence, 42);
    }

    #[test]
    fn validate_accepts_zero_price() {
        assert!(Order::add(1, Side::Buy, dec!(0), 1).validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_or_bad_fields() {
        let bad = [
            Order::add(0, Side::Buy, dec!(10), 1),
            Order::add(-3, Side::Buy, dec!(10), 1),
            Order::add(1, Side::Buy, dec!(-0.01), 1),
            Order::add(1, Side::Buy, dec!(10), 0),
            Order::add(1, Side::Buy, dec!(10), -4),
            Order {
                side: None,
                ..Order::add(1, Side::Buy, dec!(10), 1)
            },
            Order {
                price: None,
                ..Order::add(1, Side::Buy, dec!(10), 1)
            },
        ];

        for order in bad {
            assert!(
                matches!(order.validate(), Err(FeedError::InvalidOrder { .. })),
                "{order:?} should be invalid"
            );
        }
    }
}
