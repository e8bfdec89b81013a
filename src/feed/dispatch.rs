//! Row classification and dispatch onto the book.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use crate::book::{EventKind, Order, OrderBook, Side, Trade, TradePrint};
use crate::error::FeedError;

/// Marker in the first field of a trade row.
pub const TRADE_MARKER: &str = "T";

/// A classified feed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// Add, modify or remove.
    Order(Order),
    /// Reported execution.
    Trade(Trade),
}

fn invalid<S: AsRef<str>>(fields: &[S], what: &str) -> FeedError {
    let row: Vec<&str> = fields.iter().map(AsRef::as_ref).collect();
    FeedError::InvalidMessage(format!("{what}: [{}]", row.join(",")))
}

/// Parse an integer field; blank means 0 so validation reports it as missing.
fn parse_int<S: AsRef<str>>(fields: &[S], field: &str) -> Result<i64, FeedError> {
    if field.is_empty() {
        return Ok(0);
    }
    field.parse().map_err(|_| invalid(fields, "bad integer field"))
}

fn parse_price<S: AsRef<str>>(fields: &[S], field: &str) -> Result<Option<Decimal>, FeedError> {
    if field.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(field)
        .map(Some)
        .map_err(|_| invalid(fields, "bad price field"))
}

/// Classify one row.
///
/// Order rows are `kind,id,side,quantity,price`; trade rows are
/// `T,quantity,price`.
pub fn classify<S: AsRef<str>>(fields: &[S]) -> Result<FeedEvent, FeedError> {
    match fields {
        [kind, id, side, quantity, price] => {
            let kind = EventKind::from_str(kind.as_ref())
                .map_err(|_| invalid(fields, "unknown event kind"))?;
            Ok(FeedEvent::Order(Order {
                kind,
                id: parse_int(fields, id.as_ref())?,
                side: Side::from_str(side.as_ref()).ok(),
                price: parse_price(fields, price.as_ref())?,
                quantity: parse_int(fields, quantity.as_ref())?,
            }))
        }
        [marker, quantity, price] if marker.as_ref() == TRADE_MARKER => {
            let quantity: i64 = quantity
                .as_ref()
                .parse()
                .map_err(|_| invalid(fields, "bad trade quantity"))?;
            let price = Decimal::from_str(price.as_ref())
                .map_err(|_| invalid(fields, "bad trade price"))?;
            if quantity <= 0 || price < Decimal::ZERO {
                return Err(invalid(fields, "non-positive trade"));
            }
            Ok(FeedEvent::Trade(Trade::new(price, quantity)))
        }
        _ => Err(invalid(fields, "unrecognized row")),
    }
}

/// Apply a classified event. Returns the running trade total for trades.
pub fn apply(book: &mut OrderBook, event: FeedEvent) -> Result<Option<TradePrint>, FeedError> {
    debug!(?event, "dispatching");
    match event {
        FeedEvent::Order(order) => {
            match order.kind {
                EventKind::Add => book.add_order(&order)?,
                EventKind::Modify => book.modify_order(&order)?,
                EventKind::Remove => book.remove_order(&order)?,
            }
            Ok(None)
        }
        FeedEvent::Trade(trade) => book.add_trade(trade).map(Some),
    }
}

/// Classify and apply one row.
pub fn dispatch<S: AsRef<str>>(
    book: &mut OrderBook,
    fields: &[S],
) -> Result<Option<TradePrint>, FeedError> {
    let event = classify(fields)?;
    apply(book, event)
}
