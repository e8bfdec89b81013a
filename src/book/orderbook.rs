//! The limit order book: order storage, level index, best prices and trade
//! history.
//!
//! Every public mutation validates fully before touching state, so a failed
//! call leaves the book exactly as it was.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::levels::{LevelRemoval, PriceLevelIndex};
use super::order::{Order, OrderId, Quantity, RestingOrder, Side};
use super::tracker::BestPriceTracker;
use super::trade::{Trade, TradePrint};
use crate::error::{FeedError, MatchFailure};
use crate::metrics;

/// One price level as written in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSnapshot {
    /// Level price.
    pub price: Decimal,
    /// Resting quantities in time priority.
    pub quantities: Vec<Quantity>,
}

/// Book state per side, levels in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookSnapshot {
    /// Sell levels.
    pub sells: Vec<LevelSnapshot>,
    /// Buy levels.
    pub buys: Vec<LevelSnapshot>,
}

/// Limit order book rebuilt from a feed of order and trade events.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: HashMap<OrderId, RestingOrder>,
    levels: PriceLevelIndex,
    tracker: BestPriceTracker,
    trades: HashMap<Decimal, Vec<Trade>>,
    trade_count: usize,
    last_trade: Option<TradePrint>,
    crossed_signals: u64,
    next_sequence: u64,
}

impl OrderBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rest a new order.
    #[instrument(skip(self), fields(id = order.id))]
    pub fn add_order(&mut self, order: &Order) -> Result<(), FeedError> {
        let resting = order.to_resting(self.next_sequence)?;
        if self.orders.contains_key(&resting.id) {
            return Err(FeedError::DuplicateOrder {
                order_id: resting.id,
            });
        }

        let (side, price) = (resting.side, resting.price);
        if self.levels.insert(side, price, resting.id) {
            self.tracker.insert(side, price);
        }
        debug!(%side, %price, quantity = resting.quantity, sequence = resting.sequence, "order added");
        self.orders.insert(resting.id, resting);
        self.next_sequence += 1;

        self.note_crossed();
        Ok(())
    }

    /// Decrement a resting order, deleting it once nothing remains.
    ///
    /// Removing more than the resting quantity deletes the order.
    #[instrument(skip(self), fields(id = order.id))]
    pub fn remove_order(&mut self, order: &Order) -> Result<(), FeedError> {
        order.validate()?;
        let Some(existing) = self.orders.get_mut(&order.id) else {
            return Err(FeedError::OrderNotFound { order_id: order.id });
        };

        existing.quantity -= order.quantity;
        if existing.quantity > 0 {
            debug!(remaining = existing.quantity, "order reduced");
        } else if let Some(removed) = self.orders.remove(&order.id) {
            // level and tracker follow the order's resting state, not the event's
            let (side, price) = (removed.side, removed.price);
            if self.levels.remove(side, price, removed.id) == LevelRemoval::LevelEmptied {
                self.tracker.evict(side, price);
            }
            debug!(%side, %price, "order deleted");
        }

        self.note_crossed();
        Ok(())
    }

    /// Replace a resting order's quantity.
    ///
    /// Unknown ids are ignored. Side and price on the event are not applied;
    /// the order stays at its level.
    #[instrument(skip(self), fields(id = order.id))]
    pub fn modify_order(&mut self, order: &Order) -> Result<(), FeedError> {
        let (side, price) = order.validate()?;
        let Some(existing) = self.orders.get_mut(&order.id) else {
            debug!("modify for unknown order ignored");
            return Ok(());
        };

        if existing.side != side || existing.price != price {
            warn!(
                resting_side = %existing.side,
                resting_price = %existing.price,
                event_side = %side,
                event_price = %price,
                "modify does not relocate orders; only quantity applied"
            );
        }
        existing.quantity = order.quantity;

        self.note_crossed();
        Ok(())
    }

    /// Resting sell orders priced at or below the trade price, in time
    /// priority, provided they can cover the trade quantity.
    ///
    /// Buy-side liquidity is never considered, whatever side the trade hit.
    pub fn matching_candidates(&self, trade: &Trade) -> Result<Vec<OrderId>, FeedError> {
        let orders = &self.orders;
        let mut candidates: Vec<&RestingOrder> = self
            .levels
            .levels_for_side(Side::Sell)
            .filter(|(price, _)| *price <= trade.price)
            .flat_map(|(_, ids)| ids.iter().filter_map(move |id| orders.get(id)))
            .collect();
        candidates.sort_by_key(|order| order.sequence);

        let not_matched = |reason| FeedError::TradeNotMatched {
            price: trade.price,
            quantity: trade.quantity,
            reason,
        };

        if candidates.is_empty() {
            return Err(not_matched(MatchFailure::NoCandidates));
        }
        // saturates at Quantity::MAX, which already covers any trade
        let available = candidates
            .iter()
            .fold(0, |total: Quantity, order| total.saturating_add(order.quantity));
        if trade.quantity > available {
            return Err(not_matched(MatchFailure::InsufficientQuantity { available }));
        }

        Ok(candidates.into_iter().map(|order| order.id).collect())
    }

    /// Validate a reported trade and record it.
    ///
    /// This is a feasibility check and bookkeeping only: resting quantities
    /// are left untouched.
    #[instrument(skip(self), fields(price = %trade.price, quantity = trade.quantity))]
    pub fn add_trade(&mut self, trade: Trade) -> Result<TradePrint, FeedError> {
        self.matching_candidates(&trade)?;

        self.trades.entry(trade.price).or_default().push(trade);
        self.trade_count += 1;

        let quantity = match self.last_trade {
            Some(last) if last.price == trade.price => last.quantity.saturating_add(trade.quantity),
            _ => trade.quantity,
        };
        let print = TradePrint {
            quantity,
            price: trade.price,
        };
        self.last_trade = Some(print);
        metrics::inc_trades_recorded();
        debug!(running = quantity, "trade recorded");

        Ok(print)
    }

    /// Fail if the book ever crossed without any trade being reported.
    pub fn check_expected_trades(&self) -> Result<(), FeedError> {
        if self.crossed_signals > 0 && self.trade_count == 0 {
            return Err(FeedError::BestPriceButNoTrade {
                signals: self.crossed_signals,
            });
        }
        Ok(())
    }

    /// Validated best bid.
    pub fn best_bid(&mut self) -> Option<Decimal> {
        self.best(Side::Buy)
    }

    /// Validated best ask.
    pub fn best_ask(&mut self) -> Option<Decimal> {
        self.best(Side::Sell)
    }

    fn best(&mut self, side: Side) -> Option<Decimal> {
        let levels = &self.levels;
        self.tracker
            .peek_best(side, |price| levels.contains(side, price))
    }

    /// Average of best bid and best ask, or `None` when a side is empty.
    pub fn midquote(&mut self) -> Option<Decimal> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        // prices are non-negative, so the half-spread form stays in range
        let mid = bid
            .checked_add(ask)
            .map(|sum| sum / Decimal::TWO)
            .unwrap_or_else(|| bid + (ask - bid) / Decimal::TWO);
        Some(mid)
    }

    fn note_crossed(&mut self) {
        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            if bid >= ask {
                self.crossed_signals += 1;
                metrics::inc_crossed_market_signals();
                warn!(%bid, %ask, signals = self.crossed_signals, "crossed market");
            }
        }
    }

    /// Resting quantities per level, sells then buys, in level creation order.
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            sells: self.side_snapshot(Side::Sell),
            buys: self.side_snapshot(Side::Buy),
        }
    }

    fn side_snapshot(&self, side: Side) -> Vec<LevelSnapshot> {
        self.levels
            .levels_for_side(side)
            .map(|(price, ids)| LevelSnapshot {
                price,
                quantities: ids
                    .iter()
                    .filter_map(|id| self.orders.get(id).map(|order| order.quantity))
                    .collect(),
            })
            .collect()
    }

    /// Resting order by id.
    pub fn order(&self, id: OrderId) -> Option<&RestingOrder> {
        self.orders.get(&id)
    }

    /// Number of resting orders.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Ids resting at (side, price) in time priority.
    pub fn level_ids(&self, side: Side, price: Decimal) -> &[OrderId] {
        self.levels.level_ids(side, price)
    }

    /// Trades recorded at `price`, in arrival order.
    pub fn trades_at(&self, price: Decimal) -> &[Trade] {
        self.trades
            .get(&price)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total trades recorded.
    pub fn trade_count(&self) -> usize {
        self.trade_count
    }

    /// Running total at the most recent trade price.
    pub fn last_trade(&self) -> Option<TradePrint> {
        self.last_trade
    }

    /// Number of mutations after which the book was crossed.
    pub fn crossed_market_signals(&self) -> u64 {
        self.crossed_signals
    }
}
