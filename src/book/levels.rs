//! Price level index keyed by (side, price).
//!
//! Each level holds the resting order ids at one price in FIFO (time
//! priority) order. Levels are kept in creation order rather than price order,
//! which is the order snapshots are written in. An emptied level is removed
//! outright; if the price later reappears it becomes the newest level.

use indexmap::IndexMap;
use rust_decimal::Decimal;

use super::order::{OrderId, Side};

/// Outcome of removing an id from its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelRemoval {
    /// The id was not present at that level.
    Missing,
    /// The id was removed and the level still has orders.
    Removed,
    /// The id was the last one; the level no longer exists.
    LevelEmptied,
}

/// Ordered index of resting order ids per (side, price).
#[derive(Debug, Clone, Default)]
pub struct PriceLevelIndex {
    buys: IndexMap<Decimal, Vec<OrderId>>,
    sells: IndexMap<Decimal, Vec<OrderId>>,
}

impl PriceLevelIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    fn side(&self, side: Side) -> &IndexMap<Decimal, Vec<OrderId>> {
        match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut IndexMap<Decimal, Vec<OrderId>> {
        match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        }
    }

    /// Append `id` to the back of its level, creating the level if needed.
    ///
    /// Returns true if the level was created by this call.
    pub fn insert(&mut self, side: Side, price: Decimal, id: OrderId) -> bool {
        let levels = self.side_mut(side);
        match levels.get_mut(&price) {
            Some(ids) => {
                ids.push(id);
                false
            }
            None => {
                levels.insert(price, vec![id]);
                true
            }
        }
    }

    /// Remove `id` from its level, deleting the level if it empties.
    pub fn remove(&mut self, side: Side, price: Decimal, id: OrderId) -> LevelRemoval {
        let levels = self.side_mut(side);
        let Some(ids) = levels.get_mut(&price) else {
            return LevelRemoval::Missing;
        };
        let Some(position) = ids.iter().position(|&resting| resting == id) else {
            return LevelRemoval::Missing;
        };

        ids.remove(position);
        if ids.is_empty() {
            // shift_remove keeps the creation order of the remaining levels
            levels.shift_remove(&price);
            LevelRemoval::LevelEmptied
        } else {
            LevelRemoval::Removed
        }
    }

    /// Ids resting at (side, price) in time priority, empty if no such level.
    pub fn level_ids(&self, side: Side, price: Decimal) -> &[OrderId] {
        self.side(side)
            .get(&price)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether a non-empty level exists at (side, price).
    pub fn contains(&self, side: Side, price: Decimal) -> bool {
        self.side(side).contains_key(&price)
    }

    /// Levels on one side in creation order.
    pub fn levels_for_side(&self, side: Side) -> impl Iterator<Item = (Decimal, &[OrderId])> + '_ {
        self.side(side)
            .iter()
            .map(|(price, ids)| (*price, ids.as_slice()))
    }

    /// Number of levels on one side.
    pub fn level_count(&self, side: Side) -> usize {
        self.side(side).len()
    }
}
