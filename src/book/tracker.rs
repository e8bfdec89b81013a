//! Best bid / best ask tracking with lazily deleted heaps.
//!
//! Buy prices live in a max-heap and sell prices in a min-heap. Removing a
//! level does not restructure the heap; stale tops are discarded on the next
//! peek after checking them against the live level index.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use rust_decimal::Decimal;

use super::order::Side;

trait PriceKey: Ord {
    fn wrap(price: Decimal) -> Self;
    fn price(&self) -> Decimal;
}

impl PriceKey for Decimal {
    fn wrap(price: Decimal) -> Self {
        price
    }

    fn price(&self) -> Decimal {
        *self
    }
}

impl PriceKey for Reverse<Decimal> {
    fn wrap(price: Decimal) -> Self {
        Reverse(price)
    }

    fn price(&self) -> Decimal {
        self.0
    }
}

/// Heap of candidate prices. `members` mirrors the heap contents so that
/// pushing a price already present (live or stale) is a no-op.
#[derive(Debug, Clone)]
struct LazyHeap<K: PriceKey> {
    heap: BinaryHeap<K>,
    members: HashSet<Decimal>,
}

impl<K: PriceKey> Default for LazyHeap<K> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            members: HashSet::new(),
        }
    }
}

impl<K: PriceKey> LazyHeap<K> {
    fn push(&mut self, price: Decimal) {
        if self.members.insert(price) {
            self.heap.push(K::wrap(price));
        }
    }

    fn pop_top(&mut self) {
        if let Some(top) = self.heap.pop() {
            self.members.remove(&top.price());
        }
    }

    fn peek_live(&mut self, is_live: impl Fn(Decimal) -> bool) -> Option<Decimal> {
        while let Some(top) = self.heap.peek() {
            let price = top.price();
            if is_live(price) {
                return Some(price);
            }
            self.pop_top();
        }
        None
    }

    fn evict(&mut self, price: Decimal) {
        if self.heap.peek().map(K::price) == Some(price) {
            self.pop_top();
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

/// Best price per side over the prices that have (or recently had) a level.
#[derive(Debug, Clone, Default)]
pub struct BestPriceTracker {
    bids: LazyHeap<Decimal>,
    asks: LazyHeap<Reverse<Decimal>>,
}

impl BestPriceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a price that now has a level. Idempotent.
    pub fn insert(&mut self, side: Side, price: Decimal) {
        match side {
            Side::Buy => self.bids.push(price),
            Side::Sell => self.asks.push(price),
        }
    }

    /// Note that the level at `price` emptied.
    ///
    /// Only a price sitting at the top is dropped right away; anything deeper
    /// is discarded when a later peek reaches it.
    pub fn evict(&mut self, side: Side, price: Decimal) {
        match side {
            Side::Buy => self.bids.evict(price),
            Side::Sell => self.asks.evict(price),
        }
    }

    /// Best live price on `side`. `is_live` reports whether a non-empty level
    /// exists at a price; stale entries are discarded until one passes.
    pub fn peek_best(&mut self, side: Side, is_live: impl Fn(Decimal) -> bool) -> Option<Decimal> {
        match side {
            Side::Buy => self.bids.peek_live(is_live),
            Side::Sell => self.asks.peek_live(is_live),
        }
    }

    /// Heap entries held for `side`, stale ones included.
    pub fn tracked(&self, side: Side) -> usize {
        match side {
            Side::Buy => self.bids.len(),
            Side::Sell => self.asks.len(),
        }
    }
}
