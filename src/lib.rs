//! Limit order book reconstruction from a CSV market data feed.
//!
//! The feed carries order events (add, modify, remove) and reported trades.
//! Each row is applied to an [`OrderBook`](book::OrderBook), after which the
//! midquote is written; periodic snapshots of the book, trade prints and a
//! per-kind error report complete the output.
//!
//! ```text
//! A,100000,S,1,1075      add sell 1 @ 1075
//! A,100001,B,9,1000      add buy 9 @ 1000
//! M,100001,B,5,1000      reduce to 5
//! T,2,1025               trade 2 @ 1025
//! X,100000,S,1,1075      remove
//! ```
//!
//! # Modules
//!
//! - [`book`]: Orders, price levels, best-price tracking and trade matching
//! - [`feed`]: Row classification, the processing loop and output
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`metrics`]: Counters and latency histograms

pub mod book;
pub mod config;
pub mod error;
pub mod feed;
pub mod metrics;

pub use config::Config;
pub use error::{AppError, FeedError, Result};
