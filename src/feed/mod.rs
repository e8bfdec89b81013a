//! Feed processing module.
//!
//! This module handles:
//! - Classifying CSV rows into book events and dispatching them
//! - Writing midquotes, snapshots, trade prints and the error report
//! - The row loop with periodic snapshots and the end-of-stream check

pub mod dispatch;
pub mod processor;
pub mod report;
pub mod sink;

pub use dispatch::{apply, classify, dispatch, FeedEvent};
pub use processor::{FeedProcessor, RunSummary};
pub use report::ErrorTally;
pub use sink::{format_price, OutputSink};
