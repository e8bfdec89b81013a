//! Metrics for feed processing.
//!
//! Counters for processed events, per-kind event errors, recorded trades and
//! crossed-market observations, plus a per-event latency histogram. Nothing
//! is exported unless the host installs a recorder.

use std::time::Instant;

use ::metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

use crate::error::ErrorKind;

// === Metric Name Constants ===

/// Per-event processing latency metric name.
pub const METRIC_EVENT_LATENCY: &str = "event_process_latency_ms";
/// Processed events counter metric name.
pub const METRIC_EVENTS: &str = "feed_events_total";
/// Event errors counter metric name.
pub const METRIC_EVENT_ERRORS: &str = "feed_event_errors_total";
/// Recorded trades counter metric name.
pub const METRIC_TRADES_RECORDED: &str = "trades_recorded_total";
/// Crossed-market observations counter metric name.
pub const METRIC_CROSSED_SIGNALS: &str = "crossed_market_signals_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_EVENT_LATENCY,
        "Time to apply one feed event to the book in milliseconds"
    );

    describe_counter!(METRIC_EVENTS, "Total number of feed rows processed");
    describe_counter!(
        METRIC_EVENT_ERRORS,
        "Total number of rejected feed rows, by error kind"
    );
    describe_counter!(
        METRIC_TRADES_RECORDED,
        "Total number of trades that passed the feasibility check"
    );
    describe_counter!(
        METRIC_CROSSED_SIGNALS,
        "Total number of mutations that left the book crossed"
    );

    debug!("Metrics initialized");
}

/// Increment processed events counter.
pub fn inc_events() {
    counter!(METRIC_EVENTS).increment(1);
}

/// Increment the error counter for one kind.
pub fn inc_event_errors(kind: ErrorKind) {
    counter!(METRIC_EVENT_ERRORS, "kind" => kind.to_string()).increment(1);
}

/// Increment recorded trades counter.
pub fn inc_trades_recorded() {
    counter!(METRIC_TRADES_RECORDED).increment(1);
}

/// Increment crossed-market counter.
pub fn inc_crossed_market_signals() {
    counter!(METRIC_CROSSED_SIGNALS).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for one feed event.
pub fn timer_event() -> LatencyTimer {
    LatencyTimer::new(METRIC_EVENT_LATENCY)
}
