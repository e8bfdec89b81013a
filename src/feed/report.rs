//! Error tally for the end-of-run report.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ErrorKind, FeedError};

/// Count of rejected events per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTally {
    counts: BTreeMap<ErrorKind, u64>,
}

impl ErrorTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one error.
    pub fn record(&mut self, error: &FeedError) {
        *self.counts.entry(error.kind()).or_insert(0) += 1;
    }

    /// Errors recorded for `kind`.
    pub fn count(&self, kind: ErrorKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Errors recorded overall.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Kinds seen at least once with their counts, in report order.
    pub fn iter(&self) -> impl Iterator<Item = (ErrorKind, u64)> + '_ {
        self.counts.iter().map(|(kind, count)| (*kind, *count))
    }
}

impl fmt::Display for ErrorTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERRORS:")?;
        for (kind, count) in self.iter() {
            writeln!(f, "{},{}", kind.code(), count)?;
        }
        Ok(())
    }
}
