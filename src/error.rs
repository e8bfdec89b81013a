//! Unified error types for the feed processor.

use std::fmt;

use rust_decimal::Decimal;
use strum::{Display, EnumIter};
use thiserror::Error;

use crate::book::OrderId;

/// Fatal errors that stop a run.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// CSV reader error that cannot be attributed to a single row.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-event errors. None of these stop the stream; each is tallied and
/// processing resumes with the next row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// Row does not match any recognized event shape.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Order is missing its id or side, or has a negative price or a
    /// non-positive quantity.
    #[error("invalid order {order_id}: missing or invalid data")]
    InvalidOrder {
        /// Id carried by the rejected order (0 when blank).
        order_id: OrderId,
    },

    /// Add targets an id that is already resting.
    #[error("duplicate order {order_id}")]
    DuplicateOrder {
        /// The duplicated id.
        order_id: OrderId,
    },

    /// Remove targets an id that is not resting.
    #[error("order {order_id} does not exist")]
    OrderNotFound {
        /// The unknown id.
        order_id: OrderId,
    },

    /// Trade cannot be covered by resting sell-side liquidity.
    #[error("cannot match trade {quantity}@{price}: {reason}")]
    TradeNotMatched {
        /// Trade price.
        price: Decimal,
        /// Trade quantity.
        quantity: i64,
        /// Why matching failed.
        reason: MatchFailure,
    },

    /// The book crossed at least once but no trade was ever reported.
    #[error("expected at least {signals} trade(s), but got none")]
    BestPriceButNoTrade {
        /// Number of crossed-market observations.
        signals: u64,
    },
}

impl FeedError {
    /// Fieldless kind used for tallying and metrics labels.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedError::InvalidMessage(_) => ErrorKind::InvalidMessage,
            FeedError::InvalidOrder { .. } => ErrorKind::InvalidOrder,
            FeedError::DuplicateOrder { .. } => ErrorKind::DuplicateOrder,
            FeedError::OrderNotFound { .. } => ErrorKind::OrderNotFound,
            FeedError::TradeNotMatched { .. } => ErrorKind::TradeNotMatched,
            FeedError::BestPriceButNoTrade { .. } => ErrorKind::BestPriceButNoTrade,
        }
    }
}

/// Reason a trade failed the feasibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFailure {
    /// No resting sell order is priced at or below the trade price.
    NoCandidates,
    /// Candidates exist but their combined quantity is below the trade quantity.
    InsufficientQuantity {
        /// Combined candidate quantity.
        available: i64,
    },
}

impl fmt::Display for MatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchFailure::NoCandidates => f.write_str("no candidates"),
            MatchFailure::InsufficientQuantity { .. } => f.write_str("insufficient quantity"),
        }
    }
}

/// Error kinds in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// See [`FeedError::InvalidMessage`].
    InvalidMessage,
    /// See [`FeedError::DuplicateOrder`].
    DuplicateOrder,
    /// See [`FeedError::TradeNotMatched`].
    TradeNotMatched,
    /// See [`FeedError::OrderNotFound`].
    OrderNotFound,
    /// See [`FeedError::BestPriceButNoTrade`].
    BestPriceButNoTrade,
    /// See [`FeedError::InvalidOrder`].
    InvalidOrder,
}

impl ErrorKind {
    /// Single-letter code used in the `ERRORS:` report.
    pub fn code(&self) -> char {
        match self {
            ErrorKind::InvalidMessage => 'a',
            ErrorKind::DuplicateOrder => 'b',
            ErrorKind::TradeNotMatched => 'c',
            ErrorKind::OrderNotFound => 'd',
            ErrorKind::BestPriceButNoTrade => 'e',
            ErrorKind::InvalidOrder => 'f',
        }
    }
}

/// Convenient Result type alias for fatal errors.
pub type Result<T> = std::result::Result<T, AppError>;
