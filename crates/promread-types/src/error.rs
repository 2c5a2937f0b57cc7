//! Error types for query construction.

use thiserror::Error;

/// Result type alias for query construction.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors that can occur while building a query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The matcher cannot be mapped to a wire matcher.
    #[error("invalid matcher: {0}")]
    InvalidMatcher(String),
}
