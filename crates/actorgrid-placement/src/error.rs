//! Error types for placement decisions.

use thiserror::Error;

/// Result type alias for placement operations.
pub type PlacementResult<T> = Result<T, PlacementError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlacementError {
    /// No confirmed-live peer to place on. The scheduler defers the actor
    /// to its next reconciliation tick.
    #[error("no live peers")]
    Empty,
}
