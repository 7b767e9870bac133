//! Scheduler error types.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur during scheduling operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("unknown pool name: {0}")]
    UnknownPoolName(String),

    #[error("actor pool already registered: {0}")]
    ActorPoolAlreadyRegistered(String),

    /// Actor names are unique across pools.
    #[error("actor {actor} already held by pool {pool}")]
    ActorInOtherPool { actor: String, pool: String },

    #[error("state error: {0}")]
    State(#[from] actorgrid_state::StateError),

    #[error("placement error: {0}")]
    Placement(#[from] actorgrid_placement::PlacementError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The membership feed failed; the scheduler cannot continue.
    #[error("membership feed error: {0}")]
    Feed(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
