//! Peer monitor error types.

use thiserror::Error;

use actorgrid_scheduler::TransportError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MonitorError {
    /// The monitor's start payload is not a peer name.
    #[error("invalid monitor payload: {0}")]
    InvalidPayload(String),

    #[error("unexpected actor type: {0}")]
    WrongActorType(String),

    #[error("heartbeat failed: {0}")]
    Transport(#[from] TransportError),
}

pub type MonitorResult<T> = Result<T, MonitorError>;
