//! Error types for the ActorGrid scheduling state.

use thiserror::Error;

/// Result type alias for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors returned by `PeerState` and `ActorPool`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid actor name")]
    InvalidActorName,

    #[error("invalid peer name")]
    InvalidPeerName,

    #[error("actor type mismatch: pool holds {expected:?}, got {actual:?}")]
    ActorTypeMismatch { expected: String, actual: String },

    #[error("unknown peer name: {0}")]
    UnknownPeerName(String),

    #[error("actor not registered: {0}")]
    ActorNotRegistered(String),
}

impl StateError {
    /// Caller misuse: the request can never succeed as issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidActorName | Self::InvalidPeerName | Self::ActorTypeMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(StateError::InvalidActorName.is_validation());
        assert!(StateError::InvalidPeerName.is_validation());
        assert!(
            StateError::ActorTypeMismatch {
                expected: "worker".into(),
                actual: "reader".into(),
            }
            .is_validation()
        );
        assert!(!StateError::UnknownPeerName("p1".into()).is_validation());
        assert!(!StateError::ActorNotRegistered("a".into()).is_validation());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = StateError::UnknownPeerName("peer-9".into());
        assert_eq!(err.to_string(), "unknown peer name: peer-9");
    }
}
