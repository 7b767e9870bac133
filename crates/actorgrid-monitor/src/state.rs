//! States, letters and the transition table of the peer monitor.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    Running,
    Finishing,
    /// Terminal.
    Exiting,
}

impl MonitorState {
    pub fn is_terminal(self) -> bool {
        self == Self::Exiting
    }
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "running",
            Self::Finishing => "finishing",
            Self::Exiting => "exiting",
        })
    }
}

/// Outcome of a state's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    /// Cancelled, or the grace window ran out.
    Exit,
    /// The monitor cannot do its job.
    Failure,
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exit => "exit",
            Self::Failure => "failure",
        })
    }
}

/// Next state, or `None` when `state` accepts no letters.
pub fn transition(state: MonitorState, letter: Letter) -> Option<MonitorState> {
    use Letter::*;
    use MonitorState::*;

    match (state, letter) {
        (Running, Exit) => Some(Finishing),
        (Running, Failure) => Some(Exiting),
        (Finishing, Exit | Failure) => Some(Exiting),
        (Exiting, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_drains_through_finishing() {
        assert_eq!(
            transition(MonitorState::Running, Letter::Exit),
            Some(MonitorState::Finishing)
        );
        assert_eq!(
            transition(MonitorState::Finishing, Letter::Exit),
            Some(MonitorState::Exiting)
        );
    }

    #[test]
    fn failure_always_exits() {
        assert_eq!(
            transition(MonitorState::Running, Letter::Failure),
            Some(MonitorState::Exiting)
        );
        assert_eq!(
            transition(MonitorState::Finishing, Letter::Failure),
            Some(MonitorState::Exiting)
        );
    }

    #[test]
    fn exiting_is_terminal() {
        assert!(MonitorState::Exiting.is_terminal());
        assert!(!MonitorState::Running.is_terminal());
        assert_eq!(transition(MonitorState::Exiting, Letter::Exit), None);
        assert_eq!(transition(MonitorState::Exiting, Letter::Failure), None);
    }

    #[test]
    fn states_render_lowercase() {
        assert_eq!(MonitorState::Finishing.to_string(), "finishing");
        assert_eq!(Letter::Failure.to_string(), "failure");
    }
}
