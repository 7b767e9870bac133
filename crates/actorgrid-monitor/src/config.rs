//! Peer monitor timing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use actorgrid_scheduler::LEADER_MAILBOX;

/// Heartbeat cadence and shutdown bounds. Durations in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Delay before the first heartbeat of each state.
    pub first_tick_ms: u64,
    pub heartbeat_interval_ms: u64,
    /// Time spent in `Finishing` before exiting, heartbeat or not.
    pub grace_ms: u64,
    /// Bound on a single heartbeat request.
    pub status_timeout_ms: u64,
    pub leader_mailbox: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            first_tick_ms: 1_000,
            heartbeat_interval_ms: 20_000,
            grace_ms: 5_000,
            status_timeout_ms: 5_000,
            leader_mailbox: LEADER_MAILBOX.to_string(),
        }
    }
}

impl MonitorConfig {
    pub fn first_tick(&self) -> Duration {
        Duration::from_millis(self.first_tick_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms.max(1))
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }
}
