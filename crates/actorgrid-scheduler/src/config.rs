//! Scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use actorgrid_state::PoolOptions;

/// Timing and policy knobs of the scheduler. All durations in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Period of the missing-actor reconciliation tick.
    pub reconcile_interval_ms: u64,
    /// Period of relocation planning. `0` disables relocation.
    pub relocate_interval_ms: u64,
    pub actor_start_timeout_ms: u64,
    pub query_timeout_ms: u64,
    pub monitor_start_attempts: u32,
    pub monitor_start_backoff_ms: u64,
    /// Reject registrations onto peers never observed.
    pub strict_registration: bool,
    /// Promote an optimistic claim to confirmed when the start is acked.
    pub confirm_on_ack: bool,
    /// Forget peers dead for more than this many reconcile ticks. `0` never prunes.
    pub prune_dead_after_cycles: u32,
    /// Start a peer monitor on every peer that joins.
    pub start_monitors: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_ms: 2_000,
            relocate_interval_ms: 30_000,
            actor_start_timeout_ms: 10_000,
            query_timeout_ms: 2_000,
            monitor_start_attempts: 3,
            monitor_start_backoff_ms: 5_000,
            strict_registration: true,
            confirm_on_ack: true,
            prune_dead_after_cycles: 0,
            start_monitors: true,
        }
    }
}

impl SchedulerConfig {
    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_millis(self.reconcile_interval_ms.max(1))
    }

    pub fn relocate_interval(&self) -> Option<Duration> {
        (self.relocate_interval_ms > 0).then(|| Duration::from_millis(self.relocate_interval_ms))
    }

    pub fn actor_start_timeout(&self) -> Duration {
        Duration::from_millis(self.actor_start_timeout_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn monitor_start_backoff(&self) -> Duration {
        Duration::from_millis(self.monitor_start_backoff_ms)
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            strict_registration: self.strict_registration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_timeouts() {
        let config = SchedulerConfig::default();
        assert_eq!(config.actor_start_timeout(), Duration::from_secs(10));
        assert_eq!(config.query_timeout(), Duration::from_secs(2));
        assert_eq!(config.monitor_start_attempts, 3);
        assert_eq!(config.monitor_start_backoff(), Duration::from_secs(5));
        assert!(config.pool_options().strict_registration);
    }

    #[test]
    fn zero_relocate_interval_disables_relocation() {
        let config = SchedulerConfig {
            relocate_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.relocate_interval(), None);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"reconcile_interval_ms": 250}"#).unwrap();
        assert_eq!(config.reconcile_interval(), Duration::from_millis(250));
        assert_eq!(config.relocate_interval_ms, 30_000);
    }
}
