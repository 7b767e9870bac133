//! Daemon configuration (`actorgrid.toml`).

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use actorgrid_monitor::MonitorConfig;
use actorgrid_scheduler::SchedulerConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DaemonConfig {
    pub scheduler: SchedulerConfig,
    pub monitor: MonitorConfig,
    pub pools: Vec<PoolConfig>,
    pub cluster: ClusterConfig,
}

/// One actor pool and the actors it must keep running.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolConfig {
    pub name: String,
    pub actor_type: String,
    #[serde(default)]
    pub actors: Vec<String>,
}

/// Peers simulated in-process.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClusterConfig {
    #[serde(default)]
    pub peers: Vec<String>,
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: DaemonConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject configurations the tracker would refuse at startup.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut pools = BTreeSet::new();
        let mut actors = BTreeSet::new();
        for pool in &self.pools {
            if pool.name.is_empty() {
                bail!("pool with empty name");
            }
            if pool.actor_type.is_empty() {
                bail!("pool {} has no actor type", pool.name);
            }
            if !pools.insert(pool.name.as_str()) {
                bail!("duplicate pool {}", pool.name);
            }
            for actor in &pool.actors {
                if !actors.insert(actor.as_str()) {
                    bail!("actor {actor} listed twice");
                }
            }
        }

        let mut peers = BTreeSet::new();
        for peer in &self.cluster.peers {
            if peer.is_empty() {
                bail!("empty peer name");
            }
            if !peers.insert(peer.as_str()) {
                bail!("duplicate peer {peer}");
            }
        }
        Ok(())
    }
}
