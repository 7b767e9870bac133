//! Reporting-only snapshots of scheduling state.
//!
//! Nothing here feeds back into scheduling; the structures are built
//! under the owning locks and then handed out as plain data for logs and
//! operators.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::PeerInfo;

/// Target number of actors per live peer: `ceil(total / live_peers)`.
///
/// Returns 0 when there are no live peers.
pub fn fair_share(total: usize, live_peers: usize) -> usize {
    if live_peers == 0 {
        return 0;
    }
    total.div_ceil(live_peers)
}

/// Per-peer view inside one pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeerStatus {
    pub name: String,
    pub alive: bool,
    pub opt_alive: bool,
    /// Actors confirmed on this peer.
    #[serde(rename = "actors_reg")]
    pub registered: Vec<String>,
    /// Actors with a start request in flight to this peer.
    #[serde(rename = "actors_opt_reg")]
    pub optimistic_registered: Vec<String>,
    #[serde(rename = "actors_cnt")]
    pub actors: usize,
    /// Confirmed actors above (positive) or below the pool average.
    pub burden: i64,
}

/// Where an actor sits and whether that peer is alive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorStatus {
    pub peer: String,
    pub alive: bool,
    pub opt_alive: bool,
}

/// Snapshot of a single actor pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PoolStatus {
    pub actor_type: Option<String>,
    #[serde(rename = "ave_actors_peer")]
    pub average_per_peer: usize,
    pub peers: BTreeMap<String, PeerStatus>,
    pub registered: BTreeMap<String, ActorStatus>,
    pub optimistic_registered: BTreeMap<String, ActorStatus>,
    /// Required actors without a confirmed registration.
    pub missing: Vec<String>,
}

/// Snapshot of every pool plus the shared peer liveness table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClusterStatus {
    pub cluster_state: BTreeMap<String, PoolStatus>,
    pub peers: Vec<PeerInfo>,
}

impl ClusterStatus {
    /// One JSON document per pool, for line-oriented logs.
    pub fn lines(&self) -> Vec<String> {
        #[derive(Serialize)]
        struct Line<'a> {
            pool_name: &'a str,
            state: &'a PoolStatus,
        }

        let mut lines = Vec::with_capacity(self.cluster_state.len());
        for (pool_name, state) in &self.cluster_state {
            match serde_json::to_string(&Line { pool_name, state }) {
                Ok(line) => lines.push(line),
                Err(e) => return vec![format!(r#"{{"cluster_state":"marshal_error={e}"}}"#)],
            }
        }
        lines
    }
}

impl fmt::Display for ClusterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(e) => write!(f, r#"{{"cluster_state":"marshal_error={e}"}}"#),
        }
    }
}
