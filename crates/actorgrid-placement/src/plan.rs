//! Relocation plans — the diff between where actors run and where the
//! placement strategy wants them.
//!
//! A plan is computed from a snapshot and never mutates state. It may be
//! stale by the time the scheduler acts on it; the scheduler simply
//! recomputes it on its next relocation tick.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use actorgrid_state::ActorStart;

/// One actor to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    pub pool: String,
    pub def: ActorStart,
    /// Peer the actor is currently confirmed on.
    pub from: String,
    /// Peer the strategy selects now.
    pub to: String,
}

/// Balance report and relocation list for one pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationPlan {
    pub actor_type: String,
    /// Confirmed actors in the pool.
    pub total: usize,
    /// `ceil(total / live_peers)`.
    pub average: usize,
    /// Peers appearing in the plan, sorted.
    pub peers: Vec<String>,
    pub counts: BTreeMap<String, usize>,
    pub burden: BTreeMap<String, i64>,
    pub relocations: Vec<Relocation>,
}

impl RelocationPlan {
    pub fn new(actor_type: impl Into<String>, total: usize, average: usize) -> Self {
        Self {
            actor_type: actor_type.into(),
            total,
            average,
            ..Self::default()
        }
    }

    /// Record the confirmed actor count of a peer and derive its burden.
    pub fn set_count(&mut self, peer: &str, count: usize) {
        self.counts.insert(peer.to_string(), count);
        self.burden
            .insert(peer.to_string(), count as i64 - self.average as i64);
        self.peers = self.counts.keys().cloned().collect();
    }

    /// Nothing to move.
    pub fn is_empty(&self) -> bool {
        self.relocations.is_empty()
    }

    pub fn actor_names(&self) -> Vec<&str> {
        self.relocations.iter().map(|r| r.def.name.as_str()).collect()
    }
}

impl fmt::Display for RelocationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = |values: Vec<String>| values.join(", ");
        let count = joined(
            self.counts
                .iter()
                .map(|(peer, n)| format!("{peer}={n}"))
                .collect(),
        );
        let burden = joined(
            self.burden
                .iter()
                .map(|(peer, b)| format!("{peer}={b}"))
                .collect(),
        );
        write!(
            f,
            "actor-type: {}; nr-peers: {}; peers: [{}]; nr-actors: {}; target-per-peer: {}; count: {}; burden: {}",
            self.actor_type,
            self.peers.len(),
            self.peers.join(" "),
            self.total,
            self.average,
            count,
            burden,
        )
    }
}
