//! Domain types for peers, actors and registrations.
//!
//! Everything here is plain data. The locking lives in `PeerState` and
//! `ActorPool`; these types are what those components hand out as
//! snapshots.

use serde::{Deserialize, Serialize};

/// Name of a peer (worker node) in the cluster.
pub type PeerName = String;

/// Name of an actor. Unique across the whole cluster; it is also the
/// placement hash key.
pub type ActorName = String;

// ── Actor definition ───────────────────────────────────────────────

/// Instructs a peer to instantiate a named actor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActorStart {
    pub name: ActorName,
    /// Actor type; decides which pool owns the actor.
    #[serde(rename = "type")]
    pub actor_type: String,
    /// Opaque payload handed to the actor on start.
    #[serde(default)]
    pub data: Vec<u8>,
}

impl ActorStart {
    pub fn new(name: impl Into<String>, actor_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actor_type: actor_type.into(),
            data: Vec::new(),
        }
    }

    /// Attach a start payload.
    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }
}

// ── Peer ──────────────────────────────────────────────────────────

/// Liveness record for one peer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeerInfo {
    pub name: PeerName,
    /// Authoritative liveness from the membership feed.
    pub alive: bool,
    /// Soft liveness from heartbeats; may run ahead of `alive`.
    pub optimistic_alive: bool,
    /// Reconciliation cycles this peer has spent fully dead.
    #[serde(default)]
    pub dead_cycles: u32,
}

impl PeerInfo {
    /// A freshly observed peer starts `(dead, dead)`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alive: false,
            optimistic_alive: false,
            dead_cycles: 0,
        }
    }

    /// Confirmed live but reporting that it is going away.
    pub fn is_draining(&self) -> bool {
        self.alive && !self.optimistic_alive
    }
}

// ── Registration ──────────────────────────────────────────────────

/// Registration phase of an actor within its pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Registration {
    #[default]
    Unregistered,
    /// A start request is in flight; not yet proof the actor runs.
    Optimistic { peer: PeerName },
    /// The actor is known to run on `peer`.
    Confirmed { peer: PeerName },
}

impl Registration {
    /// Peer referenced by this registration, if any.
    pub fn peer(&self) -> Option<&str> {
        match self {
            Self::Unregistered => None,
            Self::Optimistic { peer } | Self::Confirmed { peer } => Some(peer),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    pub fn is_optimistic(&self) -> bool {
        matches!(self, Self::Optimistic { .. })
    }

    pub fn confirmed_peer(&self) -> Option<&str> {
        match self {
            Self::Confirmed { peer } => Some(peer),
            _ => None,
        }
    }

    pub fn optimistic_peer(&self) -> Option<&str> {
        match self {
            Self::Optimistic { peer } => Some(peer),
            _ => None,
        }
    }
}

/// Snapshot of one actor known to a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorEntry {
    pub def: ActorStart,
    /// Desired state: the scheduler keeps this actor running.
    pub required: bool,
    pub registration: Registration,
}

impl ActorEntry {
    pub fn name(&self) -> &str {
        &self.def.name
    }
}

// ── Options ───────────────────────────────────────────────────────

/// Behaviour switches for an `ActorPool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolOptions {
    /// Reject registrations onto peers never observed by `PeerState`.
    pub strict_registration: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            strict_registration: true,
        }
    }
}

/// Peer and actor names must be non-empty.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_peer_accessors() {
        let unregistered = Registration::Unregistered;
        assert_eq!(unregistered.peer(), None);
        assert!(!unregistered.is_confirmed());

        let optimistic = Registration::Optimistic { peer: "p1".into() };
        assert_eq!(optimistic.peer(), Some("p1"));
        assert_eq!(optimistic.optimistic_peer(), Some("p1"));
        assert_eq!(optimistic.confirmed_peer(), None);

        let confirmed = Registration::Confirmed { peer: "p2".into() };
        assert!(confirmed.is_confirmed());
        assert_eq!(confirmed.confirmed_peer(), Some("p2"));
        assert_eq!(confirmed.optimistic_peer(), None);
    }

    #[test]
    fn actor_start_serializes_type_field() {
        let def = ActorStart::new("wrkr01", "worker").with_data(b"cfg".to_vec());
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "worker");
        assert_eq!(json["name"], "wrkr01");

        let back: ActorStart = serde_json::from_value(json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn registration_is_tagged_by_phase() {
        let json = serde_json::to_value(Registration::Confirmed { peer: "p1".into() }).unwrap();
        assert_eq!(json["phase"], "confirmed");
        assert_eq!(json["peer"], "p1");
    }

    #[test]
    fn draining_means_confirmed_live_but_optimistically_dead() {
        let mut info = PeerInfo::new("p1");
        assert!(!info.is_draining());
        info.alive = true;
        info.optimistic_alive = true;
        assert!(!info.is_draining());
        info.optimistic_alive = false;
        assert!(info.is_draining());
    }

    #[test]
    fn empty_names_are_invalid() {
        assert!(!is_valid_name(""));
        assert!(is_valid_name("p1"));
    }
}
