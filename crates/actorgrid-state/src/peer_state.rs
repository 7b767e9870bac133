//! Peer liveness tracking.
//!
//! Every peer carries two flags. `alive` follows the membership feed and
//! is authoritative. `optimistic_alive` follows soft signals such as a
//! peer monitor reporting that it is draining, and may run ahead of the
//! feed. A peer that was never observed behaves as `(dead, dead)`.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, info};

use crate::error::{StateError, StateResult};
use crate::types::{PeerInfo, is_valid_name};

/// Liveness registry shared by every pool of a tracker.
#[derive(Debug, Default)]
pub struct PeerState {
    peers: RwLock<HashMap<String, PeerInfo>>,
}

impl PeerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the peer live, both confirmed and optimistic.
    pub fn live(&self, peer: &str) -> StateResult<()> {
        self.update(peer, |pi| {
            pi.alive = true;
            pi.optimistic_alive = true;
            pi.dead_cycles = 0;
        })
    }

    /// Mark the peer dead, both confirmed and optimistic.
    pub fn dead(&self, peer: &str) -> StateResult<()> {
        self.update(peer, |pi| {
            pi.alive = false;
            pi.optimistic_alive = false;
        })
    }

    /// Mark the peer optimistically live, leaving confirmed liveness alone.
    pub fn optimistically_live(&self, peer: &str) -> StateResult<()> {
        self.update(peer, |pi| pi.optimistic_alive = true)
    }

    /// Mark the peer optimistically dead, leaving confirmed liveness alone.
    pub fn optimistically_dead(&self, peer: &str) -> StateResult<()> {
        self.update(peer, |pi| pi.optimistic_alive = false)
    }

    /// `(confirmed, optimistic)` liveness. Unknown peers are `(false, false)`.
    pub fn state(&self, peer: &str) -> (bool, bool) {
        let peers = self.peers.read().expect("peers lock");
        peers
            .get(peer)
            .map(|pi| (pi.alive, pi.optimistic_alive))
            .unwrap_or((false, false))
    }

    /// Look up a peer that has been observed at least once.
    pub fn get(&self, peer: &str) -> StateResult<PeerInfo> {
        if !is_valid_name(peer) {
            return Err(StateError::InvalidPeerName);
        }
        let peers = self.peers.read().expect("peers lock");
        peers
            .get(peer)
            .cloned()
            .ok_or_else(|| StateError::UnknownPeerName(peer.to_string()))
    }

    /// Whether the peer has been observed at least once.
    pub fn is_known(&self, peer: &str) -> bool {
        let peers = self.peers.read().expect("peers lock");
        peers.contains_key(peer)
    }

    /// All known peers, sorted by name.
    pub fn peers(&self) -> Vec<PeerInfo> {
        let peers = self.peers.read().expect("peers lock");
        let mut all: Vec<PeerInfo> = peers.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Names of confirmed-live peers, sorted lexicographically.
    pub fn live_peers(&self) -> Vec<String> {
        let peers = self.peers.read().expect("peers lock");
        let mut live: Vec<String> = peers
            .values()
            .filter(|pi| pi.alive)
            .map(|pi| pi.name.clone())
            .collect();
        live.sort();
        live
    }

    /// Number of confirmed-live peers.
    pub fn num_live(&self) -> usize {
        let peers = self.peers.read().expect("peers lock");
        peers.values().filter(|pi| pi.alive).count()
    }

    pub fn len(&self) -> usize {
        self.peers.read().expect("peers lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Age every fully dead peer by one cycle and forget those that have
    /// been dead for more than `threshold` cycles.
    ///
    /// Returns the names of the pruned peers. A later liveness signal
    /// recreates a pruned peer from scratch.
    pub fn age_dead_peers(&self, threshold: u32) -> Vec<String> {
        let mut peers = self.peers.write().expect("peers lock");
        let mut pruned = Vec::new();

        peers.retain(|name, pi| {
            if pi.alive || pi.optimistic_alive {
                return true;
            }
            pi.dead_cycles = pi.dead_cycles.saturating_add(1);
            if pi.dead_cycles > threshold {
                pruned.push(name.clone());
                false
            } else {
                true
            }
        });

        pruned.sort();
        for name in &pruned {
            info!(peer = %name, threshold, "pruned dead peer");
        }
        pruned
    }

    fn update(&self, peer: &str, f: impl FnOnce(&mut PeerInfo)) -> StateResult<()> {
        if !is_valid_name(peer) {
            return Err(StateError::InvalidPeerName);
        }

        let mut peers = self.peers.write().expect("peers lock");
        let pi = peers
            .entry(peer.to_string())
            .or_insert_with(|| PeerInfo::new(peer));
        f(pi);
        debug!(
            %peer,
            alive = pi.alive,
            optimistic_alive = pi.optimistic_alive,
            "peer state updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_peer_is_dead_dead() {
        let ps = PeerState::new();
        assert_eq!(ps.state("p1"), (false, false));
        assert!(!ps.is_known("p1"));
    }

    #[test]
    fn live_and_dead_set_both_flags() {
        let ps = PeerState::new();
        ps.live("p1").unwrap();
        assert_eq!(ps.state("p1"), (true, true));

        ps.dead("p1").unwrap();
        assert_eq!(ps.state("p1"), (false, false));
    }

    #[test]
    fn optimistic_signals_leave_confirmed_state_alone() {
        let ps = PeerState::new();
        ps.live("p1").unwrap();

        ps.optimistically_dead("p1").unwrap();
        assert_eq!(ps.state("p1"), (true, false));

        ps.optimistically_live("p1").unwrap();
        assert_eq!(ps.state("p1"), (true, true));

        ps.dead("p1").unwrap();
        ps.optimistically_live("p1").unwrap();
        assert_eq!(ps.state("p1"), (false, true));
    }

    #[test]
    fn any_signal_creates_the_peer() {
        let ps = PeerState::new();
        ps.optimistically_dead("p1").unwrap();
        ps.dead("p2").unwrap();

        assert!(ps.is_known("p1"));
        assert!(ps.is_known("p2"));
        assert_eq!(ps.len(), 2);
    }

    #[test]
    fn empty_name_is_rejected() {
        let ps = PeerState::new();
        assert_eq!(ps.live(""), Err(StateError::InvalidPeerName));
        assert_eq!(ps.dead(""), Err(StateError::InvalidPeerName));
        assert_eq!(ps.optimistically_live(""), Err(StateError::InvalidPeerName));
        assert_eq!(ps.optimistically_dead(""), Err(StateError::InvalidPeerName));
        assert!(ps.is_empty());
    }

    #[test]
    fn get_distinguishes_invalid_and_unknown() {
        let ps = PeerState::new();
        assert_eq!(ps.get(""), Err(StateError::InvalidPeerName));
        assert_eq!(ps.get("p1"), Err(StateError::UnknownPeerName("p1".into())));

        ps.live("p1").unwrap();
        let info = ps.get("p1").unwrap();
        assert_eq!(info.name, "p1");
        assert!(info.alive);
    }

    #[test]
    fn live_peers_are_sorted_and_confirmed_only() {
        let ps = PeerState::new();
        ps.live("p3").unwrap();
        ps.live("p1").unwrap();
        ps.live("p2").unwrap();
        ps.dead("p2").unwrap();
        ps.optimistically_live("p4").unwrap();

        assert_eq!(ps.live_peers(), vec!["p1".to_string(), "p3".to_string()]);
        assert_eq!(ps.num_live(), 2);
    }

    #[test]
    fn optimistically_dead_peer_still_counts_as_live() {
        let ps = PeerState::new();
        ps.live("p1").unwrap();
        ps.optimistically_dead("p1").unwrap();
        assert_eq!(ps.live_peers(), vec!["p1".to_string()]);
        assert!(ps.get("p1").unwrap().is_draining());
    }

    #[test]
    fn dead_peers_are_pruned_after_threshold() {
        let ps = PeerState::new();
        ps.live("p1").unwrap();
        ps.live("p2").unwrap();
        ps.dead("p2").unwrap();

        assert!(ps.age_dead_peers(2).is_empty());
        assert!(ps.age_dead_peers(2).is_empty());
        assert_eq!(ps.age_dead_peers(2), vec!["p2".to_string()]);

        assert!(ps.is_known("p1"));
        assert!(!ps.is_known("p2"));
        assert_eq!(ps.state("p2"), (false, false));
    }

    #[test]
    fn live_signal_resets_dead_cycles() {
        let ps = PeerState::new();
        ps.dead("p1").unwrap();
        ps.age_dead_peers(1);
        assert_eq!(ps.get("p1").unwrap().dead_cycles, 1);

        ps.live("p1").unwrap();
        ps.dead("p1").unwrap();
        assert_eq!(ps.get("p1").unwrap().dead_cycles, 0);
        assert!(ps.age_dead_peers(1).is_empty());
    }

    #[test]
    fn optimistically_live_peer_is_not_aged() {
        let ps = PeerState::new();
        ps.dead("p1").unwrap();
        ps.optimistically_live("p1").unwrap();

        assert!(ps.age_dead_peers(0).is_empty());
        assert!(ps.is_known("p1"));
    }
}
