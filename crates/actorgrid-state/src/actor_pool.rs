//! Actor pool — the dual-phase registration ledger for one actor type.
//!
//! Each actor known to the pool carries a desired-state flag (`required`)
//! and a `Registration` phase:
//!
//! ```text
//! Unregistered ──optimistically_register──▶ Optimistic{peer}
//! Optimistic   ──register─────────────────▶ Confirmed{peer}
//! Optimistic   ──optimistically_unregister▶ Unregistered
//! Confirmed    ──register(other peer)─────▶ Confirmed{other}
//! Confirmed    ──unregister───────────────▶ Unregistered
//! ```
//!
//! A confirmed registration is authoritative: it replaces any optimistic
//! claim, and optimistic bookkeeping never downgrades it. Entries that are
//! neither required nor registered are dropped, and the pool forgets its
//! actor type once it holds no actors at all.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::peer_state::PeerState;
use crate::status::{ActorStatus, PeerStatus, PoolStatus, fair_share};
use crate::types::{ActorEntry, ActorStart, PeerInfo, PoolOptions, Registration, is_valid_name};

/// Ledger of required, optimistically registered and confirmed actors
/// of a single actor type.
#[derive(Debug)]
pub struct ActorPool {
    peers: Arc<PeerState>,
    options: PoolOptions,
    inner: RwLock<PoolInner>,
}

#[derive(Debug, Default)]
struct PoolInner {
    /// Established by the first actor; released when the pool empties.
    actor_type: Option<String>,
    actors: BTreeMap<String, ActorEntry>,
}

impl PoolInner {
    fn check_type(&self, actor_type: &str) -> StateResult<()> {
        match &self.actor_type {
            Some(expected) if expected != actor_type => Err(StateError::ActorTypeMismatch {
                expected: expected.clone(),
                actual: actor_type.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Entry for `def`, created unregistered and not required if absent.
    fn entry_for(&mut self, def: &ActorStart) -> StateResult<&mut ActorEntry> {
        self.check_type(&def.actor_type)?;
        if self.actor_type.is_none() {
            self.actor_type = Some(def.actor_type.clone());
        }
        Ok(self
            .actors
            .entry(def.name.clone())
            .or_insert_with(|| ActorEntry {
                def: def.clone(),
                required: false,
                registration: Registration::Unregistered,
            }))
    }

    /// Drop the entry if nothing references it any more.
    fn collect(&mut self, actor: &str) {
        let idle = self
            .actors
            .get(actor)
            .is_some_and(|e| !e.required && e.registration == Registration::Unregistered);
        if idle {
            self.actors.remove(actor);
        }
        if self.actors.is_empty() {
            self.actor_type = None;
        }
    }

    fn count(&self, pred: impl Fn(&Registration) -> bool) -> usize {
        self.actors.values().filter(|e| pred(&e.registration)).count()
    }
}

impl ActorPool {
    pub fn new(peers: Arc<PeerState>, options: PoolOptions) -> Self {
        Self {
            peers,
            options,
            inner: RwLock::new(PoolInner::default()),
        }
    }

    pub fn options(&self) -> PoolOptions {
        self.options
    }

    /// Actor type of this pool, if any actor has been added.
    pub fn actor_type(&self) -> Option<String> {
        self.inner.read().expect("pool lock").actor_type.clone()
    }

    // ── Desired state ─────────────────────────────────────────────

    /// Mark the actor as required. Fails if its type differs from the
    /// pool's type.
    pub fn set_required(&self, def: &ActorStart) -> StateResult<()> {
        validate_actor(&def.name)?;

        let mut inner = self.inner.write().expect("pool lock");
        let entry = inner.entry_for(def)?;
        entry.def = def.clone();
        entry.required = true;
        Ok(())
    }

    /// Remove the desired-state marking. Registration is untouched.
    pub fn unset_required(&self, actor: &str) -> StateResult<()> {
        validate_actor(actor)?;

        let mut inner = self.inner.write().expect("pool lock");
        if let Some(entry) = inner.actors.get_mut(actor) {
            entry.required = false;
        }
        inner.collect(actor);
        Ok(())
    }

    pub fn is_required(&self, actor: &str) -> bool {
        let inner = self.inner.read().expect("pool lock");
        inner.actors.get(actor).is_some_and(|e| e.required)
    }

    /// Required actors with no confirmed registration, sorted by name.
    ///
    /// An optimistic claim does not count as present; the scheduler still
    /// has to see it confirmed.
    pub fn missing(&self) -> Vec<ActorStart> {
        let inner = self.inner.read().expect("pool lock");
        inner
            .actors
            .values()
            .filter(|e| e.required && !e.registration.is_confirmed())
            .map(|e| e.def.clone())
            .collect()
    }

    // ── Registration ──────────────────────────────────────────────

    /// Record that the actor runs on `peer`.
    ///
    /// Replaces any earlier confirmed peer and clears any optimistic claim.
    pub fn register(&self, def: &ActorStart, peer: &str) -> StateResult<()> {
        validate_actor(&def.name)?;
        validate_peer(peer)?;
        self.check_peer(peer)?;

        let mut inner = self.inner.write().expect("pool lock");
        let entry = inner.entry_for(def)?;
        let previous = std::mem::replace(
            &mut entry.registration,
            Registration::Confirmed {
                peer: peer.to_string(),
            },
        );

        match previous {
            Registration::Confirmed { peer: old } if old != peer => {
                debug!(actor = %def.name, from = %old, to = %peer, "actor reassigned");
            }
            Registration::Optimistic { peer: claimed } => {
                debug!(actor = %def.name, %claimed, %peer, "optimistic claim confirmed");
            }
            _ => {}
        }
        Ok(())
    }

    /// Record that a start request for the actor is in flight to `peer`.
    ///
    /// A second claim moves the claim to the new peer. A confirmed actor
    /// keeps its confirmed registration.
    pub fn optimistically_register(&self, def: &ActorStart, peer: &str) -> StateResult<()> {
        validate_actor(&def.name)?;
        validate_peer(peer)?;
        self.check_peer(peer)?;

        let mut inner = self.inner.write().expect("pool lock");
        let entry = inner.entry_for(def)?;
        if let Registration::Confirmed { peer: confirmed } = &entry.registration {
            debug!(
                actor = %def.name,
                %confirmed,
                claimed = %peer,
                "ignoring optimistic claim on confirmed actor"
            );
            return Ok(());
        }
        entry.registration = Registration::Optimistic {
            peer: peer.to_string(),
        };
        Ok(())
    }

    /// Forget both the confirmed and the optimistic registration.
    ///
    /// Idempotent: unregistering an unknown or unregistered actor is a no-op.
    pub fn unregister(&self, actor: &str) -> StateResult<()> {
        validate_actor(actor)?;

        let mut inner = self.inner.write().expect("pool lock");
        if let Some(entry) = inner.actors.get_mut(actor) {
            entry.registration = Registration::Unregistered;
        }
        inner.collect(actor);
        Ok(())
    }

    /// Roll back an optimistic claim. A confirmed registration is untouched.
    pub fn optimistically_unregister(&self, actor: &str) -> StateResult<()> {
        validate_actor(actor)?;

        let mut inner = self.inner.write().expect("pool lock");
        if let Some(entry) = inner.actors.get_mut(actor) {
            if entry.registration.is_optimistic() {
                entry.registration = Registration::Unregistered;
            }
        }
        inner.collect(actor);
        Ok(())
    }

    /// Drop the actor entirely, whatever its state.
    pub fn remove(&self, actor: &str) -> Option<ActorEntry> {
        let mut inner = self.inner.write().expect("pool lock");
        let removed = inner.actors.remove(actor);
        inner.collect(actor);
        removed
    }

    // ── Queries ───────────────────────────────────────────────────

    pub fn registration(&self, actor: &str) -> Registration {
        let inner = self.inner.read().expect("pool lock");
        inner
            .actors
            .get(actor)
            .map(|e| e.registration.clone())
            .unwrap_or_default()
    }

    /// Peer the actor is confirmed on.
    pub fn assigned_peer(&self, actor: &str) -> StateResult<String> {
        validate_actor(actor)?;
        self.registration(actor)
            .confirmed_peer()
            .map(str::to_string)
            .ok_or_else(|| StateError::ActorNotRegistered(actor.to_string()))
    }

    pub fn is_registered(&self, actor: &str) -> bool {
        self.registration(actor).is_confirmed()
    }

    pub fn is_optimistically_registered(&self, actor: &str) -> bool {
        self.registration(actor).is_optimistic()
    }

    pub fn num_registered(&self) -> usize {
        let inner = self.inner.read().expect("pool lock");
        inner.count(Registration::is_confirmed)
    }

    pub fn num_registered_on(&self, peer: &str) -> usize {
        let inner = self.inner.read().expect("pool lock");
        inner.count(|r| r.confirmed_peer() == Some(peer))
    }

    pub fn num_optimistically_registered(&self) -> usize {
        let inner = self.inner.read().expect("pool lock");
        inner.count(Registration::is_optimistic)
    }

    pub fn num_optimistically_registered_on(&self, peer: &str) -> usize {
        let inner = self.inner.read().expect("pool lock");
        inner.count(|r| r.optimistic_peer() == Some(peer))
    }

    /// Confirmed `(actor, peer)` assignments, sorted by actor name.
    pub fn registered(&self) -> Vec<(ActorStart, String)> {
        let inner = self.inner.read().expect("pool lock");
        inner
            .actors
            .values()
            .filter_map(|e| {
                e.registration
                    .confirmed_peer()
                    .map(|peer| (e.def.clone(), peer.to_string()))
            })
            .collect()
    }

    /// Snapshot of every actor the pool knows about.
    pub fn actors(&self) -> Vec<ActorEntry> {
        let inner = self.inner.read().expect("pool lock");
        inner.actors.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("pool lock").actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reporting snapshot: per-peer counts, burden and actor locations.
    pub fn status(&self) -> PoolStatus {
        let (actor_type, actors) = {
            let inner = self.inner.read().expect("pool lock");
            (
                inner.actor_type.clone(),
                inner.actors.values().cloned().collect::<Vec<_>>(),
            )
        };

        let known = self.peers.peers();
        let by_name: HashMap<&str, &PeerInfo> =
            known.iter().map(|pi| (pi.name.as_str(), pi)).collect();
        let liveness = |peer: &str| {
            by_name
                .get(peer)
                .map(|pi| (pi.alive, pi.optimistic_alive))
                .unwrap_or((false, false))
        };

        let live = known.iter().filter(|pi| pi.alive).count();
        let total = actors
            .iter()
            .filter(|e| e.registration.is_confirmed())
            .count();
        let average = fair_share(total, live);

        let mut status = PoolStatus {
            actor_type,
            average_per_peer: average,
            ..PoolStatus::default()
        };
        for pi in &known {
            status
                .peers
                .insert(pi.name.clone(), empty_peer_status(&pi.name, pi.alive, pi.optimistic_alive));
        }

        for entry in &actors {
            let name = entry.def.name.clone();
            match &entry.registration {
                Registration::Confirmed { peer } => {
                    let (alive, opt_alive) = liveness(peer);
                    status
                        .peers
                        .entry(peer.clone())
                        .or_insert_with(|| empty_peer_status(peer, alive, opt_alive))
                        .registered
                        .push(name.clone());
                    status.registered.insert(
                        name.clone(),
                        ActorStatus {
                            peer: peer.clone(),
                            alive,
                            opt_alive,
                        },
                    );
                }
                Registration::Optimistic { peer } => {
                    let (alive, opt_alive) = liveness(peer);
                    status
                        .peers
                        .entry(peer.clone())
                        .or_insert_with(|| empty_peer_status(peer, alive, opt_alive))
                        .optimistic_registered
                        .push(name.clone());
                    status.optimistic_registered.insert(
                        name.clone(),
                        ActorStatus {
                            peer: peer.clone(),
                            alive,
                            opt_alive,
                        },
                    );
                }
                Registration::Unregistered => {}
            }
            if entry.required && !entry.registration.is_confirmed() {
                status.missing.push(name);
            }
        }

        for ps in status.peers.values_mut() {
            ps.actors = ps.registered.len();
            ps.burden = ps.actors as i64 - average as i64;
        }
        status
    }

    fn check_peer(&self, peer: &str) -> StateResult<()> {
        if self.options.strict_registration && !self.peers.is_known(peer) {
            return Err(StateError::UnknownPeerName(peer.to_string()));
        }
        Ok(())
    }
}

fn empty_peer_status(name: &str, alive: bool, opt_alive: bool) -> PeerStatus {
    PeerStatus {
        name: name.to_string(),
        alive,
        opt_alive,
        registered: Vec::new(),
        optimistic_registered: Vec::new(),
        actors: 0,
        burden: 0,
    }
}

fn validate_actor(actor: &str) -> StateResult<()> {
    if is_valid_name(actor) {
        Ok(())
    } else {
        Err(StateError::InvalidActorName)
    }
}

fn validate_peer(peer: &str) -> StateResult<()> {
    if is_valid_name(peer) {
        Ok(())
    } else {
        Err(StateError::InvalidPeerName)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(name: &str) -> ActorStart {
        ActorStart::new(name, "worker")
    }

    fn pool_with_peers(peers: &[&str]) -> (Arc<PeerState>, ActorPool) {
        let ps = Arc::new(PeerState::new());
        for p in peers {
            ps.live(p).unwrap();
        }
        let pool = ActorPool::new(Arc::clone(&ps), PoolOptions::default());
        (ps, pool)
    }

    #[test]
    fn register_clears_optimistic_claim_on_other_peer() {
        let (_ps, pool) = pool_with_peers(&["p1", "p2"]);
        let a = worker("a");

        pool.optimistically_register(&a, "p1").unwrap();
        pool.register(&a, "p2").unwrap();

        assert!(pool.is_registered("a"));
        assert!(!pool.is_optimistically_registered("a"));
        assert_eq!(pool.num_optimistically_registered_on("p1"), 0);
        assert_eq!(pool.num_registered_on("p2"), 1);
    }

    #[test]
    fn optimistic_then_confirmed_leaves_one_registration() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        let a = worker("a");

        pool.optimistically_register(&a, "p1").unwrap();
        assert_eq!(pool.num_optimistically_registered(), 1);
        assert_eq!(pool.num_registered(), 0);

        pool.register(&a, "p1").unwrap();
        assert_eq!(pool.num_registered(), 1);
        assert_eq!(pool.num_optimistically_registered(), 0);
        assert_eq!(
            pool.registration("a"),
            Registration::Confirmed { peer: "p1".into() }
        );
    }

    #[test]
    fn reregister_moves_actor_between_peers() {
        let (_ps, pool) = pool_with_peers(&["p1", "p2"]);
        let a = worker("a");

        pool.register(&a, "p1").unwrap();
        pool.register(&a, "p2").unwrap();

        assert_eq!(pool.num_registered(), 1);
        assert_eq!(pool.num_registered_on("p1"), 0);
        assert_eq!(pool.num_registered_on("p2"), 1);
        assert_eq!(pool.assigned_peer("a").unwrap(), "p2");
    }

    #[test]
    fn second_optimistic_claim_moves_instead_of_duplicating() {
        let (_ps, pool) = pool_with_peers(&["p1", "p2"]);
        let a = worker("a");

        pool.optimistically_register(&a, "p1").unwrap();
        pool.optimistically_register(&a, "p2").unwrap();

        assert_eq!(pool.num_optimistically_registered(), 1);
        assert_eq!(pool.num_optimistically_registered_on("p1"), 0);
        assert_eq!(pool.num_optimistically_registered_on("p2"), 1);
    }

    #[test]
    fn optimistic_claim_never_downgrades_confirmed() {
        let (_ps, pool) = pool_with_peers(&["p1", "p2"]);
        let a = worker("a");

        pool.register(&a, "p1").unwrap();
        pool.optimistically_register(&a, "p2").unwrap();
        assert_eq!(pool.assigned_peer("a").unwrap(), "p1");
        assert_eq!(pool.num_optimistically_registered(), 0);

        pool.optimistically_unregister("a").unwrap();
        assert!(pool.is_registered("a"));
    }

    #[test]
    fn unregister_is_definitive_and_idempotent() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        let a = worker("a");
        pool.set_required(&a).unwrap();
        pool.register(&a, "p1").unwrap();

        pool.unregister("a").unwrap();
        assert!(!pool.is_registered("a"));
        assert!(!pool.is_optimistically_registered("a"));

        pool.unregister("a").unwrap();
        assert!(!pool.is_registered("a"));
        assert_eq!(pool.missing(), vec![a]);
    }

    #[test]
    fn unregister_clears_optimistic_claim_too() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        pool.optimistically_register(&worker("a"), "p1").unwrap();

        pool.unregister("a").unwrap();
        assert!(!pool.is_optimistically_registered("a"));
        assert!(pool.is_empty());
    }

    #[test]
    fn missing_ignores_optimistic_claims() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        let a = worker("a");
        let b = worker("b");
        pool.set_required(&a).unwrap();
        pool.set_required(&b).unwrap();

        pool.optimistically_register(&a, "p1").unwrap();
        assert_eq!(pool.missing(), vec![a.clone(), b.clone()]);

        pool.register(&a, "p1").unwrap();
        assert_eq!(pool.missing(), vec![b]);
    }

    #[test]
    fn optimistic_unregister_rolls_back_claim() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        let a = worker("a");
        pool.set_required(&a).unwrap();
        pool.optimistically_register(&a, "p1").unwrap();

        pool.optimistically_unregister("a").unwrap();
        assert_eq!(pool.registration("a"), Registration::Unregistered);
        assert!(pool.is_required("a"));
    }

    #[test]
    fn unset_required_keeps_registration() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        let a = worker("a");
        pool.set_required(&a).unwrap();
        pool.register(&a, "p1").unwrap();

        pool.unset_required("a").unwrap();
        assert!(!pool.is_required("a"));
        assert!(pool.is_registered("a"));
        assert!(pool.missing().is_empty());
    }

    #[test]
    fn idle_entries_are_dropped_and_type_released() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        pool.set_required(&worker("a")).unwrap();
        assert_eq!(pool.actor_type().as_deref(), Some("worker"));

        pool.unset_required("a").unwrap();
        assert!(pool.is_empty());
        assert_eq!(pool.actor_type(), None);

        pool.set_required(&ActorStart::new("r", "reader")).unwrap();
        assert_eq!(pool.actor_type().as_deref(), Some("reader"));
    }

    #[test]
    fn type_mismatch_is_rejected() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        pool.set_required(&worker("a")).unwrap();

        let reader = ActorStart::new("b", "reader");
        assert!(matches!(
            pool.set_required(&reader),
            Err(StateError::ActorTypeMismatch { .. })
        ));
        assert!(matches!(
            pool.register(&reader, "p1"),
            Err(StateError::ActorTypeMismatch { .. })
        ));
        assert!(matches!(
            pool.optimistically_register(&reader, "p1"),
            Err(StateError::ActorTypeMismatch { .. })
        ));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let (_ps, pool) = pool_with_peers(&["p1"]);

        assert_eq!(pool.set_required(&worker("")), Err(StateError::InvalidActorName));
        assert_eq!(pool.register(&worker(""), "p1"), Err(StateError::InvalidActorName));
        assert_eq!(pool.register(&worker("a"), ""), Err(StateError::InvalidPeerName));
        assert_eq!(
            pool.optimistically_register(&worker("a"), ""),
            Err(StateError::InvalidPeerName)
        );
        assert_eq!(pool.unregister(""), Err(StateError::InvalidActorName));
        assert_eq!(pool.optimistically_unregister(""), Err(StateError::InvalidActorName));
        assert_eq!(pool.unset_required(""), Err(StateError::InvalidActorName));
    }

    #[test]
    fn strict_pool_rejects_unknown_peer() {
        let (_ps, pool) = pool_with_peers(&["p1"]);

        assert_eq!(
            pool.register(&worker("a"), "ghost"),
            Err(StateError::UnknownPeerName("ghost".into()))
        );
        assert_eq!(
            pool.optimistically_register(&worker("a"), "ghost"),
            Err(StateError::UnknownPeerName("ghost".into()))
        );
        assert!(pool.is_empty());
    }

    #[test]
    fn lenient_pool_accepts_unknown_peer() {
        let ps = Arc::new(PeerState::new());
        let pool = ActorPool::new(
            Arc::clone(&ps),
            PoolOptions {
                strict_registration: false,
            },
        );

        pool.register(&worker("a"), "ghost").unwrap();
        assert_eq!(pool.assigned_peer("a").unwrap(), "ghost");
        assert_eq!(ps.state("ghost"), (false, false));
    }

    #[test]
    fn strict_pool_accepts_peer_observed_dead() {
        let (ps, pool) = pool_with_peers(&[]);
        ps.dead("p1").unwrap();
        pool.register(&worker("a"), "p1").unwrap();
        assert!(pool.is_registered("a"));
    }

    #[test]
    fn assigned_peer_requires_confirmation() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        pool.optimistically_register(&worker("a"), "p1").unwrap();

        assert_eq!(
            pool.assigned_peer("a"),
            Err(StateError::ActorNotRegistered("a".into()))
        );
    }

    #[test]
    fn dead_peer_does_not_unregister_actor() {
        let (ps, pool) = pool_with_peers(&["p1"]);
        pool.register(&worker("a"), "p1").unwrap();

        ps.dead("p1").unwrap();
        assert!(pool.is_registered("a"));
    }

    #[test]
    fn remove_drops_actor_in_any_state() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        pool.set_required(&worker("a")).unwrap();
        pool.register(&worker("a"), "p1").unwrap();

        let removed = pool.remove("a").unwrap();
        assert!(removed.required);
        assert!(pool.is_empty());
        assert!(pool.remove("a").is_none());
    }

    #[test]
    fn registered_lists_confirmed_assignments_only() {
        let (_ps, pool) = pool_with_peers(&["p1", "p2"]);
        pool.register(&worker("b"), "p2").unwrap();
        pool.register(&worker("a"), "p1").unwrap();
        pool.optimistically_register(&worker("c"), "p1").unwrap();

        let assigned: Vec<(String, String)> = pool
            .registered()
            .into_iter()
            .map(|(def, peer)| (def.name, peer))
            .collect();
        assert_eq!(
            assigned,
            vec![("a".into(), "p1".into()), ("b".into(), "p2".into())]
        );
    }

    #[test]
    fn set_required_keeps_existing_registration() {
        let (_ps, pool) = pool_with_peers(&["p1"]);
        pool.register(&worker("a"), "p1").unwrap();
        pool.set_required(&worker("a").with_data(b"v2".to_vec()))
            .unwrap();

        assert!(pool.is_registered("a"));
        assert_eq!(pool.actors()[0].def.data, b"v2".to_vec());
    }

    #[test]
    fn status_reports_burden_against_average() {
        let (ps, pool) = pool_with_peers(&["p1", "p2"]);
        pool.register(&worker("a"), "p1").unwrap();
        pool.register(&worker("b"), "p1").unwrap();
        pool.register(&worker("c"), "p1").unwrap();
        pool.optimistically_register(&worker("d"), "p2").unwrap();
        pool.set_required(&worker("e")).unwrap();
        ps.optimistically_dead("p2").unwrap();

        let status = pool.status();
        assert_eq!(status.actor_type.as_deref(), Some("worker"));
        assert_eq!(status.average_per_peer, 2);

        let p1 = &status.peers["p1"];
        assert_eq!(p1.actors, 3);
        assert_eq!(p1.burden, 1);
        let p2 = &status.peers["p2"];
        assert_eq!(p2.actors, 0);
        assert_eq!(p2.burden, -2);
        assert_eq!(p2.optimistic_registered, vec!["d".to_string()]);
        assert!(p2.alive);
        assert!(!p2.opt_alive);

        assert_eq!(status.registered["a"].peer, "p1");
        assert!(!status.optimistic_registered["d"].opt_alive);
        assert_eq!(status.missing, vec!["e".to_string()]);
    }

    #[test]
    fn status_without_live_peers_has_zero_average() {
        let ps = Arc::new(PeerState::new());
        let pool = ActorPool::new(
            Arc::clone(&ps),
            PoolOptions {
                strict_registration: false,
            },
        );
        pool.register(&worker("a"), "gone").unwrap();

        let status = pool.status();
        assert_eq!(status.average_per_peer, 0);
        assert_eq!(status.peers["gone"].burden, 1);
        assert!(!status.registered["a"].alive);
    }
}
