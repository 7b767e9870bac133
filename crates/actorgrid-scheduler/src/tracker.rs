//! Tracker — one shared `PeerState` plus an `ActorPool` and `Placement`
//! per named pool.
//!
//! The tracker's own lock only guards the pool table. Most operations look
//! the pool up, release the table lock, and then work under the pool's
//! lock, so liveness fan-out never waits on pool-internal work.
//! `register` and `optimistically_register` are the exception: they keep
//! the table write lock while checking that no other pool holds the actor.
//! Locks are always taken table, then pool, then peers.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use actorgrid_placement::{Placement, RelocationPlan};
use actorgrid_state::{ActorPool, ActorStart, ClusterStatus, PeerState, PoolOptions};

use crate::error::{SchedulerError, SchedulerResult};

#[derive(Debug, Clone)]
struct PoolSlot {
    pool: Arc<ActorPool>,
    placement: Arc<dyn Placement>,
}

/// Aggregates liveness and every actor pool of the cluster.
#[derive(Debug)]
pub struct Tracker {
    peers: Arc<PeerState>,
    pool_options: PoolOptions,
    pools: RwLock<BTreeMap<String, PoolSlot>>,
}

impl Tracker {
    pub fn new(pool_options: PoolOptions) -> Self {
        Self {
            peers: Arc::new(PeerState::new()),
            pool_options,
            pools: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn peer_state(&self) -> &Arc<PeerState> {
        &self.peers
    }

    // ── Pools ─────────────────────────────────────────────────────

    pub fn create_actor_pool(
        &self,
        name: &str,
        placement: Arc<dyn Placement>,
    ) -> SchedulerResult<()> {
        let mut pools = self.pools.write().expect("pools lock");
        if pools.contains_key(name) {
            return Err(SchedulerError::ActorPoolAlreadyRegistered(name.to_string()));
        }
        pools.insert(
            name.to_string(),
            PoolSlot {
                pool: Arc::new(ActorPool::new(Arc::clone(&self.peers), self.pool_options)),
                placement,
            },
        );
        info!(pool = %name, "actor pool created");
        Ok(())
    }

    /// Pool names, sorted.
    pub fn pool_names(&self) -> Vec<String> {
        let pools = self.pools.read().expect("pools lock");
        pools.keys().cloned().collect()
    }

    pub fn pool(&self, name: &str) -> SchedulerResult<Arc<ActorPool>> {
        self.slot(name).map(|slot| slot.pool)
    }

    /// Name of the pool currently holding actors of `actor_type`.
    pub fn pool_by_type(&self, actor_type: &str) -> Option<String> {
        let pools = self.pools.read().expect("pools lock");
        pools
            .iter()
            .find(|(_, slot)| slot.pool.actor_type().as_deref() == Some(actor_type))
            .map(|(name, _)| name.clone())
    }

    // ── Liveness (global) ─────────────────────────────────────────

    pub fn live(&self, peer: &str) -> SchedulerResult<()> {
        Ok(self.peers.live(peer)?)
    }

    pub fn dead(&self, peer: &str) -> SchedulerResult<()> {
        Ok(self.peers.dead(peer)?)
    }

    pub fn optimistically_live(&self, peer: &str) -> SchedulerResult<()> {
        Ok(self.peers.optimistically_live(peer)?)
    }

    pub fn optimistically_dead(&self, peer: &str) -> SchedulerResult<()> {
        Ok(self.peers.optimistically_dead(peer)?)
    }

    /// Age dead peers by one reconcile cycle; see `PeerState::age_dead_peers`.
    pub fn prune_dead_peers(&self, threshold: u32) -> Vec<String> {
        self.peers.age_dead_peers(threshold)
    }

    // ── Desired state and registration (per pool) ─────────────────

    pub fn set_required(&self, pool: &str, def: &ActorStart) -> SchedulerResult<()> {
        Ok(self.pool(pool)?.set_required(def)?)
    }

    pub fn unset_required(&self, pool: &str, actor: &str) -> SchedulerResult<()> {
        Ok(self.pool(pool)?.unset_required(actor)?)
    }

    pub fn register(&self, pool: &str, def: &ActorStart, peer: &str) -> SchedulerResult<()> {
        let pools = self.pools.write().expect("pools lock");
        let target = claimable(&pools, pool, &def.name)?;
        Ok(target.register(def, peer)?)
    }

    pub fn unregister(&self, pool: &str, actor: &str) -> SchedulerResult<()> {
        Ok(self.pool(pool)?.unregister(actor)?)
    }

    pub fn optimistically_register(
        &self,
        pool: &str,
        def: &ActorStart,
        peer: &str,
    ) -> SchedulerResult<()> {
        let pools = self.pools.write().expect("pools lock");
        let target = claimable(&pools, pool, &def.name)?;
        Ok(target.optimistically_register(def, peer)?)
    }

    pub fn optimistically_unregister(&self, pool: &str, actor: &str) -> SchedulerResult<()> {
        Ok(self.pool(pool)?.optimistically_unregister(actor)?)
    }

    // ── Placement ─────────────────────────────────────────────────

    pub fn best_peer(&self, pool: &str, actor: &str) -> SchedulerResult<String> {
        let slot = self.slot(pool)?;
        Ok(slot.placement.best_peer(actor, &self.peers)?)
    }

    pub fn relocate(&self, pool: &str) -> SchedulerResult<RelocationPlan> {
        let slot = self.slot(pool)?;
        Ok(slot.placement.relocate(pool, &slot.pool, &self.peers)?)
    }

    /// Required actors without a confirmed registration, across all pools,
    /// as `(pool name, definition)` in pool then actor order.
    pub fn missing(&self) -> Vec<(String, ActorStart)> {
        let mut all = Vec::new();
        for (name, slot) in self.slots() {
            all.extend(slot.pool.missing().into_iter().map(|def| (name.clone(), def)));
        }
        debug!(missing = all.len(), "collected missing actors");
        all
    }

    /// Observability snapshot. Never feed this back into scheduling.
    pub fn status(&self) -> ClusterStatus {
        let cluster_state = self
            .slots()
            .into_iter()
            .map(|(name, slot)| (name, slot.pool.status()))
            .collect();
        ClusterStatus {
            cluster_state,
            peers: self.peers.peers(),
        }
    }

    fn slot(&self, name: &str) -> SchedulerResult<PoolSlot> {
        let pools = self.pools.read().expect("pools lock");
        pools
            .get(name)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownPoolName(name.to_string()))
    }

    fn slots(&self) -> Vec<(String, PoolSlot)> {
        let pools = self.pools.read().expect("pools lock");
        pools
            .iter()
            .map(|(name, slot)| (name.clone(), slot.clone()))
            .collect()
    }
}

/// The pool `name` if no other pool has `actor` claimed or registered.
///
/// Registrations hold the table write lock across this check and the pool
/// update, so two pools cannot claim one actor concurrently.
fn claimable<'a>(
    pools: &'a BTreeMap<String, PoolSlot>,
    name: &str,
    actor: &str,
) -> SchedulerResult<&'a ActorPool> {
    let target = pools
        .get(name)
        .ok_or_else(|| SchedulerError::UnknownPoolName(name.to_string()))?;
    let holder = pools.iter().find(|(other, slot)| {
        other.as_str() != name && slot.pool.registration(actor).peer().is_some()
    });
    if let Some((other, _)) = holder {
        return Err(SchedulerError::ActorInOtherPool {
            actor: actor.to_string(),
            pool: other.clone(),
        });
    }
    Ok(&target.pool)
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(PoolOptions::default())
    }
}
