//! Placement strategies.
//!
//! A strategy answers two questions for one pool: which peer should own a
//! given actor, and which registered actors currently sit on the wrong
//! peer. `HashPlacement` is the default; a burden-aware strategy can slot
//! in behind the same trait without touching the tracker or scheduler.

use std::fmt;

use tracing::debug;

use actorgrid_state::{ActorPool, PeerState, fair_share};

use crate::error::{PlacementError, PlacementResult};
use crate::hash::pick;
use crate::plan::{Relocation, RelocationPlan};

pub trait Placement: fmt::Debug + Send + Sync {
    /// Owning peer for `actor` among the currently live peers.
    fn best_peer(&self, actor: &str, peers: &PeerState) -> PlacementResult<String>;

    /// Plan moves for every confirmed actor of `pool` whose owner differs
    /// from `best_peer`. Does not mutate anything.
    fn relocate(
        &self,
        pool_name: &str,
        pool: &ActorPool,
        peers: &PeerState,
    ) -> PlacementResult<RelocationPlan>;
}

/// Modulo hashing of the actor name over the sorted confirmed-live peers.
///
/// Deterministic for a fixed live set and independent of map iteration
/// order. Peers that are draining (live but optimistically dead) still
/// count here; avoiding them for new starts is the scheduler's call.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashPlacement;

impl HashPlacement {
    pub fn new() -> Self {
        Self
    }
}

impl Placement for HashPlacement {
    fn best_peer(&self, actor: &str, peers: &PeerState) -> PlacementResult<String> {
        let live = peers.live_peers();
        pick(actor, &live)
            .map(str::to_string)
            .ok_or(PlacementError::Empty)
    }

    fn relocate(
        &self,
        pool_name: &str,
        pool: &ActorPool,
        peers: &PeerState,
    ) -> PlacementResult<RelocationPlan> {
        let actor_type = pool.actor_type().unwrap_or_default();
        let registered = pool.registered();
        if registered.is_empty() {
            return Ok(RelocationPlan::new(actor_type, 0, 0));
        }

        let live = peers.live_peers();
        if live.is_empty() {
            return Err(PlacementError::Empty);
        }

        let average = fair_share(registered.len(), live.len());
        let mut plan = RelocationPlan::new(actor_type, registered.len(), average);

        let mut counts = live
            .iter()
            .map(|p| (p.clone(), 0usize))
            .collect::<std::collections::BTreeMap<_, _>>();
        for (def, owner) in registered {
            *counts.entry(owner.clone()).or_default() += 1;

            let Some(target) = pick(&def.name, &live) else {
                continue;
            };
            if target != owner {
                plan.relocations.push(Relocation {
                    pool: pool_name.to_string(),
                    def,
                    from: owner,
                    to: target.to_string(),
                });
            }
        }
        for (peer, count) in &counts {
            plan.set_count(peer, *count);
        }

        debug!(
            pool = pool_name,
            total = plan.total,
            average = plan.average,
            relocations = plan.relocations.len(),
            "relocation plan computed"
        );
        Ok(plan)
    }
}
