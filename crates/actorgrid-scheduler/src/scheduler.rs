//! Scheduler — the reconciliation loop.
//!
//! One `Scheduler` per process. `run` consumes it and multiplexes:
//! - membership events (Found → live + monitor start, Lost → dead)
//! - peer status heartbeats from the status inbox
//! - the reconcile tick (start missing actors)
//! - the relocation tick (move misplaced actors)
//! - shutdown
//!
//! The loop is level-triggered: a failed start is logged and retried on a
//! later tick until the actor is confirmed or no longer required.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use actorgrid_placement::PlacementError;
use actorgrid_state::ActorStart;

use crate::config::SchedulerConfig;
use crate::error::{SchedulerError, SchedulerResult};
use crate::retry::{ExpBackoff, retry_fixed};
use crate::tracker::Tracker;
use crate::transport::{
    MembershipEvent, MembershipFeed, Message, PeerStatusMsg, Requester, Response,
    TransportError, peer_monitor_actor,
};

/// Sender half of the scheduler's heartbeat inbox.
pub type StatusInbox = mpsc::Sender<PeerStatusMsg>;

const STATUS_INBOX_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy)]
struct StartFailure {
    attempts: u32,
    retry_at: Instant,
}

pub struct Scheduler {
    tracker: Arc<Tracker>,
    requester: Arc<dyn Requester>,
    feed: Arc<dyn MembershipFeed>,
    config: SchedulerConfig,
    backoff: ExpBackoff,
    status_tx: mpsc::Sender<PeerStatusMsg>,
    status_rx: mpsc::Receiver<PeerStatusMsg>,
    /// Consecutive start failures per actor name.
    failures: HashMap<String, StartFailure>,
    /// Acked but unconfirmed starts, when acks do not confirm.
    pending: HashMap<String, Instant>,
    monitors: JoinSet<()>,
}

impl Scheduler {
    pub fn new(
        tracker: Arc<Tracker>,
        requester: Arc<dyn Requester>,
        feed: Arc<dyn MembershipFeed>,
        config: SchedulerConfig,
    ) -> Self {
        let (status_tx, status_rx) = mpsc::channel(STATUS_INBOX_CAPACITY);
        Self {
            tracker,
            requester,
            feed,
            config,
            backoff: ExpBackoff::default(),
            status_tx,
            status_rx,
            failures: HashMap::new(),
            pending: HashMap::new(),
            monitors: JoinSet::new(),
        }
    }

    /// Replace the backoff applied between failed starts of one actor.
    pub fn with_backoff(mut self, backoff: ExpBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    /// Where peer monitors deliver their heartbeats.
    pub fn status_inbox(&self) -> StatusInbox {
        self.status_tx.clone()
    }

    /// Run until shutdown (`Ok`) or a membership feed failure (`Err`).
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> SchedulerResult<()> {
        if *shutdown.borrow() {
            return Ok(());
        }

        let query_timeout = self.config.query_timeout();
        let membership = tokio::select! {
            res = tokio::time::timeout(query_timeout, self.feed.query_watch()) => match res {
                Ok(Ok(membership)) => membership,
                Ok(Err(e)) => {
                    error!(error = %e, "membership query failed");
                    return Err(SchedulerError::Feed(e.to_string()));
                }
                Err(_) => {
                    error!(timeout = ?query_timeout, "membership query timed out");
                    return Err(SchedulerError::Feed(format!(
                        "query timed out after {query_timeout:?}"
                    )));
                }
            },
            _ = shutdown.changed() => return Ok(()),
        };

        info!(peers = membership.peers.len(), "found current peers");
        for peer in &membership.peers {
            info!(%peer, "found existing peer");
            self.peer_found(peer);
        }
        let mut events = membership.events;

        let mut reconcile = tokio::time::interval(self.config.reconcile_interval());
        reconcile.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut relocate = self.config.relocate_interval().map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        info!(
            reconcile_ms = self.config.reconcile_interval_ms,
            relocate_ms = self.config.relocate_interval_ms,
            "scheduler running"
        );

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("scheduler shutting down");
                    break;
                }
                event = events.recv() => match event {
                    Some(MembershipEvent::Found(peer)) => {
                        info!(%peer, "peer found");
                        self.peer_found(&peer);
                    }
                    Some(MembershipEvent::Lost(peer)) => {
                        info!(%peer, "peer lost");
                        if let Err(e) = self.tracker.dead(&peer) {
                            warn!(%peer, error = %e, "ignoring lost event");
                        }
                    }
                    Some(MembershipEvent::Error(reason)) => {
                        error!(%reason, "fatal membership feed error");
                        return Err(SchedulerError::Feed(reason));
                    }
                    None => {
                        error!("membership feed closed");
                        return Err(SchedulerError::Feed("membership feed closed".into()));
                    }
                },
                Some(status) = self.status_rx.recv() => self.handle_peer_status(status),
                _ = reconcile.tick() => {
                    tokio::select! {
                        _ = self.reconcile_once() => {}
                        _ = shutdown.changed() => {
                            info!("scheduler shutting down mid-reconcile");
                            break;
                        }
                    }
                }
                _ = next_tick(&mut relocate) => {
                    tokio::select! {
                        _ = self.relocate_once() => {}
                        _ = shutdown.changed() => {
                            info!("scheduler shutting down mid-relocation");
                            break;
                        }
                    }
                }
                Some(joined) = self.monitors.join_next(), if !self.monitors.is_empty() => {
                    if let Err(e) = joined {
                        if !e.is_cancelled() {
                            warn!(error = %e, "peer monitor start task failed");
                        }
                    }
                }
            }
        }

        self.monitors.abort_all();
        Ok(())
    }

    /// Start every missing actor once, honouring per-actor backoff.
    pub async fn reconcile_once(&mut self) {
        if self.config.prune_dead_after_cycles > 0 {
            self.tracker
                .prune_dead_peers(self.config.prune_dead_after_cycles);
        }

        let missing = self.tracker.missing();
        self.failures
            .retain(|name, _| missing.iter().any(|(_, def)| &def.name == name));
        self.pending
            .retain(|name, _| missing.iter().any(|(_, def)| &def.name == name));
        if missing.is_empty() {
            return;
        }
        debug!(missing = missing.len(), "reconciling missing actors");

        for (pool, def) in missing {
            if self.awaiting_confirmation(&pool, &def) {
                continue;
            }
            if let Some(failure) = self.failures.get(&def.name) {
                if Instant::now() < failure.retry_at {
                    debug!(actor = %def.name, attempts = failure.attempts, "start backing off");
                    continue;
                }
            }

            match self.start_actor(&pool, &def).await {
                Ok(Some(peer)) => {
                    self.failures.remove(&def.name);
                    self.start_acknowledged(&def.name);
                    debug!(actor = %def.name, %peer, "start acknowledged");
                }
                Ok(None) => {}
                Err(SchedulerError::Placement(PlacementError::Empty)) => {
                    debug!(actor = %def.name, %pool, "no live peers, deferring start");
                }
                Err(e) => self.record_failure(&pool, &def, &e),
            }
        }
    }

    /// Move every actor whose owner differs from its best peer.
    pub async fn relocate_once(&mut self) {
        for pool in self.tracker.pool_names() {
            let plan = match self.tracker.relocate(&pool) {
                Ok(plan) => plan,
                Err(SchedulerError::Placement(PlacementError::Empty)) => {
                    debug!(%pool, "no live peers, skipping relocation");
                    continue;
                }
                Err(e) => {
                    warn!(%pool, error = %e, "relocation planning failed");
                    continue;
                }
            };
            if plan.is_empty() {
                debug!(%pool, %plan, "no relocations");
                continue;
            }
            info!(%pool, %plan, "relocating actors");

            for relocation in plan.relocations {
                let name = relocation.def.name.as_str();
                // The plan may be stale by now.
                let current = self
                    .tracker
                    .pool(&pool)
                    .ok()
                    .and_then(|p| p.assigned_peer(name).ok());
                if current.as_deref() != Some(relocation.from.as_str()) {
                    debug!(actor = %name, from = %relocation.from, "relocation superseded");
                    continue;
                }

                info!(actor = %name, from = %relocation.from, to = %relocation.to, "relocating actor");
                if let Err(e) = self.tracker.unregister(&pool, name) {
                    warn!(actor = %name, error = %e, "failed to unregister for relocation");
                    continue;
                }
                match self.start_actor(&pool, &relocation.def).await {
                    Ok(Some(_)) => self.start_acknowledged(name),
                    Ok(None) => {}
                    Err(e) => self.record_failure(&pool, &relocation.def, &e),
                }
            }
        }
    }

    /// Place one actor: claim optimistically, request the start, then
    /// confirm or roll back. `Ok(None)` means deferred to a later tick.
    async fn start_actor(&self, pool: &str, def: &ActorStart) -> SchedulerResult<Option<String>> {
        let peer = self.tracker.best_peer(pool, &def.name)?;
        let (_, optimistic) = self.tracker.peer_state().state(&peer);
        if !optimistic {
            debug!(actor = %def.name, %peer, "best peer is draining, deferring start");
            return Ok(None);
        }

        info!(actor = %def.name, %pool, %peer, "starting actor");
        self.tracker.optimistically_register(pool, def, &peer)?;

        let timeout = self.config.actor_start_timeout();
        let response = tokio::time::timeout(
            timeout,
            self.requester
                .request(&peer, Message::StartActor(def.clone()), timeout),
        )
        .await
        .unwrap_or(Err(TransportError::Timeout(timeout)));

        match response {
            Ok(Response::Ack) => {
                if self.config.confirm_on_ack {
                    self.tracker.register(pool, def, &peer)?;
                }
                Ok(Some(peer))
            }
            Err(e) => {
                self.tracker.optimistically_unregister(pool, &def.name)?;
                Err(e.into())
            }
        }
    }

    /// Without ack confirmation, an acked start waits in `pending` for an
    /// external `register` until the start timeout runs out.
    fn start_acknowledged(&mut self, actor: &str) {
        if !self.config.confirm_on_ack {
            self.pending.insert(actor.to_string(), Instant::now());
        }
    }

    /// An acked start still waiting for external confirmation. Claims older
    /// than the start timeout are rolled back so the actor is retried.
    fn awaiting_confirmation(&mut self, pool: &str, def: &ActorStart) -> bool {
        let claimed = self
            .tracker
            .pool(pool)
            .is_ok_and(|p| p.is_optimistically_registered(&def.name));
        if !claimed {
            self.pending.remove(&def.name);
            return false;
        }

        let fresh = self
            .pending
            .get(&def.name)
            .is_some_and(|since| since.elapsed() < self.config.actor_start_timeout());
        if fresh {
            return true;
        }

        warn!(actor = %def.name, %pool, "start never confirmed, rolling back claim");
        self.pending.remove(&def.name);
        if let Err(e) = self.tracker.optimistically_unregister(pool, &def.name) {
            warn!(actor = %def.name, error = %e, "failed to roll back claim");
        }
        false
    }

    fn record_failure(&mut self, pool: &str, def: &ActorStart, e: &SchedulerError) {
        let now = Instant::now();
        let failure = self.failures.entry(def.name.clone()).or_insert(StartFailure {
            attempts: 0,
            retry_at: now,
        });
        failure.attempts += 1;
        let delay = self.backoff.delay(failure.attempts);
        failure.retry_at = now + delay;
        warn!(
            actor = %def.name,
            %pool,
            error = %e,
            attempts = failure.attempts,
            retry_in = ?delay,
            "actor start failed"
        );
    }

    fn peer_found(&mut self, peer: &str) {
        if let Err(e) = self.tracker.live(peer) {
            warn!(%peer, error = %e, "ignoring found event");
            return;
        }
        if !self.config.start_monitors {
            return;
        }

        let requester = Arc::clone(&self.requester);
        let peer = peer.to_string();
        let def = peer_monitor_actor(&peer);
        let attempts = self.config.monitor_start_attempts;
        let backoff = self.config.monitor_start_backoff();
        let timeout = self.config.actor_start_timeout();

        self.monitors.spawn(async move {
            let result = retry_fixed(attempts, backoff, |attempt| {
                let requester = Arc::clone(&requester);
                let msg = Message::StartActor(def.clone());
                let peer = peer.clone();
                async move {
                    debug!(%peer, attempt, "starting peer monitor");
                    tokio::time::timeout(timeout, requester.request(&peer, msg, timeout))
                        .await
                        .unwrap_or(Err(TransportError::Timeout(timeout)))
                }
            })
            .await;

            match result {
                Ok(_) => info!(%peer, "peer monitor started"),
                Err(e) => warn!(%peer, error = %e, "failed to start peer monitor"),
            }
        });
    }

    fn handle_peer_status(&self, status: PeerStatusMsg) {
        let result = if status.stopping {
            info!(peer = %status.peer, "peer draining");
            self.tracker.optimistically_dead(&status.peer)
        } else {
            debug!(peer = %status.peer, "peer heartbeat");
            self.tracker.optimistically_live(&status.peer)
        };
        if let Err(e) = result {
            warn!(peer = %status.peer, error = %e, "ignoring peer status");
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
