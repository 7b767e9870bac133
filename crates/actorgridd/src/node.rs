//! Assembles a single-process cluster: the simulated peers, the tracker,
//! the scheduler and a peer monitor for every monitor actor a peer starts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use actorgrid_monitor::{MonitorConfig, MonitorState, PeerMonitor};
use actorgrid_placement::HashPlacement;
use actorgrid_scheduler::{
    LEADER_MAILBOX, LocalCluster, MembershipFeed, Message, PEER_MONITOR_TYPE, Requester,
    Scheduler, StartedActor, StatusInbox, Tracker,
};
use actorgrid_state::ActorStart;

use crate::config::DaemonConfig;

const LEADER_MAILBOX_CAPACITY: usize = 64;

pub struct Node {
    cluster: Arc<LocalCluster>,
    tracker: Arc<Tracker>,
    scheduler: Scheduler,
    monitor: MonitorConfig,
}

impl Node {
    pub fn build(config: &DaemonConfig) -> anyhow::Result<Self> {
        let cluster = Arc::new(LocalCluster::new());
        for peer in &config.cluster.peers {
            cluster.add_peer(peer);
        }

        let tracker = Arc::new(Tracker::new(config.scheduler.pool_options()));
        for pool in &config.pools {
            tracker.create_actor_pool(&pool.name, Arc::new(HashPlacement::new()))?;
            for actor in &pool.actors {
                tracker.set_required(&pool.name, &ActorStart::new(actor, &pool.actor_type))?;
            }
            info!(pool = %pool.name, actor_type = %pool.actor_type, actors = pool.actors.len(), "pool configured");
        }

        let scheduler = Scheduler::new(
            Arc::clone(&tracker),
            Arc::clone(&cluster) as Arc<dyn Requester>,
            Arc::clone(&cluster) as Arc<dyn MembershipFeed>,
            config.scheduler.clone(),
        );

        Ok(Self {
            cluster,
            tracker,
            scheduler,
            monitor: config.monitor.clone(),
        })
    }

    pub fn cluster(&self) -> Arc<LocalCluster> {
        Arc::clone(&self.cluster)
    }

    pub fn tracker(&self) -> Arc<Tracker> {
        Arc::clone(&self.tracker)
    }

    /// Run until `shutdown` flips. Returns once the scheduler stopped and
    /// every peer monitor reached its terminal state.
    pub async fn run(
        self,
        shutdown: watch::Receiver<bool>,
        status_interval: Option<Duration>,
    ) -> anyhow::Result<()> {
        let Node {
            cluster,
            tracker,
            scheduler,
            monitor,
        } = self;

        let (leader_tx, leader_rx) = mpsc::channel(LEADER_MAILBOX_CAPACITY);
        cluster.bind_mailbox(LEADER_MAILBOX, leader_tx);
        let bridge = tokio::spawn(forward_to_leader(leader_rx, scheduler.status_inbox()));

        let starts = cluster.subscribe_starts();
        let monitors = tokio::spawn(run_monitors(
            starts,
            Arc::clone(&cluster) as Arc<dyn Requester>,
            monitor,
            shutdown.clone(),
        ));

        let status = status_interval.map(|every| {
            tokio::spawn(report_status(Arc::clone(&tracker), every, shutdown.clone()))
        });

        let result = scheduler.run(shutdown).await;

        // The scheduler owns the receiving end of the status inbox.
        bridge.abort();
        if let Some(status) = status {
            if let Err(e) = status.await {
                warn!(error = %e, "status reporter failed");
            }
        }
        if let Err(e) = monitors.await {
            warn!(error = %e, "peer monitor supervisor failed");
        }

        result?;
        info!("node stopped");
        Ok(())
    }
}

/// Moves heartbeats from the leader mailbox into the scheduler.
async fn forward_to_leader(mut rx: mpsc::Receiver<Message>, inbox: StatusInbox) {
    while let Some(msg) = rx.recv().await {
        match msg {
            Message::PeerStatus(status) => {
                if inbox.send(status).await.is_err() {
                    debug!("scheduler gone, dropping peer status");
                    return;
                }
            }
            other => warn!(message = ?other, "leader mailbox ignoring message"),
        }
    }
}

/// Spawns a `PeerMonitor` for each monitor actor started on a peer, then
/// waits for all of them after shutdown.
async fn run_monitors(
    mut starts: mpsc::UnboundedReceiver<StartedActor>,
    requester: Arc<dyn Requester>,
    config: MonitorConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut tasks = JoinSet::new();
    let monitor_shutdown = shutdown.clone();
    loop {
        tokio::select! {
            started = starts.recv() => {
                let Some(StartedActor { peer, def }) = started else { break };
                if def.actor_type != PEER_MONITOR_TYPE {
                    continue;
                }
                match PeerMonitor::from_start(&def, Arc::clone(&requester), config.clone()) {
                    Ok(monitor) => {
                        info!(%peer, monitor = %monitor.name(), "peer monitor spawned");
                        tasks.spawn(monitor.run(monitor_shutdown.clone()));
                    }
                    Err(e) => warn!(%peer, actor = %def.name, error = %e, "invalid peer monitor start"),
                }
            }
            _ = stopped(&mut shutdown) => break,
        }
    }

    while let Some(res) = tasks.join_next().await {
        match res {
            Ok(MonitorState::Exiting) => {}
            Ok(state) => warn!(%state, "peer monitor stopped early"),
            Err(e) => warn!(error = %e, "peer monitor task failed"),
        }
    }
}

/// One JSON line per pool on every interval.
async fn report_status(tracker: Arc<Tracker>, every: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for line in tracker.status().lines() {
                    info!(status = %line, "cluster status");
                }
            }
            _ = stopped(&mut shutdown) => return,
        }
    }
}

/// Resolves once `shutdown` is `true` or its sender is gone.
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
