//! In-process cluster implementing both transport seams.
//!
//! `LocalCluster` keeps a table of simulated peers and the actors each one
//! runs. It serves as the membership feed (with the snapshot-then-stream
//! guarantee held under one lock) and as the request primitive. Tests use
//! it to inject failures; the daemon uses it for single-process runs.
//!
//! Not a network transport: nothing leaves the process.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};

use actorgrid_state::ActorStart;

use crate::transport::{
    MembershipEvent, MembershipFeed, MembershipWatch, Message, Requester, Response,
    TransportError,
};

/// Notification that a peer accepted a start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedActor {
    pub peer: String,
    pub def: ActorStart,
}

#[derive(Debug, Default)]
struct LocalPeer {
    actors: BTreeMap<String, ActorStart>,
    /// Every request to this peer fails with this error.
    failure: Option<TransportError>,
    latency: Duration,
}

#[derive(Debug, Default)]
struct ClusterInner {
    peers: BTreeMap<String, LocalPeer>,
    watchers: Vec<mpsc::UnboundedSender<MembershipEvent>>,
    mailboxes: HashMap<String, mpsc::Sender<Message>>,
    started: Vec<mpsc::UnboundedSender<StartedActor>>,
}

impl ClusterInner {
    fn broadcast(&mut self, event: MembershipEvent) {
        self.watchers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[derive(Debug, Default)]
pub struct LocalCluster {
    inner: Mutex<ClusterInner>,
}

impl LocalCluster {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Membership ────────────────────────────────────────────────

    /// Join a peer. Returns false if it was already present.
    pub fn add_peer(&self, peer: &str) -> bool {
        let mut inner = self.inner.lock().expect("cluster lock");
        if inner.peers.contains_key(peer) {
            return false;
        }
        inner.peers.insert(peer.to_string(), LocalPeer::default());
        inner.broadcast(MembershipEvent::Found(peer.to_string()));
        info!(%peer, "local peer joined");
        true
    }

    /// Drop a peer together with every actor it ran.
    pub fn lose_peer(&self, peer: &str) -> bool {
        let mut inner = self.inner.lock().expect("cluster lock");
        let Some(gone) = inner.peers.remove(peer) else {
            return false;
        };
        inner.broadcast(MembershipEvent::Lost(peer.to_string()));
        info!(%peer, actors = gone.actors.len(), "local peer lost");
        true
    }

    /// Break the feed for every current watcher.
    pub fn fail_feed(&self, reason: &str) {
        let mut inner = self.inner.lock().expect("cluster lock");
        inner.broadcast(MembershipEvent::Error(reason.to_string()));
        inner.watchers.clear();
    }

    pub fn peers(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("cluster lock");
        inner.peers.keys().cloned().collect()
    }

    // ── Fault injection ───────────────────────────────────────────

    /// Make every request to `peer` fail with `error`, or heal it with `None`.
    pub fn fail_requests(&self, peer: &str, error: Option<TransportError>) {
        let mut inner = self.inner.lock().expect("cluster lock");
        if let Some(p) = inner.peers.get_mut(peer) {
            p.failure = error;
        }
    }

    /// Delay every request to `peer`.
    pub fn set_latency(&self, peer: &str, latency: Duration) {
        let mut inner = self.inner.lock().expect("cluster lock");
        if let Some(p) = inner.peers.get_mut(peer) {
            p.latency = latency;
        }
    }

    /// Stop an actor wherever it runs, as if it crashed.
    pub fn stop_actor(&self, actor: &str) -> Option<String> {
        let mut inner = self.inner.lock().expect("cluster lock");
        inner
            .peers
            .iter_mut()
            .find_map(|(name, p)| p.actors.remove(actor).map(|_| name.clone()))
    }

    // ── Mailboxes and observation ─────────────────────────────────

    /// Route requests addressed to `name` into `tx`.
    pub fn bind_mailbox(&self, name: &str, tx: mpsc::Sender<Message>) {
        let mut inner = self.inner.lock().expect("cluster lock");
        inner.mailboxes.insert(name.to_string(), tx);
        debug!(mailbox = %name, "mailbox bound");
    }

    /// Receive a notification for every actor a peer newly starts.
    pub fn subscribe_starts(&self) -> mpsc::UnboundedReceiver<StartedActor> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().expect("cluster lock").started.push(tx);
        rx
    }

    /// Actors running on `peer`, sorted.
    pub fn actors_on(&self, peer: &str) -> Vec<String> {
        let inner = self.inner.lock().expect("cluster lock");
        inner
            .peers
            .get(peer)
            .map(|p| p.actors.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Peer currently running `actor`.
    pub fn host_of(&self, actor: &str) -> Option<String> {
        let inner = self.inner.lock().expect("cluster lock");
        inner
            .peers
            .iter()
            .find(|(_, p)| p.actors.contains_key(actor))
            .map(|(name, _)| name.clone())
    }

    pub fn num_actors(&self) -> usize {
        let inner = self.inner.lock().expect("cluster lock");
        inner.peers.values().map(|p| p.actors.len()).sum()
    }

    fn latency_of(&self, target: &str) -> Duration {
        let inner = self.inner.lock().expect("cluster lock");
        inner
            .peers
            .get(target)
            .map(|p| p.latency)
            .unwrap_or_default()
    }

    fn deliver(&self, target: &str, msg: Message) -> Result<Response, TransportError> {
        let mut inner = self.inner.lock().expect("cluster lock");

        if inner.mailboxes.contains_key(target) {
            let sent = inner.mailboxes[target].try_send(msg);
            return match sent {
                Ok(()) => Ok(Response::Ack),
                Err(TrySendError::Full(_)) => Err(TransportError::ReceiverBusy(target.to_string())),
                Err(TrySendError::Closed(_)) => {
                    inner.mailboxes.remove(target);
                    Err(TransportError::UnregisteredMailbox(target.to_string()))
                }
            };
        }

        let failure = match inner.peers.get(target) {
            Some(p) => p.failure.clone(),
            None => return Err(TransportError::UnknownMailbox(target.to_string())),
        };
        if let Some(e) = failure {
            return Err(e);
        }

        let def = match msg {
            Message::StartActor(def) => def,
            other => {
                return Err(TransportError::Rejected(format!(
                    "peer {target} cannot handle {other:?}"
                )));
            }
        };

        // An actor name runs on one peer at a time.
        let mut fresh = false;
        for (name, peer) in inner.peers.iter_mut() {
            if name == target {
                fresh = peer.actors.insert(def.name.clone(), def.clone()).is_none();
            } else {
                peer.actors.remove(&def.name);
            }
        }

        if fresh {
            debug!(peer = %target, actor = %def.name, "local actor started");
            let started = StartedActor {
                peer: target.to_string(),
                def,
            };
            inner.started.retain(|tx| tx.send(started.clone()).is_ok());
        }
        Ok(Response::Ack)
    }
}

#[async_trait]
impl MembershipFeed for LocalCluster {
    async fn query_watch(&self) -> Result<MembershipWatch, TransportError> {
        let mut inner = self.inner.lock().expect("cluster lock");
        let (tx, events) = mpsc::unbounded_channel();
        inner.watchers.push(tx);
        Ok(MembershipWatch {
            peers: inner.peers.keys().cloned().collect(),
            events,
        })
    }
}

#[async_trait]
impl Requester for LocalCluster {
    async fn request(
        &self,
        target: &str,
        msg: Message,
        timeout: Duration,
    ) -> Result<Response, TransportError> {
        let latency = self.latency_of(target);
        if !latency.is_zero() {
            if latency >= timeout {
                tokio::time::sleep(timeout).await;
                return Err(TransportError::Timeout(timeout));
            }
            tokio::time::sleep(latency).await;
        }
        self.deliver(target, msg)
    }
}
