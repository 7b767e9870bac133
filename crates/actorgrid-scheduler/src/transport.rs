//! Transport seams: the membership feed, the request primitive and the
//! messages that travel over it.
//!
//! The scheduler never talks to a network directly. Production wiring
//! plugs a real RPC layer in behind `Requester` and a coordination service
//! behind `MembershipFeed`; `memory::LocalCluster` implements both in
//! process.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use actorgrid_state::ActorStart;

/// Actor type of the per-peer heartbeat monitor.
pub const PEER_MONITOR_TYPE: &str = "peer-monitor";

/// Mailbox the scheduler receives peer status on.
pub const LEADER_MAILBOX: &str = "leader";

/// Start definition of the monitor actor for `peer`.
///
/// Named `peer-monitor-<peer>`; the payload carries the peer name.
pub fn peer_monitor_actor(peer: &str) -> ActorStart {
    ActorStart::new(format!("{PEER_MONITOR_TYPE}-{peer}"), PEER_MONITOR_TYPE)
        .with_data(peer.as_bytes().to_vec())
}

// ── Messages ──────────────────────────────────────────────────────

/// Heartbeat from a peer monitor to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerStatusMsg {
    pub peer: String,
    /// The peer is shutting down and should not receive new actors.
    pub stopping: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Message {
    /// Ask a peer to instantiate an actor.
    StartActor(ActorStart),
    PeerStatus(PeerStatusMsg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Ack,
}

// ── Errors ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The target mailbox was never bound.
    #[error("unregistered mailbox: {0}")]
    UnregisteredMailbox(String),

    /// The target is not in the registry.
    #[error("unknown mailbox: {0}")]
    UnknownMailbox(String),

    /// The target exists but its inbox is full.
    #[error("receiver busy: {0}")]
    ReceiverBusy(String),

    #[error("connection unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The target handled the request and refused it.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl TransportError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

// ── Seams ─────────────────────────────────────────────────────────

/// Incremental membership change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipEvent {
    Found(String),
    Lost(String),
    /// The feed broke; no further events follow.
    Error(String),
}

/// Peers present at subscription time plus every change after it.
#[derive(Debug)]
pub struct MembershipWatch {
    pub peers: Vec<String>,
    pub events: mpsc::UnboundedReceiver<MembershipEvent>,
}

#[async_trait]
pub trait MembershipFeed: Send + Sync {
    /// Snapshot the current peers and subscribe to changes.
    ///
    /// Implementations must not lose an event between the snapshot and the
    /// start of the stream.
    async fn query_watch(&self) -> Result<MembershipWatch, TransportError>;
}

#[async_trait]
pub trait Requester: Send + Sync {
    /// Deliver `msg` to a peer or mailbox and wait for the response.
    async fn request(
        &self,
        target: &str,
        msg: Message,
        timeout: Duration,
    ) -> Result<Response, TransportError>;
}
