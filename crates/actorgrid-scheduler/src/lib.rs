//! actorgrid-scheduler — keeps required actors running across peers.
//!
//! The `Tracker` aggregates one shared `PeerState` with an `ActorPool` and
//! `Placement` per pool. The `Scheduler` drives it: it follows the
//! membership feed, starts missing actors on their best peer, and
//! periodically relocates actors whose owner is no longer the best peer.
//!
//! # Architecture
//!
//! ```text
//! MembershipFeed ──Found/Lost──▶ Scheduler ──request(StartActor)──▶ Requester
//!                                  │   ▲
//!                                  │   └── status inbox ◀── PeerStatus heartbeats
//!                                  ▼
//!                               Tracker
//!                                 ├── PeerState (shared)
//!                                 └── pool name → (ActorPool, Box<dyn Placement>)
//! ```
//!
//! Transports are traits (`transport`); `memory::LocalCluster` implements
//! both for tests and single-process runs.

pub mod config;
pub mod error;
pub mod memory;
pub mod retry;
pub mod scheduler;
pub mod tracker;
pub mod transport;

pub use config::SchedulerConfig;
pub use error::{SchedulerError, SchedulerResult};
pub use memory::{LocalCluster, StartedActor};
pub use retry::{ExpBackoff, retry_fixed};
pub use scheduler::{Scheduler, StatusInbox};
pub use tracker::Tracker;
pub use transport::{
    LEADER_MAILBOX, MembershipEvent, MembershipFeed, MembershipWatch, Message, PEER_MONITOR_TYPE,
    PeerStatusMsg, Requester, Response, TransportError, peer_monitor_actor,
};
