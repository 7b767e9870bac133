//! actorgrid-state — in-memory scheduling state for ActorGrid.
//!
//! Holds everything the scheduler knows about the cluster and nothing
//! more: which peers are alive, and which actors are required, claimed,
//! or confirmed on which peer.
//!
//! # Architecture
//!
//! ```text
//! PeerState (shared, one per tracker)
//!   └── name → PeerInfo { alive, optimistic_alive, dead_cycles }
//!
//! ActorPool (one per actor type)
//!   ├── Arc<PeerState> (for strict registration checks and status)
//!   └── name → ActorEntry { def, required, Registration }
//!       Registration = Unregistered | Optimistic { peer } | Confirmed { peer }
//! ```
//!
//! Both components keep their maps private behind a `std::sync::RwLock`;
//! callers only see the method contracts. No method blocks on I/O while a
//! lock is held.

pub mod actor_pool;
pub mod error;
pub mod peer_state;
pub mod status;
pub mod types;

pub use actor_pool::ActorPool;
pub use error::{StateError, StateResult};
pub use peer_state::PeerState;
pub use status::{ActorStatus, ClusterStatus, PeerStatus, PoolStatus, fair_share};
pub use types::*;
