//! ActorGrid placement — decides which peer owns an actor.
//!
//! Placement is pure with respect to scheduling state: strategies read a
//! `PeerState` and an `ActorPool` and return decisions, they never mutate
//! either. The scheduler acts on the result.
//!
//! # Components
//!
//! - **`hash`** — FNV-1 64-bit hashing of actor names
//! - **`placement`** — the `Placement` trait and `HashPlacement`
//! - **`plan`** — `RelocationPlan`, the diff between current and desired assignment

pub mod error;
pub mod hash;
pub mod placement;
pub mod plan;

pub use error::{PlacementError, PlacementResult};
pub use hash::fnv1_64;
pub use placement::{HashPlacement, Placement};
pub use plan::{Relocation, RelocationPlan};
