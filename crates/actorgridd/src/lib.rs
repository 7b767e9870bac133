//! actorgridd — runs the ActorGrid control plane in one process.
//!
//! The peers of the cluster are simulated in memory; everything else
//! (tracker, scheduler, peer monitors) is the production code path.

pub mod config;
pub mod node;

pub use config::{ClusterConfig, DaemonConfig, PoolConfig};
pub use node::Node;
