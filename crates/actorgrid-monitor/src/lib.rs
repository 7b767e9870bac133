//! actorgrid-monitor — heartbeat monitor run on every peer.
//!
//! A `PeerMonitor` reports its peer's status to the scheduler's leader
//! mailbox faster than the coordination service would notice a departure.
//! It is a small finite-state machine:
//!
//! ```text
//! Running ──Exit────▶ Finishing ──Exit/Failure──▶ Exiting
//!    └──────Failure──────────────────────────────▶ Exiting
//! ```
//!
//! `Running` sends `stopping = false` heartbeats until cancelled.
//! `Finishing` sends `stopping = true` heartbeats and always leaves after
//! the grace window. `Exiting` is terminal.

pub mod config;
pub mod error;
pub mod monitor;
pub mod state;

pub use config::MonitorConfig;
pub use error::{MonitorError, MonitorResult};
pub use monitor::PeerMonitor;
pub use state::{Letter, MonitorState, transition};
