//! The peer monitor task.
//!
//! Every wait point races the state's exit condition: cancellation in
//! `Running`, the grace deadline in `Finishing`. A heartbeat that hangs
//! or fails never holds up a transition.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, info, warn};

use actorgrid_scheduler::{Message, PEER_MONITOR_TYPE, PeerStatusMsg, Requester, TransportError};
use actorgrid_state::ActorStart;

use crate::config::MonitorConfig;
use crate::error::{MonitorError, MonitorResult};
use crate::state::{Letter, MonitorState, transition};

pub struct PeerMonitor {
    /// Actor name, `peer-monitor-<peer>`.
    name: String,
    peer: String,
    requester: Arc<dyn Requester>,
    config: MonitorConfig,
}

impl PeerMonitor {
    pub fn new(peer: &str, requester: Arc<dyn Requester>, config: MonitorConfig) -> Self {
        Self {
            name: format!("{PEER_MONITOR_TYPE}-{peer}"),
            peer: peer.to_string(),
            requester,
            config,
        }
    }

    /// Build the monitor a peer was asked to start. The payload is the
    /// peer name.
    pub fn from_start(
        def: &ActorStart,
        requester: Arc<dyn Requester>,
        config: MonitorConfig,
    ) -> MonitorResult<Self> {
        if def.actor_type != PEER_MONITOR_TYPE {
            return Err(MonitorError::WrongActorType(def.actor_type.clone()));
        }
        let peer = String::from_utf8(def.data.clone())
            .map_err(|e| MonitorError::InvalidPayload(e.to_string()))?;
        Ok(Self {
            name: def.name.clone(),
            peer,
            requester,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Drive the state machine to its terminal state.
    ///
    /// `shutdown` flipping to `true` (or its sender going away) cancels
    /// `Running`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> MonitorState {
        let mut state = MonitorState::Running;
        info!(monitor = %self.name, peer = %self.peer, %state, "peer monitor starting");

        while !state.is_terminal() {
            let letter = match state {
                MonitorState::Running => self.running(&mut shutdown).await,
                MonitorState::Finishing => self.finishing().await,
                MonitorState::Exiting => break,
            };
            let Some(next) = transition(state, letter) else {
                break;
            };
            info!(monitor = %self.name, from = %state, %letter, to = %next, "switched to state");
            state = next;
        }
        state
    }

    async fn running(&self, shutdown: &mut watch::Receiver<bool>) -> Letter {
        if self.peer.is_empty() {
            error!(monitor = %self.name, "no peer to report on");
            return Letter::Failure;
        }

        let mut next = Instant::now() + self.config.first_tick();
        loop {
            tokio::select! {
                _ = cancelled(shutdown) => return Letter::Exit,
                _ = sleep_until(next) => {
                    tokio::select! {
                        res = self.send_status(false) => self.log_send(res),
                        _ = cancelled(shutdown) => return Letter::Exit,
                    }
                    next = Instant::now() + self.config.heartbeat_interval();
                }
            }
        }
    }

    async fn finishing(&self) -> Letter {
        let deadline = Instant::now() + self.config.grace();
        let mut next = Instant::now() + self.config.first_tick();
        loop {
            tokio::select! {
                _ = sleep_until(deadline) => return Letter::Exit,
                _ = sleep_until(next) => {
                    tokio::select! {
                        res = self.send_status(true) => self.log_send(res),
                        _ = sleep_until(deadline) => return Letter::Exit,
                    }
                    next = Instant::now() + self.config.heartbeat_interval();
                }
            }
        }
    }

    async fn send_status(&self, stopping: bool) -> MonitorResult<()> {
        let timeout = self.config.status_timeout();
        let msg = Message::PeerStatus(PeerStatusMsg {
            peer: self.peer.clone(),
            stopping,
        });
        tokio::time::timeout(
            timeout,
            self.requester
                .request(&self.config.leader_mailbox, msg, timeout),
        )
        .await
        .unwrap_or(Err(TransportError::Timeout(timeout)))?;
        Ok(())
    }

    fn log_send(&self, res: MonitorResult<()>) {
        match res {
            Ok(()) => debug!(monitor = %self.name, "peer status sent"),
            Err(e) => warn!(monitor = %self.name, error = %e, "failed to inform leader of peer status"),
        }
    }
}

/// Resolves once `shutdown` is `true` or its sender is gone.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
