//! Bounded-retry readiness poller for the backend execution environment.
//!
//! Asks the bridge once per interval until the environment reports ready,
//! reports an error, or the attempt budget runs out. Bridge failures are
//! swallowed and count as an attempt. No sleep follows the final attempt.

use crate::bridge::{BackendBridge, BridgeResult};
use crate::config::PollTimings;
use crate::models::EnvStatus;
use crate::ui::controller::{ShellEvent, ShellSender};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessStatus {
    Pending,
    Ready,
    Error(String),
    TimedOut,
}

/// Progress of one readiness poll. Only ever advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessPollState {
    pub attempt: u32,
    pub max_attempts: u32,
    pub status: ReadinessStatus,
}

impl ReadinessPollState {
    pub fn new(max_attempts: u32) -> Self {
        ReadinessPollState { attempt: 0, max_attempts: max_attempts.max(1), status: ReadinessStatus::Pending }
    }

    pub fn is_finished(&self) -> bool {
        self.status != ReadinessStatus::Pending
    }

    /// Fold one attempt's outcome into the state.
    pub fn record(&mut self, outcome: BridgeResult<EnvStatus>) -> &ReadinessStatus {
        if self.is_finished() {
            return &self.status;
        }
        self.attempt += 1;

        match outcome {
            Ok(EnvStatus { ready: true, .. }) => self.status = ReadinessStatus::Ready,
            Ok(EnvStatus { error: Some(message), .. }) => self.status = ReadinessStatus::Error(message),
            Ok(_) => {}
            Err(e) => log::debug!("[Readiness] Attempt {} failed: {}", self.attempt, e),
        }

        if self.status == ReadinessStatus::Pending && self.attempt >= self.max_attempts {
            self.status = ReadinessStatus::TimedOut;
        }
        &self.status
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadinessEvent {
    Started,
    Finished(ReadinessPollState),
}

/// Handle to a running readiness poll
pub struct ReadinessHandle {
    join: JoinHandle<ReadinessPollState>,
}

impl ReadinessHandle {
    /// Wait for the poll to finish and return its final state.
    pub async fn join(self) -> Option<ReadinessPollState> {
        self.join.await.ok()
    }

    pub fn abort(&self) {
        self.join.abort();
    }
}

/// Start polling in the background. Progress is reported as `ShellEvent::Readiness`.
pub fn spawn(bridge: Arc<dyn BackendBridge>, timings: &PollTimings, events: ShellSender) -> ReadinessHandle {
    let interval = timings.readiness_interval();
    let max_attempts = timings.readiness_max_attempts;

    let join = tokio::spawn(async move {
        log::info!("[Readiness] Polling environment (max {} attempts)", max_attempts);
        let _ = events.send(ShellEvent::Readiness(ReadinessEvent::Started));

        let mut state = ReadinessPollState::new(max_attempts);
        loop {
            let outcome = bridge.get_environment_ready().await;
            if state.record(outcome) != &ReadinessStatus::Pending {
                break;
            }
            tokio::time::sleep(interval).await;
        }

        log::info!("[Readiness] Finished after {} attempt(s): {:?}", state.attempt, state.status);
        let _ = events.send(ShellEvent::Readiness(ReadinessEvent::Finished(state.clone())));
        state
    });

    ReadinessHandle { join }
}
