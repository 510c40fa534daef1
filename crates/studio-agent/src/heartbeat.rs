use std::sync::Arc;
use std::time::Duration;

use studio_core::{ProjectId, SessionId};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::SessionApi;

/// Periodic fire-and-forget heartbeats for one project.
///
/// The first beat fires one `period` after `start`. Failures are logged and
/// retried on the next tick. Dropping the timer stops it.
pub struct HeartbeatTimer {
    project_id: ProjectId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl HeartbeatTimer {
    /// Spawn the timer task on the current tokio runtime.
    pub fn start(
        api: Arc<dyn SessionApi>,
        project_id: ProjectId,
        session_id: SessionId,
        period: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let first = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        match api.heartbeat(project_id, &session_id).await {
                            Ok(_) => debug!(project_id, session_id = %session_id, "heartbeat sent"),
                            Err(e) => warn!(project_id, session_id = %session_id, error = %e, "heartbeat failed"),
                        }
                    }
                }
            }
        });
        Self {
            project_id,
            cancel,
            handle,
        }
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Stop beating. Safe to call any number of times.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }
}

impl Drop for HeartbeatTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
