//! The session coordinator: turns store state into ownership decisions.
//!
//! Locking is advisory. `register` never blocks waiting for another owner; it
//! either takes ownership or reports who holds it. Expired sessions are swept
//! at the start of every operation, so a silent tab loses ownership after
//! `SESSION_TIMEOUT` without any background task.

use studio_core::{
    Ack, CheckOutcome, Clock, Ownership, ProjectId, RegisterOutcome, SessionId, StudioError,
    StudioResult, SystemClock, SESSION_TIMEOUT,
};
use studio_store::{ProjectRegistry, SessionStore};
use time::Duration;
use tracing::{debug, info};

pub struct Coordinator<S, C = SystemClock> {
    store: S,
    clock: C,
    timeout: Duration,
}

impl<S> Coordinator<S, SystemClock>
where
    S: SessionStore + ProjectRegistry,
{
    /// Coordinator over `store` using wall-clock time.
    pub fn with_system_clock(store: S) -> Self {
        Self::new(store, SystemClock)
    }
}

impl<S, C> Coordinator<S, C>
where
    S: SessionStore + ProjectRegistry,
    C: Clock,
{
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            timeout: SESSION_TIMEOUT,
        }
    }

    /// Override the liveness window (tests, tuning).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn purge(&self) -> StudioResult<()> {
        self.store
            .purge_expired(self.clock.now(), self.timeout)
            .map_err(StudioError::store)?;
        Ok(())
    }

    fn ensure_project(&self, project_id: ProjectId) -> StudioResult<()> {
        let exists = self
            .store
            .project_exists(project_id)
            .map_err(StudioError::store)?;
        if exists {
            Ok(())
        } else {
            Err(StudioError::ProjectNotFound(project_id))
        }
    }

    /// Ownership of `project_id` as seen by `caller`, after sweeping expired sessions.
    pub fn resolve(&self, project_id: ProjectId, caller: &SessionId) -> StudioResult<Ownership> {
        let active = self
            .store
            .get_active(project_id, self.clock.now(), self.timeout)
            .map_err(StudioError::store)?;
        Ok(Ownership::classify(active, caller))
    }

    /// Claim the project unless a different live session owns it.
    ///
    /// Re-registering with the same `session_id` renews the session and
    /// updates its editor name.
    pub fn register(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
    ) -> StudioResult<RegisterOutcome> {
        self.ensure_project(project_id)?;
        self.purge()?;

        match self.resolve(project_id, session_id)? {
            Ownership::OwnedByOther(owner) => {
                info!(
                    project_id,
                    session_id = %session_id,
                    owner = %owner.session_id,
                    "edit session contended"
                );
                Ok(RegisterOutcome::contended(&owner))
            }
            state @ (Ownership::Unowned | Ownership::OwnedBySelf(_)) => {
                self.store
                    .upsert_own(project_id, session_id, editor_name, self.clock.now())
                    .map_err(StudioError::store)?;
                if matches!(state, Ownership::Unowned) {
                    info!(project_id, session_id = %session_id, editor = editor_name, "edit session acquired");
                } else {
                    debug!(project_id, session_id = %session_id, "edit session renewed");
                }
                Ok(RegisterOutcome::acquired(editor_name))
            }
        }
    }

    /// Renew the caller's heartbeat. Unknown or already-expired sessions are
    /// ignored; ownership never changes here.
    pub fn heartbeat(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<Ack> {
        self.purge()?;
        let touched = self
            .store
            .heartbeat(project_id, session_id, self.clock.now())
            .map_err(StudioError::store)?;
        if !touched {
            debug!(project_id, session_id = %session_id, "heartbeat for unknown session ignored");
        }
        Ok(Ack::OK)
    }

    /// Whether the caller may save without overriding someone.
    pub fn check(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<CheckOutcome> {
        self.purge()?;
        let outcome = match self.resolve(project_id, session_id)? {
            Ownership::Unowned => CheckOutcome {
                is_current_editor: true,
                current_editor: None,
            },
            Ownership::OwnedBySelf(own) => CheckOutcome {
                is_current_editor: true,
                current_editor: Some(own.display_name().to_string()),
            },
            Ownership::OwnedByOther(owner) => CheckOutcome {
                is_current_editor: false,
                current_editor: Some(owner.display_name().to_string()),
            },
        };
        Ok(outcome)
    }

    /// Drop the caller's session. Releasing a session you don't own is harmless.
    pub fn release(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<Ack> {
        self.purge()?;
        let released = self
            .store
            .release(project_id, session_id)
            .map_err(StudioError::store)?;
        if released {
            info!(project_id, session_id = %session_id, "edit session released");
        }
        Ok(Ack::OK)
    }

    /// Take the project from whoever holds it.
    pub fn force_acquire(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
    ) -> StudioResult<RegisterOutcome> {
        self.ensure_project(project_id)?;
        self.purge()?;

        if let Ownership::OwnedByOther(prev) = self.resolve(project_id, session_id)? {
            info!(
                project_id,
                session_id = %session_id,
                evicted = %prev.session_id,
                "edit session taken over"
            );
        }
        self.store
            .force_replace(project_id, session_id, editor_name, self.clock.now())
            .map_err(StudioError::store)?;
        Ok(RegisterOutcome::acquired(editor_name))
    }
}
