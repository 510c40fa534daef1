//! Storage seams used by the session coordinator.

use studio_core::{EditSession, ProjectId, SessionId};
use time::{Duration, OffsetDateTime};

/// Per-project mapping to at most one live `EditSession`.
///
/// Expired rows are removed lazily: every read of "the active session" sweeps
/// rows whose heartbeat is older than `timeout` first, so callers never see a
/// stale owner. There is no background eviction.
pub trait SessionStore {
    /// Delete every session (any project) whose heartbeat is older than
    /// `now - timeout`. Returns the number of rows removed.
    fn purge_expired(&self, now: OffsetDateTime, timeout: Duration) -> anyhow::Result<usize>;

    /// Sweep expired sessions, then return the most recently heartbeated
    /// session for `project_id`.
    fn get_active(
        &self,
        project_id: ProjectId,
        now: OffsetDateTime,
        timeout: Duration,
    ) -> anyhow::Result<Option<EditSession>>;

    /// Renew `(project_id, session_id)` if it exists (updating its name and
    /// heartbeat); otherwise replace whatever session the project has with a
    /// fresh one owned by `session_id`.
    fn upsert_own(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<()>;

    /// Touch the heartbeat of the matching row. Returns whether a row matched;
    /// a missing row is not an error.
    fn heartbeat(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool>;

    /// Delete the row matching both fields. Returns whether a row matched.
    fn release(&self, project_id: ProjectId, session_id: &SessionId) -> anyhow::Result<bool>;

    /// Unconditionally make `session_id` the project's only session.
    fn force_replace(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<()>;
}

/// Existence check against the project records.
pub trait ProjectRegistry {
    fn project_exists(&self, project_id: ProjectId) -> anyhow::Result<bool>;
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn purge_expired(&self, now: OffsetDateTime, timeout: Duration) -> anyhow::Result<usize> {
        (**self).purge_expired(now, timeout)
    }

    fn get_active(
        &self,
        project_id: ProjectId,
        now: OffsetDateTime,
        timeout: Duration,
    ) -> anyhow::Result<Option<EditSession>> {
        (**self).get_active(project_id, now, timeout)
    }

    fn upsert_own(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<()> {
        (**self).upsert_own(project_id, session_id, editor_name, now)
    }

    fn heartbeat(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        (**self).heartbeat(project_id, session_id, now)
    }

    fn release(&self, project_id: ProjectId, session_id: &SessionId) -> anyhow::Result<bool> {
        (**self).release(project_id, session_id)
    }

    fn force_replace(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<()> {
        (**self).force_replace(project_id, session_id, editor_name, now)
    }
}

impl<T: ProjectRegistry + ?Sized> ProjectRegistry for &T {
    fn project_exists(&self, project_id: ProjectId) -> anyhow::Result<bool> {
        (**self).project_exists(project_id)
    }
}
