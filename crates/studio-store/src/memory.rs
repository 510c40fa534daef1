//! In-process store used by tests and by the embedded agent transport.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use studio_core::{is_expired, EditSession, ProjectId, SessionId};
use time::{Duration, OffsetDateTime};

use crate::session_store::{ProjectRegistry, SessionStore};

#[derive(Debug, Default)]
struct Inner {
    projects: BTreeSet<ProjectId>,
    sessions: Vec<EditSession>,
}

/// `SessionStore` + `ProjectRegistry` kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already knows the given projects.
    pub fn with_projects(ids: impl IntoIterator<Item = ProjectId>) -> Self {
        let store = Self::new();
        store.lock().projects.extend(ids);
        store
    }

    pub fn add_project(&self, id: ProjectId) {
        self.lock().projects.insert(id);
    }

    /// Snapshot of every row, including ones not yet swept.
    pub fn sessions(&self) -> Vec<EditSession> {
        self.lock().sessions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn purge_expired(&self, now: OffsetDateTime, timeout: Duration) -> anyhow::Result<usize> {
        let mut inner = self.lock();
        let before = inner.sessions.len();
        inner.sessions.retain(|s| !is_expired(s, now, timeout));
        Ok(before - inner.sessions.len())
    }

    fn get_active(
        &self,
        project_id: ProjectId,
        now: OffsetDateTime,
        timeout: Duration,
    ) -> anyhow::Result<Option<EditSession>> {
        self.purge_expired(now, timeout)?;
        Ok(self
            .lock()
            .sessions
            .iter()
            .filter(|s| s.project_id == project_id)
            .max_by_key(|s| s.last_heartbeat)
            .cloned())
    }

    fn upsert_own(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<()> {
        let mut inner = self.lock();
        if let Some(own) = inner
            .sessions
            .iter_mut()
            .find(|s| s.project_id == project_id && &s.session_id == session_id)
        {
            own.editor_name = editor_name.to_string();
            own.last_heartbeat = now;
            return Ok(());
        }
        inner.sessions.retain(|s| s.project_id != project_id);
        inner.sessions.push(EditSession {
            project_id,
            session_id: session_id.clone(),
            editor_name: editor_name.to_string(),
            started_at: now,
            last_heartbeat: now,
        });
        Ok(())
    }

    fn heartbeat(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let mut inner = self.lock();
        let row = inner
            .sessions
            .iter_mut()
            .find(|s| s.project_id == project_id && &s.session_id == session_id);
        Ok(match row {
            Some(s) => {
                s.last_heartbeat = now;
                true
            }
            None => false,
        })
    }

    fn release(&self, project_id: ProjectId, session_id: &SessionId) -> anyhow::Result<bool> {
        let mut inner = self.lock();
        let before = inner.sessions.len();
        inner
            .sessions
            .retain(|s| !(s.project_id == project_id && &s.session_id == session_id));
        Ok(inner.sessions.len() != before)
    }

    fn force_replace(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<()> {
        let mut inner = self.lock();
        inner.sessions.retain(|s| s.project_id != project_id);
        inner.sessions.push(EditSession {
            project_id,
            session_id: session_id.clone(),
            editor_name: editor_name.to_string(),
            started_at: now,
            last_heartbeat: now,
        });
        Ok(())
    }
}

impl ProjectRegistry for MemoryStore {
    fn project_exists(&self, project_id: ProjectId) -> anyhow::Result<bool> {
        Ok(self.lock().projects.contains(&project_id))
    }
}
