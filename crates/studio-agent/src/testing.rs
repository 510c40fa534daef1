//! Test doubles: an in-process coordinator with switchable transport
//! failures, and an in-memory pages store that records writes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use studio_core::{
    Ack, CheckOutcome, ManualClock, ProjectId, RegisterOutcome, SessionId, StudioError,
    StudioResult,
};
use studio_session::Coordinator;
use studio_store::MemoryStore;
use time::macros::datetime;

use crate::api::{LocalSessionApi, PagesApi, SessionApi};

pub(crate) struct ScriptedApi {
    inner: LocalSessionApi<MemoryStore, Arc<ManualClock>>,
    clock: Arc<ManualClock>,
    heartbeats: AtomicUsize,
    fail_heartbeat: AtomicBool,
    fail_release: AtomicBool,
    fail_check: AtomicBool,
}

impl Default for ScriptedApi {
    fn default() -> Self {
        let clock = Arc::new(ManualClock::new(datetime!(2026-03-01 10:00 UTC)));
        let coordinator = Coordinator::new(MemoryStore::with_projects([1, 2]), clock.clone());
        Self {
            inner: LocalSessionApi::new(Arc::new(coordinator)),
            clock,
            heartbeats: AtomicUsize::new(0),
            fail_heartbeat: AtomicBool::new(false),
            fail_release: AtomicBool::new(false),
            fail_check: AtomicBool::new(false),
        }
    }
}

impl ScriptedApi {
    pub fn heartbeats(&self) -> usize {
        self.heartbeats.load(Ordering::SeqCst)
    }

    pub fn fail_heartbeats(&self, fail: bool) {
        self.fail_heartbeat.store(fail, Ordering::SeqCst);
    }

    pub fn fail_releases(&self, fail: bool) {
        self.fail_release.store(fail, Ordering::SeqCst);
    }

    pub fn fail_checks(&self, fail: bool) {
        self.fail_check.store(fail, Ordering::SeqCst);
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn store(&self) -> &MemoryStore {
        self.inner.coordinator().store()
    }

    /// Session id currently holding `project_id`, if any row exists.
    pub fn holder(&self, project_id: ProjectId) -> Option<String> {
        self.store()
            .sessions()
            .into_iter()
            .find(|s| s.project_id == project_id)
            .map(|s| s.session_id.to_string())
    }
}

fn offline() -> StudioError {
    StudioError::Transport("connection refused".into())
}

#[async_trait::async_trait]
impl SessionApi for ScriptedApi {
    async fn register(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
    ) -> StudioResult<RegisterOutcome> {
        self.inner.register(project_id, session_id, editor_name).await
    }

    async fn heartbeat(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<Ack> {
        self.heartbeats.fetch_add(1, Ordering::SeqCst);
        if self.fail_heartbeat.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.inner.heartbeat(project_id, session_id).await
    }

    async fn check(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
    ) -> StudioResult<CheckOutcome> {
        if self.fail_check.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.inner.check(project_id, session_id).await
    }

    async fn release(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<Ack> {
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.inner.release(project_id, session_id).await
    }

    async fn force_acquire(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
    ) -> StudioResult<RegisterOutcome> {
        self.inner
            .force_acquire(project_id, session_id, editor_name)
            .await
    }
}

/// Pages documents keyed by project, with every successful write recorded.
#[derive(Default)]
pub(crate) struct MemoryPages {
    docs: Mutex<HashMap<ProjectId, serde_json::Value>>,
    writes: Mutex<Vec<(ProjectId, serde_json::Value)>>,
    fail_write: AtomicBool,
}

impl MemoryPages {
    /// Document served for a project nobody has saved yet.
    pub fn initial(project_id: ProjectId) -> serde_json::Value {
        serde_json::json!({ "projectName": format!("Project {project_id}"), "pageGroups": [] })
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    /// Documents written for `project_id`, oldest first.
    pub fn saved(&self, project_id: ProjectId) -> Vec<serde_json::Value> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == project_id)
            .map(|(_, doc)| doc.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl PagesApi for MemoryPages {
    async fn load_pages(&self, project_id: ProjectId) -> StudioResult<serde_json::Value> {
        let docs = self.docs.lock().unwrap();
        Ok(docs
            .get(&project_id)
            .cloned()
            .unwrap_or_else(|| Self::initial(project_id)))
    }

    async fn save_pages(
        &self,
        project_id: ProjectId,
        pages: &serde_json::Value,
    ) -> StudioResult<Ack> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.docs.lock().unwrap().insert(project_id, pages.clone());
        self.writes.lock().unwrap().push((project_id, pages.clone()));
        Ok(Ack::OK)
    }
}
