use std::sync::Arc;

use studio_core::{
    Ack, CheckOutcome, Clock, ProjectId, RegisterOutcome, SessionId, StudioResult,
};
use studio_session::Coordinator;
use studio_store::{ProjectRegistry, SessionStore};

/// The five session operations as seen from a client.
/// Implemented by `HttpSessionApi` (a running server) and `LocalSessionApi`
/// (an in-process coordinator).
#[async_trait::async_trait]
pub trait SessionApi: Send + Sync {
    async fn register(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
    ) -> StudioResult<RegisterOutcome>;

    async fn heartbeat(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<Ack>;

    async fn check(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
    ) -> StudioResult<CheckOutcome>;

    async fn release(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<Ack>;

    async fn force_acquire(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
    ) -> StudioResult<RegisterOutcome>;
}

/// Reads and writes a project's pages configuration, the document a save
/// persists.
#[async_trait::async_trait]
pub trait PagesApi: Send + Sync {
    async fn load_pages(&self, project_id: ProjectId) -> StudioResult<serde_json::Value>;

    async fn save_pages(
        &self,
        project_id: ProjectId,
        pages: &serde_json::Value,
    ) -> StudioResult<Ack>;
}

/// Calls straight into a shared `Coordinator`. Several agents holding clones
/// of the same `LocalSessionApi` behave like tabs talking to one server.
pub struct LocalSessionApi<S, C> {
    coordinator: Arc<Coordinator<S, C>>,
}

impl<S, C> LocalSessionApi<S, C> {
    pub fn new(coordinator: Arc<Coordinator<S, C>>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Coordinator<S, C> {
        &self.coordinator
    }
}

impl<S, C> Clone for LocalSessionApi<S, C> {
    fn clone(&self) -> Self {
        Self {
            coordinator: Arc::clone(&self.coordinator),
        }
    }
}

#[async_trait::async_trait]
impl<S, C> SessionApi for LocalSessionApi<S, C>
where
    S: SessionStore + ProjectRegistry + Send + Sync,
    C: Clock,
{
    async fn register(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
    ) -> StudioResult<RegisterOutcome> {
        self.coordinator.register(project_id, session_id, editor_name)
    }

    async fn heartbeat(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<Ack> {
        self.coordinator.heartbeat(project_id, session_id)
    }

    async fn check(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
    ) -> StudioResult<CheckOutcome> {
        self.coordinator.check(project_id, session_id)
    }

    async fn release(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<Ack> {
        self.coordinator.release(project_id, session_id)
    }

    async fn force_acquire(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
    ) -> StudioResult<RegisterOutcome> {
        self.coordinator
            .force_acquire(project_id, session_id, editor_name)
    }
}
