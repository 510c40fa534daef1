use std::time::Duration;

use serde::de::DeserializeOwned;
use studio_core::{
    Ack, CheckOutcome, ProjectId, RegisterOutcome, SessionId, StudioError, StudioResult,
};

use crate::api::{PagesApi, SessionApi};

const TIMEOUT: Duration = Duration::from_secs(10);

/// `SessionApi` over the studio server's `/api/session/*` endpoints, and
/// `PagesApi` over `/api/pages`.
///
/// ureq is blocking, so every call hops onto tokio's blocking pool.
#[derive(Clone)]
pub struct HttpSessionApi {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpSessionApi {
    /// `base_url` is the server origin, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, op: &str) -> String {
        self.api_url(&format!("session/{op}"))
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    async fn post<T>(&self, op: &str, project_id: ProjectId, body: serde_json::Value) -> StudioResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let agent = self.agent.clone();
        let url = self.url(op);
        blocking(move || {
            let resp = agent
                .post(&url)
                .header("Content-Type", "application/json")
                .send(body.to_string())
                .map_err(transport)?;
            decode(resp, project_id)
        })
        .await
    }

    async fn get<T>(&self, op: &str, project_id: ProjectId, session_id: &SessionId) -> StudioResult<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let agent = self.agent.clone();
        let url = self.url(op);
        let session_id = session_id.to_string();
        blocking(move || {
            let resp = agent
                .get(&url)
                .query("projectId", project_id.to_string())
                .query("sessionId", session_id)
                .call()
                .map_err(transport)?;
            decode(resp, project_id)
        })
        .await
    }
}

#[async_trait::async_trait]
impl SessionApi for HttpSessionApi {
    async fn register(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
    ) -> StudioResult<RegisterOutcome> {
        let body = serde_json::json!({
            "projectId": project_id,
            "sessionId": session_id,
            "editorName": editor_name,
        });
        self.post("register", project_id, body).await
    }

    async fn heartbeat(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<Ack> {
        let body = serde_json::json!({ "projectId": project_id, "sessionId": session_id });
        self.post("heartbeat", project_id, body).await
    }

    async fn check(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
    ) -> StudioResult<CheckOutcome> {
        self.get("check", project_id, session_id).await
    }

    async fn release(&self, project_id: ProjectId, session_id: &SessionId) -> StudioResult<Ack> {
        let body = serde_json::json!({ "projectId": project_id, "sessionId": session_id });
        self.post("release", project_id, body).await
    }

    async fn force_acquire(
        &self,
        project_id: ProjectId,
        session_id: &SessionId,
        editor_name: &str,
    ) -> StudioResult<RegisterOutcome> {
        let body = serde_json::json!({
            "projectId": project_id,
            "sessionId": session_id,
            "editorName": editor_name,
        });
        self.post("force-acquire", project_id, body).await
    }
}

#[async_trait::async_trait]
impl PagesApi for HttpSessionApi {
    async fn load_pages(&self, project_id: ProjectId) -> StudioResult<serde_json::Value> {
        let agent = self.agent.clone();
        let url = self.api_url("pages");
        blocking(move || {
            let resp = agent
                .get(&url)
                .query("projectId", project_id.to_string())
                .call()
                .map_err(transport)?;
            decode(resp, project_id)
        })
        .await
    }

    async fn save_pages(
        &self,
        project_id: ProjectId,
        pages: &serde_json::Value,
    ) -> StudioResult<Ack> {
        let agent = self.agent.clone();
        let url = self.api_url("pages");
        let body = pages.to_string();
        blocking(move || {
            let resp = agent
                .post(&url)
                .query("projectId", project_id.to_string())
                .header("Content-Type", "application/json")
                .send(body)
                .map_err(transport)?;
            decode(resp, project_id)
        })
        .await
    }
}

async fn blocking<T, F>(f: F) -> StudioResult<T>
where
    F: FnOnce() -> StudioResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StudioError::Transport(format!("request task failed: {e}")))?
}

fn transport(err: ureq::Error) -> StudioError {
    StudioError::Transport(err.to_string())
}

fn decode<T: DeserializeOwned>(
    mut resp: ureq::http::Response<ureq::Body>,
    project_id: ProjectId,
) -> StudioResult<T> {
    let status = resp.status().as_u16();
    let text = resp.body_mut().read_to_string().map_err(transport)?;
    match status {
        200..=299 => serde_json::from_str(&text)
            .map_err(|e| StudioError::Transport(format!("malformed response: {e}"))),
        400 => Err(StudioError::Validation(error_message(&text))),
        404 => Err(StudioError::ProjectNotFound(project_id)),
        _ => Err(StudioError::Transport(format!(
            "server returned {status}: {}",
            error_message(&text)
        ))),
    }
}

/// The `error` field of a server error body, or the raw text.
fn error_message(text: &str) -> String {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_store::{SqliteStore, StudioPaths};

    /// Bind the real router on an ephemeral port; the server runs until the
    /// test runtime shuts down.
    async fn live_server() -> (tempfile::TempDir, HttpSessionApi, ProjectId) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = StudioPaths::discover(tmp.path());
        paths.ensure_layout().unwrap();
        let project_id = SqliteStore::open_or_create(&paths.db_file)
            .unwrap()
            .create_project("Shop", "")
            .unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = studio_serve::router(tmp.path());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (tmp, HttpSessionApi::new(&format!("http://{addr}")), project_id)
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let api = HttpSessionApi::new("http://127.0.0.1:3000/");
        assert_eq!(api.base_url(), "http://127.0.0.1:3000");
        assert_eq!(
            api.url("force-acquire"),
            "http://127.0.0.1:3000/api/session/force-acquire"
        );
        assert_eq!(api.api_url("pages"), "http://127.0.0.1:3000/api/pages");
    }

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(
            error_message(r#"{"error":"invalid request: missing sessionId"}"#),
            "invalid request: missing sessionId"
        );
        assert_eq!(error_message("  gateway down \n"), "gateway down");
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let api = HttpSessionApi::new("http://127.0.0.1:9");
        let err = api
            .check(1, &SessionId::new("A"))
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::Transport(_)), "{err}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn two_tabs_against_live_server() {
        let (_tmp, tab_a, pid) = live_server().await;
        let tab_b = tab_a.clone();
        let (a, b) = (SessionId::new("sess_A"), SessionId::new("sess_B"));

        let out = tab_a.register(pid, &a, "Alice").await.unwrap();
        assert!(out.success && out.is_new_editor);
        assert_eq!(out.current_editor, "Alice");
        assert!(out.started_at.is_none());

        let out = tab_b.register(pid, &b, "Bob").await.unwrap();
        assert!(!out.is_new_editor);
        assert_eq!(out.current_editor, "Alice");
        assert!(out.started_at.is_some());

        assert!(tab_a.heartbeat(pid, &a).await.unwrap().success);

        let out = tab_b.force_acquire(pid, &b, "Bob").await.unwrap();
        assert!(out.is_new_editor);
        assert_eq!(out.current_editor, "Bob");

        let check = tab_a.check(pid, &a).await.unwrap();
        assert!(!check.is_current_editor);
        assert_eq!(check.current_editor.as_deref(), Some("Bob"));

        assert!(tab_b.release(pid, &b).await.unwrap().success);
        let check = tab_a.check(pid, &a).await.unwrap();
        assert!(check.is_current_editor);
        assert_eq!(check.current_editor, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn live_server_errors_map_to_studio_errors() {
        let (_tmp, api, pid) = live_server().await;

        let err = api
            .force_acquire(999, &SessionId::new("A"), "Alice")
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::ProjectNotFound(999)), "{err}");

        let err = api.register(pid, &SessionId::new("  "), "Alice").await.unwrap_err();
        match err {
            StudioError::Validation(msg) => assert!(msg.contains("sessionId"), "{msg}"),
            other => panic!("expected validation error, got {other}"),
        }

        let err = api.check(pid, &SessionId::new("")).await.unwrap_err();
        assert!(matches!(err, StudioError::Validation(_)), "{err}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn session_ids_survive_query_encoding() {
        let (_tmp, api, pid) = live_server().await;
        let odd = SessionId::new("tab 1&projectId=7");
        api.register(pid, &odd, "Alice").await.unwrap();

        assert!(api.check(pid, &odd).await.unwrap().is_current_editor);
        let other = api.check(pid, &SessionId::new("tab 1")).await.unwrap();
        assert!(!other.is_current_editor);
        assert_eq!(other.current_editor.as_deref(), Some("Alice"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn pages_round_trip_through_live_server() {
        let (_tmp, api, pid) = live_server().await;

        let initial = api.load_pages(pid).await.unwrap();
        assert_eq!(initial["projectName"], "Shop");

        let doc = serde_json::json!({"projectName": "Shop", "pageGroups": [{"name": "Cart"}]});
        assert!(api.save_pages(pid, &doc).await.unwrap().success);
        assert_eq!(api.load_pages(pid).await.unwrap(), doc);

        let err = api.save_pages(999, &doc).await.unwrap_err();
        assert!(matches!(err, StudioError::ProjectNotFound(999)), "{err}");
    }
}
