use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path as UrlPath, Query, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use studio_core::{
    Ack, CheckOutcome, Clock, ProjectId, RegisterOutcome, StudioError, SystemClock,
};
use studio_session::{require_project_id, Coordinator, RawProjectId, SessionRequest};
use studio_store::{Project, ProjectUpdate, SqliteStore, StudioPaths};

// ── Config ──

pub struct ServeConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

// ── App State ──

struct AppState {
    paths: StudioPaths,
    clock: Arc<dyn Clock>,
    /// Serializes session operations so each purge-then-decide sequence runs
    /// to completion before the next one starts.
    session_gate: Mutex<()>,
}

type SessionCoordinator = Coordinator<SqliteStore, Arc<dyn Clock>>;

impl AppState {
    fn new(root: &Path, clock: Arc<dyn Clock>) -> Self {
        Self {
            paths: StudioPaths::discover(root),
            clock,
            session_gate: Mutex::new(()),
        }
    }

    fn open_store(&self) -> anyhow::Result<SqliteStore> {
        SqliteStore::open(&self.paths.db_file)
    }

    /// Run `f` against a fresh coordinator while holding the session gate.
    fn with_coordinator<T>(
        &self,
        f: impl FnOnce(&SessionCoordinator) -> Result<T, StudioError>,
    ) -> Result<T, AppError> {
        let _gate = self.session_gate.lock().unwrap_or_else(|e| e.into_inner());
        let coordinator = Coordinator::new(self.open_store()?, Arc::clone(&self.clock));
        Ok(f(&coordinator)?)
    }
}

// ── Error Handling ──

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<StudioError>() {
            Some(StudioError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(StudioError::ProjectNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// ── Extractors ──
//
// axum's own rejections answer with plain text and 415/422 statuses. These
// wrappers turn any unreadable body, query or path into the same
// `400 {"error": ...}` the handlers return for missing ids.

struct ApiJson<T>(T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| StudioError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

struct ApiQuery<T>(T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| StudioError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

struct ApiPath<T>(T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    UrlPath<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let UrlPath(value) = UrlPath::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| StudioError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

// ── Entrypoint ──

pub async fn serve(root: &Path, config: ServeConfig) -> anyhow::Result<()> {
    let paths = StudioPaths::discover(root);
    if !paths.is_initialized() {
        anyhow::bail!("not a studio workspace (run `studio init` first)");
    }
    // Bring the schema up to date before taking requests.
    drop(SqliteStore::open_or_create(&paths.db_file)?);

    let app = router(root);
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("studio HTTP server listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

/// Build the router (for testing without binding to a port).
pub fn router(root: &Path) -> Router {
    router_with_clock(root, Arc::new(SystemClock))
}

/// Router whose session expiry uses `clock` instead of wall-clock time.
pub fn router_with_clock(root: &Path, clock: Arc<dyn Clock>) -> Router {
    let state = Arc::new(AppState::new(root, clock));
    Router::new()
        .route("/api/health", get(health))
        .route("/api/session/register", post(session_register))
        .route("/api/session/heartbeat", post(session_heartbeat))
        .route("/api/session/check", get(session_check))
        .route("/api/session/release", post(session_release))
        .route("/api/session/force-acquire", post(session_force_acquire))
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/pages", get(get_pages).post(save_pages))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

// ── /api/session/* ──

async fn session_register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<SessionRequest>,
) -> Result<Json<RegisterOutcome>, AppError> {
    let (project_id, session_id) = body.ids()?;
    let editor = body.editor();
    let out = state.with_coordinator(|c| c.register(project_id, &session_id, &editor))?;
    Ok(Json(out))
}

async fn session_heartbeat(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<SessionRequest>,
) -> Result<Json<Ack>, AppError> {
    let (project_id, session_id) = body.ids()?;
    let ack = state.with_coordinator(|c| c.heartbeat(project_id, &session_id))?;
    Ok(Json(ack))
}

async fn session_check(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SessionRequest>,
) -> Result<Json<CheckOutcome>, AppError> {
    let (project_id, session_id) = params.ids()?;
    let out = state.with_coordinator(|c| c.check(project_id, &session_id))?;
    Ok(Json(out))
}

async fn session_release(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<SessionRequest>,
) -> Result<Json<Ack>, AppError> {
    let (project_id, session_id) = body.ids()?;
    let ack = state.with_coordinator(|c| c.release(project_id, &session_id))?;
    Ok(Json(ack))
}

async fn session_force_acquire(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<SessionRequest>,
) -> Result<Json<RegisterOutcome>, AppError> {
    let (project_id, session_id) = body.ids()?;
    let editor = body.editor();
    let out = state.with_coordinator(|c| c.force_acquire(project_id, &session_id, &editor))?;
    Ok(Json(out))
}

// ── /api/projects ──

#[derive(serde::Serialize)]
struct ProjectsResponse {
    projects: Vec<Project>,
}

async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProjectsResponse>, AppError> {
    let store = state.open_store()?;
    Ok(Json(ProjectsResponse {
        projects: store.list_projects()?,
    }))
}

async fn get_project(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<ProjectId>,
) -> Result<Json<Project>, AppError> {
    let store = state.open_store()?;
    let project = store
        .get_project(id)?
        .ok_or(StudioError::ProjectNotFound(id))?;
    Ok(Json(project))
}

#[derive(Deserialize)]
struct CreateProjectBody {
    name: Option<String>,
    description: Option<String>,
}

async fn create_project(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<CreateProjectBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| StudioError::Validation("project name must not be empty".into()))?;
    let description = body.description.unwrap_or_default();

    let store = state.open_store()?;
    let id = store.create_project(name, &description)?;
    std::fs::create_dir_all(state.paths.project_html_dir(id))?;
    tracing::info!(project_id = id, name, "project created");
    Ok(Json(serde_json::json!({
        "success": true,
        "project": { "id": id, "name": name, "description": description },
    })))
}

async fn update_project(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<ProjectId>,
    ApiJson(body): ApiJson<ProjectUpdate>,
) -> Result<Json<Ack>, AppError> {
    let store = state.open_store()?;
    if !store.update_project(id, &body)? {
        return Err(StudioError::ProjectNotFound(id).into());
    }
    Ok(Json(Ack::OK))
}

async fn delete_project(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<ProjectId>,
) -> Result<Json<Ack>, AppError> {
    let store = state.open_store()?;
    if !store.delete_project(id)? {
        return Err(StudioError::ProjectNotFound(id).into());
    }
    let html_dir = state.paths.project_html_dir(id);
    if html_dir.exists() {
        std::fs::remove_dir_all(&html_dir)?;
    }
    tracing::info!(project_id = id, "project deleted");
    Ok(Json(Ack::OK))
}

// ── /api/pages ──

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PagesQuery {
    project_id: Option<RawProjectId>,
}

async fn get_pages(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<PagesQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = require_project_id(params.project_id.as_ref())?;
    let store = state.open_store()?;
    let pages = store
        .pages_config(id)?
        .ok_or(StudioError::ProjectNotFound(id))?;
    Ok(Json(pages))
}

async fn save_pages(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<PagesQuery>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<Json<Ack>, AppError> {
    let id = require_project_id(params.project_id.as_ref())?;
    let store = state.open_store()?;
    if store.get_project(id)?.is_none() {
        return Err(StudioError::ProjectNotFound(id).into());
    }
    store.save_pages_config(id, &body)?;
    Ok(Json(Ack::OK))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use studio_core::ManualClock;
    use time::macros::datetime;
    use tower::ServiceExt;

    fn setup_workspace(dir: &Path) -> ProjectId {
        let paths = StudioPaths::discover(dir);
        paths.ensure_layout().unwrap();
        let store = SqliteStore::open_or_create(&paths.db_file).unwrap();
        store.create_project("Shop", "storefront mockups").unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let tmp = tempfile::tempdir().unwrap();
        setup_workspace(tmp.path());
        let (status, json) = send(router(tmp.path()), get_req("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn two_tabs_over_http() {
        let tmp = tempfile::tempdir().unwrap();
        let pid = setup_workspace(tmp.path());
        let app = || router(tmp.path());

        let (status, a) = send(
            app(),
            post_json(
                "/api/session/register",
                serde_json::json!({"projectId": pid, "sessionId": "A", "editorName": "Alice"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(a["success"], true);
        assert_eq!(a["isNewEditor"], true);
        assert_eq!(a["currentEditor"], "Alice");

        let (_, b) = send(
            app(),
            post_json(
                "/api/session/register",
                serde_json::json!({"projectId": pid, "sessionId": "B", "editorName": "Bob"}),
            ),
        )
        .await;
        assert_eq!(b["isNewEditor"], false);
        assert_eq!(b["currentEditor"], "Alice");
        assert!(b["startedAt"].is_string());

        let (status, forced) = send(
            app(),
            post_json(
                "/api/session/force-acquire",
                serde_json::json!({"projectId": pid, "sessionId": "B", "editorName": "Bob"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(forced["isNewEditor"], true);
        assert_eq!(forced["currentEditor"], "Bob");

        let (status, chk) = send(
            app(),
            get_req(&format!("/api/session/check?projectId={pid}&sessionId=A")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chk["isCurrentEditor"], false);
        assert_eq!(chk["currentEditor"], "Bob");
    }

    #[tokio::test]
    async fn expiry_over_http_uses_injected_clock() {
        let tmp = tempfile::tempdir().unwrap();
        let pid = setup_workspace(tmp.path());
        let clock = Arc::new(ManualClock::new(datetime!(2026-03-01 10:00 UTC)));
        let app = || router_with_clock(tmp.path(), clock.clone());

        send(
            app(),
            post_json(
                "/api/session/register",
                serde_json::json!({"projectId": pid, "sessionId": "A", "editorName": "Alice"}),
            ),
        )
        .await;

        clock.advance(time::Duration::minutes(5) + time::Duration::seconds(1));

        let (_, b) = send(
            app(),
            post_json(
                "/api/session/register",
                serde_json::json!({"projectId": pid, "sessionId": "B", "editorName": "Bob"}),
            ),
        )
        .await;
        assert_eq!(b["isNewEditor"], true);
    }

    #[tokio::test]
    async fn unowned_check_reports_null_editor() {
        let tmp = tempfile::tempdir().unwrap();
        let pid = setup_workspace(tmp.path());
        let (status, chk) = send(
            router(tmp.path()),
            get_req(&format!("/api/session/check?projectId={pid}&sessionId=A")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chk["isCurrentEditor"], true);
        assert!(chk["currentEditor"].is_null());
    }

    #[tokio::test]
    async fn heartbeat_and_release_unknown_session_succeed() {
        let tmp = tempfile::tempdir().unwrap();
        let pid = setup_workspace(tmp.path());
        for uri in ["/api/session/heartbeat", "/api/session/release"] {
            let (status, json) = send(
                router(tmp.path()),
                post_json(uri, serde_json::json!({"projectId": pid, "sessionId": "ghost"})),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(json["success"], true);
        }
    }

    #[tokio::test]
    async fn missing_ids_are_bad_requests() {
        let tmp = tempfile::tempdir().unwrap();
        setup_workspace(tmp.path());

        let (status, json) = send(
            router(tmp.path()),
            post_json("/api/session/register", serde_json::json!({"sessionId": "A"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("projectId"));

        let (status, _) = send(
            router(tmp.path()),
            post_json("/api/session/heartbeat", serde_json::json!({"projectId": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(router(tmp.path()), get_req("/api/session/check?projectId=1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        setup_workspace(tmp.path());
        for uri in ["/api/session/register", "/api/session/force-acquire"] {
            let (status, _) = send(
                router(tmp.path()),
                post_json(
                    uri,
                    serde_json::json!({"projectId": 999, "sessionId": "A", "editorName": "Alice"}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn register_without_name_is_anonymous() {
        let tmp = tempfile::tempdir().unwrap();
        let pid = setup_workspace(tmp.path());
        let (_, out) = send(
            router(tmp.path()),
            post_json(
                "/api/session/register",
                serde_json::json!({"projectId": pid, "sessionId": "A"}),
            ),
        )
        .await;
        assert_eq!(out["currentEditor"], studio_core::DEFAULT_EDITOR_NAME);
    }

    #[tokio::test]
    async fn project_crud_over_http() {
        let tmp = tempfile::tempdir().unwrap();
        setup_workspace(tmp.path());

        let (status, created) = send(
            router(tmp.path()),
            post_json("/api/projects", serde_json::json!({"name": "Blog"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["project"]["id"].as_i64().unwrap();

        let (_, list) = send(router(tmp.path()), get_req("/api/projects")).await;
        assert_eq!(list["projects"].as_array().unwrap().len(), 2);

        let req = Request::builder()
            .method("PUT")
            .uri(format!("/api/projects/{id}"))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"description": "posts"}).to_string(),
            ))
            .unwrap();
        let (status, _) = send(router(tmp.path()), req).await;
        assert_eq!(status, StatusCode::OK);

        let (_, project) = send(router(tmp.path()), get_req(&format!("/api/projects/{id}"))).await;
        assert_eq!(project["name"], "Blog");
        assert_eq!(project["description"], "posts");

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/api/projects/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(router(tmp.path()), req).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(router(tmp.path()), get_req(&format!("/api/projects/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_project_requires_name() {
        let tmp = tempfile::tempdir().unwrap();
        setup_workspace(tmp.path());
        let (status, _) = send(
            router(tmp.path()),
            post_json("/api/projects", serde_json::json!({"name": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pages_default_then_saved() {
        let tmp = tempfile::tempdir().unwrap();
        let pid = setup_workspace(tmp.path());

        let (status, pages) =
            send(router(tmp.path()), get_req(&format!("/api/pages?projectId={pid}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pages["projectName"], "Shop");

        let saved = serde_json::json!({"projectName": "Shop", "pageGroups": [{"name": "Cart"}]});
        let (status, _) = send(
            router(tmp.path()),
            post_json(&format!("/api/pages?projectId={pid}"), saved.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, pages) =
            send(router(tmp.path()), get_req(&format!("/api/pages?projectId={pid}"))).await;
        assert_eq!(pages, saved);

        let (status, _) = send(
            router(tmp.path()),
            post_json("/api/pages", serde_json::json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(router(tmp.path()), get_req("/api/pages?projectId=999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    fn assert_json_bad_request(status: StatusCode, json: &serde_json::Value, what: &str) {
        assert_eq!(status, StatusCode::BAD_REQUEST, "{what}");
        let msg = json["error"].as_str().unwrap_or_default();
        assert!(msg.starts_with("invalid request: "), "{what}: {json}");
    }

    #[tokio::test]
    async fn unreadable_requests_are_json_bad_requests() {
        let tmp = tempfile::tempdir().unwrap();
        let pid = setup_workspace(tmp.path());

        let (status, json) = send(
            router(tmp.path()),
            post_json(
                "/api/session/register",
                serde_json::json!({"projectId": true, "sessionId": "A"}),
            ),
        )
        .await;
        assert_json_bad_request(status, &json, "wrong projectId type");

        let req = Request::builder()
            .method("POST")
            .uri("/api/session/heartbeat")
            .body(Body::from(
                serde_json::json!({"projectId": pid, "sessionId": "A"}).to_string(),
            ))
            .unwrap();
        let (status, json) = send(router(tmp.path()), req).await;
        assert_json_bad_request(status, &json, "missing content-type");

        let req = Request::builder()
            .method("POST")
            .uri("/api/session/release")
            .header("content-type", "application/json")
            .body(Body::from("{\"projectId\": "))
            .unwrap();
        let (status, json) = send(router(tmp.path()), req).await;
        assert_json_bad_request(status, &json, "truncated body");

        let (status, json) = send(
            router(tmp.path()),
            get_req(&format!("/api/pages?projectId={pid}&projectId=2")),
        )
        .await;
        assert_json_bad_request(status, &json, "duplicate query key");

        let (status, json) = send(router(tmp.path()), get_req("/api/projects/abc")).await;
        assert_json_bad_request(status, &json, "non-numeric path id");
    }

    #[tokio::test]
    async fn put_null_design_system_clears_it() {
        let tmp = tempfile::tempdir().unwrap();
        let pid = setup_workspace(tmp.path());
        let put = |body: serde_json::Value| {
            Request::builder()
                .method("PUT")
                .uri(format!("/api/projects/{pid}"))
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        };

        let (status, _) = send(
            router(tmp.path()),
            put(serde_json::json!({"designSystem": {"primary": "#222"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, project) = send(router(tmp.path()), get_req(&format!("/api/projects/{pid}"))).await;
        assert_eq!(project["designSystem"]["primary"], "#222");

        let (status, _) = send(router(tmp.path()), put(serde_json::json!({"designSystem": null}))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, project) = send(router(tmp.path()), get_req(&format!("/api/projects/{pid}"))).await;
        assert!(project["designSystem"].is_null());
        assert_eq!(project["name"], "Shop");
    }
}
