//! One editor's view of the session protocol.
//!
//! A `SessionAgent` owns a single session id for its whole life and holds at
//! most one project open at a time. Heartbeat and release are best-effort;
//! register, check and force-acquire failures reach the human through
//! `EditorUi::notify`.

use std::sync::Arc;
use std::time::Duration;

use studio_core::{
    ProjectId, RegisterOutcome, SessionId, StudioError, StudioResult, HEARTBEAT_INTERVAL,
};
use tracing::{debug, info, warn};

use crate::api::{PagesApi, SessionApi};
use crate::heartbeat::HeartbeatTimer;
use crate::ui::EditorUi;

/// Local mirror of the last ownership answer from the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub is_current_editor: bool,
    pub current_editor: Option<String>,
}

/// Whether a save may go ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    /// Nobody else holds the project.
    Proceed,
    /// Someone else held it; the user chose to take over.
    TookOver,
    /// The user declined to override; nothing was changed on the server.
    Aborted,
}

impl SaveDecision {
    pub fn may_save(self) -> bool {
        !matches!(self, SaveDecision::Aborted)
    }
}

pub struct SessionAgent {
    api: Arc<dyn SessionApi>,
    ui: Arc<dyn EditorUi>,
    session_id: SessionId,
    editor_name: String,
    heartbeat_every: Duration,
    project: Option<ProjectId>,
    timer: Option<HeartbeatTimer>,
    status: SessionStatus,
}

impl SessionAgent {
    /// New agent with a freshly generated session id.
    pub fn new(api: Arc<dyn SessionApi>, ui: Arc<dyn EditorUi>, editor_name: &str) -> Self {
        Self {
            api,
            ui,
            session_id: SessionId::generate(),
            editor_name: studio_core::editor_name_or_default(Some(editor_name)),
            heartbeat_every: HEARTBEAT_INTERVAL,
            project: None,
            timer: None,
            status: SessionStatus::default(),
        }
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_heartbeat_interval(mut self, every: Duration) -> Self {
        self.heartbeat_every = every;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn editor_name(&self) -> &str {
        &self.editor_name
    }

    pub fn project(&self) -> Option<ProjectId> {
        self.project
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_heartbeating(&self) -> bool {
        self.timer.as_ref().is_some_and(HeartbeatTimer::is_running)
    }

    /// Open `project_id` for editing, leaving any other open project first.
    ///
    /// Ownership is taken when free; otherwise the contention warning is shown
    /// and no heartbeats are sent.
    pub async fn open_project(&mut self, project_id: ProjectId) -> StudioResult<RegisterOutcome> {
        if let Some(old) = self.project {
            if old != project_id {
                self.leave(old).await;
            } else {
                self.stop_heartbeat();
            }
        }

        let outcome = match self
            .api
            .register(project_id, &self.session_id, &self.editor_name)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.project = None;
                self.status = SessionStatus::default();
                self.ui
                    .notify(&format!("Could not open project {project_id}: {e}"));
                return Err(e);
            }
        };

        self.project = Some(project_id);
        if outcome.is_new_editor {
            self.became_owner(project_id, &outcome.current_editor);
        } else {
            info!(project_id, owner = %outcome.current_editor, "project is being edited elsewhere");
            self.ui
                .show_contention(&outcome.current_editor, outcome.started_at);
            self.status = SessionStatus {
                is_current_editor: false,
                current_editor: Some(outcome.current_editor.clone()),
            };
        }
        Ok(outcome)
    }

    /// Decide whether the open project may be saved.
    ///
    /// Asks the human before overriding another editor; a refusal leaves the
    /// server untouched.
    pub async fn before_save(&mut self) -> StudioResult<SaveDecision> {
        let project_id = self.require_project()?;

        let check = match self.api.check(project_id, &self.session_id).await {
            Ok(check) => check,
            Err(e) => {
                self.ui
                    .notify(&format!("Could not verify edit session: {e}"));
                return Err(e);
            }
        };

        if check.is_current_editor {
            self.status = SessionStatus {
                is_current_editor: true,
                current_editor: check.current_editor,
            };
            return Ok(SaveDecision::Proceed);
        }

        let other = check.current_editor.unwrap_or_default();
        self.stop_heartbeat();
        self.status = SessionStatus {
            is_current_editor: false,
            current_editor: Some(other.clone()),
        };

        if !self.ui.confirm_override(&other) {
            debug!(project_id, owner = %other, "save aborted by user");
            self.ui.show_contention(&other, None);
            return Ok(SaveDecision::Aborted);
        }

        self.force_take_over().await?;
        Ok(SaveDecision::TookOver)
    }

    /// Save the open project's pages once `before_save` allows it.
    ///
    /// `pages` of `None` writes the server's current document back. An aborted
    /// decision writes nothing.
    pub async fn save(
        &mut self,
        store: &dyn PagesApi,
        pages: Option<serde_json::Value>,
    ) -> StudioResult<SaveDecision> {
        let decision = self.before_save().await?;
        if !decision.may_save() {
            return Ok(decision);
        }
        let project_id = self.require_project()?;

        let written = async {
            let doc = match pages {
                Some(doc) => doc,
                None => store.load_pages(project_id).await?,
            };
            store.save_pages(project_id, &doc).await
        }
        .await;
        match written {
            Ok(_) => {
                info!(project_id, ?decision, "pages saved");
                Ok(decision)
            }
            Err(e) => {
                self.ui
                    .notify(&format!("Could not save project {project_id}: {e}"));
                Err(e)
            }
        }
    }

    /// Claim the open project regardless of who holds it.
    pub async fn force_take_over(&mut self) -> StudioResult<RegisterOutcome> {
        let project_id = self.require_project()?;
        match self
            .api
            .force_acquire(project_id, &self.session_id, &self.editor_name)
            .await
        {
            Ok(outcome) => {
                info!(project_id, session_id = %self.session_id, "took over edit session");
                self.became_owner(project_id, &outcome.current_editor);
                Ok(outcome)
            }
            Err(e) => {
                self.ui.notify(&format!("Could not take over editing: {e}"));
                Err(e)
            }
        }
    }

    /// Leave the open project, if any.
    pub async fn close(&mut self) {
        if let Some(project_id) = self.project {
            self.leave(project_id).await;
        }
    }

    fn require_project(&self) -> StudioResult<ProjectId> {
        self.project
            .ok_or_else(|| StudioError::Validation("no project is open".into()))
    }

    fn became_owner(&mut self, project_id: ProjectId, editor: &str) {
        self.ui.clear_contention();
        self.status = SessionStatus {
            is_current_editor: true,
            current_editor: Some(editor.to_string()),
        };
        self.stop_heartbeat();
        self.timer = Some(HeartbeatTimer::start(
            Arc::clone(&self.api),
            project_id,
            self.session_id.clone(),
            self.heartbeat_every,
        ));
    }

    fn stop_heartbeat(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }

    /// Stop heartbeating and release, without surfacing failures.
    async fn leave(&mut self, project_id: ProjectId) {
        self.stop_heartbeat();
        if let Err(e) = self.api.release(project_id, &self.session_id).await {
            warn!(project_id, session_id = %self.session_id, error = %e, "release failed, session will expire");
        }
        self.project = None;
        self.status = SessionStatus::default();
    }
}
