//! Request validation in front of the coordinator.

use serde::Deserialize;
use studio_core::{editor_name_or_default, ProjectId, SessionId, StudioError, StudioResult};

/// A project id as it arrives on the wire: a JSON number, or a string from a
/// query parameter or a loosely-typed client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawProjectId {
    Num(i64),
    Str(String),
}

/// Fields shared by every `/session/*` request, all optional until validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[serde(default)]
    pub project_id: Option<RawProjectId>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub editor_name: Option<String>,
}

impl SessionRequest {
    /// Both identifiers, or a validation error naming the missing one.
    pub fn ids(&self) -> StudioResult<(ProjectId, SessionId)> {
        let project_id = require_project_id(self.project_id.as_ref())?;
        let session_id = require_session_id(self.session_id.as_deref())?;
        Ok((project_id, session_id))
    }

    /// Supplied editor name, or the anonymous default.
    pub fn editor(&self) -> String {
        editor_name_or_default(self.editor_name.as_deref())
    }
}

pub fn require_project_id(raw: Option<&RawProjectId>) -> StudioResult<ProjectId> {
    let id = match raw {
        None => return Err(StudioError::Validation("missing projectId".into())),
        Some(RawProjectId::Num(n)) => Some(*n),
        Some(RawProjectId::Str(s)) if s.trim().is_empty() => {
            return Err(StudioError::Validation("missing projectId".into()))
        }
        Some(RawProjectId::Str(s)) => s.trim().parse::<i64>().ok(),
    };
    match id {
        Some(n) if n > 0 => Ok(n),
        _ => Err(StudioError::Validation(
            "projectId must be a positive integer".into(),
        )),
    }
}

pub fn require_session_id(raw: Option<&str>) -> StudioResult<SessionId> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(SessionId::new(s)),
        _ => Err(StudioError::Validation("missing sessionId".into())),
    }
}
