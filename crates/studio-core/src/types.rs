use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A session that has not heartbeated for longer than this is expired.
pub const SESSION_TIMEOUT: time::Duration = time::Duration::minutes(5);

/// How often an owning agent renews its session. Well under `SESSION_TIMEOUT`
/// so that one lost heartbeat does not cost ownership.
pub const HEARTBEAT_INTERVAL: std::time::Duration = std::time::Duration::from_secs(2 * 60);

/// Name recorded when the client supplies none.
pub const DEFAULT_EDITOR_NAME: &str = "Anonymous";

/// Label shown for a live session whose stored editor name is blank.
pub const UNNAMED_EDITOR_LABEL: &str = "Another editor";

/// Project row id, assigned by the project registry.
pub type ProjectId = i64;

/// Opaque token identifying one client agent (one browser tab).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id in the `sess_<ulid>` format.
    pub fn generate() -> Self {
        Self(format!("sess_{}", ulid::Ulid::new().to_string().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Exclusive editing ownership of one project by one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditSession {
    pub project_id: ProjectId,
    pub session_id: SessionId,
    pub editor_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_heartbeat: OffsetDateTime,
}

impl EditSession {
    /// Name to show other editors; blank names get a generic label.
    pub fn display_name(&self) -> &str {
        if self.editor_name.trim().is_empty() {
            UNNAMED_EDITOR_LABEL
        } else {
            &self.editor_name
        }
    }
}

/// Normalize a client-supplied editor name, falling back to `DEFAULT_EDITOR_NAME`.
pub fn editor_name_or_default(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => DEFAULT_EDITOR_NAME.to_string(),
    }
}

// ── Wire payloads ──

/// Result of `register` and `force-acquire`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOutcome {
    pub success: bool,
    pub is_new_editor: bool,
    pub current_editor: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub started_at: Option<OffsetDateTime>,
}

impl RegisterOutcome {
    /// The caller now owns the project.
    pub fn acquired(editor_name: impl Into<String>) -> Self {
        Self {
            success: true,
            is_new_editor: true,
            current_editor: editor_name.into(),
            started_at: None,
        }
    }

    /// Someone else owns the project; report who and since when.
    pub fn contended(owner: &EditSession) -> Self {
        Self {
            success: true,
            is_new_editor: false,
            current_editor: owner.display_name().to_string(),
            started_at: Some(owner.started_at),
        }
    }
}

/// Result of `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub is_current_editor: bool,
    pub current_editor: Option<String>,
}

/// Plain acknowledgement for fire-and-forget operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub const OK: Ack = Ack { success: true };
}
