use time::OffsetDateTime;

use crate::types::{EditSession, SessionId};

/// True once `now - last_heartbeat` exceeds `timeout`. A session heartbeated
/// exactly `timeout` ago is still live.
pub fn is_expired(session: &EditSession, now: OffsetDateTime, timeout: time::Duration) -> bool {
    now - session.last_heartbeat > timeout
}

/// Who holds a project, from the point of view of one caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
    /// No live session exists.
    Unowned,
    /// The live session belongs to the caller.
    OwnedBySelf(EditSession),
    /// The live session belongs to a different agent.
    OwnedByOther(EditSession),
}

impl Ownership {
    /// Classify the live session (if any) relative to `caller`.
    pub fn classify(active: Option<EditSession>, caller: &SessionId) -> Self {
        match active {
            None => Ownership::Unowned,
            Some(s) if &s.session_id == caller => Ownership::OwnedBySelf(s),
            Some(s) => Ownership::OwnedByOther(s),
        }
    }

    /// Whether the caller may edit without overriding anyone.
    pub fn is_caller_editor(&self) -> bool {
        !matches!(self, Ownership::OwnedByOther(_))
    }

    pub fn session(&self) -> Option<&EditSession> {
        match self {
            Ownership::Unowned => None,
            Ownership::OwnedBySelf(s) | Ownership::OwnedByOther(s) => Some(s),
        }
    }
}
