use crate::types::ProjectId;

/// Failures surfaced by the session protocol.
///
/// Another editor owning a project is not an error; that outcome travels in
/// `RegisterOutcome`/`CheckOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// A required identifier was missing or malformed.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    /// The session store could not be read or written.
    #[error("session store failure: {0}")]
    Store(String),

    /// The coordinator could not be reached (client side).
    #[error("transport failure: {0}")]
    Transport(String),
}

impl StudioError {
    pub fn store(err: impl std::fmt::Display) -> Self {
        StudioError::Store(err.to_string())
    }
}

pub type StudioResult<T> = Result<T, StudioError>;
