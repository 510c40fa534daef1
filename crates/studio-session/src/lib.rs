pub mod coordinator;
pub mod validate;

pub use coordinator::Coordinator;
pub use validate::{require_project_id, require_session_id, RawProjectId, SessionRequest};
