pub mod agent;
pub mod api;
pub mod heartbeat;
pub mod http;
pub mod ui;

#[cfg(test)]
mod testing;

pub use agent::{SaveDecision, SessionAgent, SessionStatus};
pub use api::{LocalSessionApi, PagesApi, SessionApi};
pub use heartbeat::HeartbeatTimer;
pub use http::HttpSessionApi;
pub use ui::{ConsoleUi, EditorUi, RecordingUi, UiEvent};
