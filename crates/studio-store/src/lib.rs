pub mod config;
pub mod memory;
pub mod paths;
pub mod project;
pub mod session_store;
pub mod sqlite_store;

pub use config::{write_atomic, ConfigKey, StudioConfig};
pub use memory::MemoryStore;
pub use paths::StudioPaths;
pub use project::{default_pages_config, Project, ProjectUpdate};
pub use session_store::{ProjectRegistry, SessionStore};
pub use sqlite_store::SqliteStore;
