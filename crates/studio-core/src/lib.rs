pub mod clock;
pub mod error;
pub mod ownership;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{StudioError, StudioResult};
pub use ownership::{is_expired, Ownership};
pub use types::*;
