pub mod history;
pub mod record;
pub mod store;

pub use history::{HistoryConfig, SessionHistory, TransitionRecord};
pub use record::{SessionRecord, SessionUpdate};
pub use store::{SessionStats, SessionStore};
