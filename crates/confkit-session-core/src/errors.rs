use thiserror::Error;

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Session-related errors
///
/// Guard failures inside the reducer are deliberately not errors; they are
/// logged no-ops. This enum covers the operations that can actually fail.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No current session")]
    NoCurrentSession,

    #[error("Lifecycle event channel closed")]
    ChannelClosed,
}
