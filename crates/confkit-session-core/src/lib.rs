//! Session lifecycle tracking for a conferencing client
//!
//! This crate derives a canonical session state from the stream of
//! lower-level connection and conference lifecycle events produced by the
//! signaling subsystem. The architecture consists of:
//!
//! - Session Store: keyed records with merge-upsert semantics
//! - State Machine: the transition rules for each lifecycle event
//! - Guards: the terminal-failure ("game over") classifier
//! - Coordinator: single-writer dispatch loop and observer fan-out
//!
//! Conference and connection teardown are tracked independently because a
//! connection can outlive or underlive its conference attachment; a session
//! is only declared finished once both handles are gone, so an in-flight
//! reconnect never produces a premature "ended" transition.

pub mod coordinator;
pub mod errors;
pub mod session_store;
pub mod state_machine;
pub mod types;

pub use coordinator::{Config, CoordinatorBuilder, SessionCoordinator, SessionObserver};
pub use errors::{Result, SessionError};
pub use session_store::{
    HistoryConfig, SessionRecord, SessionStats, SessionStore, SessionUpdate, TransitionRecord,
};
pub use state_machine::{
    current_session, is_game_over, CurrentSessionProvider, LifecycleEvent, StateMachine,
};
pub use types::{
    error_string, ConferenceHandle, ConnectionHandle, EventError, LocationUrl, SessionState,
    SessionUrl,
};
