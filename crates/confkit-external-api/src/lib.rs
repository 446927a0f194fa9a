//! External API bridge for confkit session tracking
//!
//! Host applications embedding the conferencing client observe the session
//! lifecycle through a small set of named events. This crate maps session
//! state transitions produced by `confkit-session-core` onto that stable
//! vocabulary and forwards them to a [`NotificationSink`], deduplicating
//! repeated states and suppressing delivery while no host scope is
//! registered.

pub mod bridge;
pub mod events;

pub use bridge::{ExternalApiBridge, NotificationSink, TracingSink};
pub use events::{
    event_name_for, ExternalEventData, CONFERENCE_FAILED, CONFERENCE_JOINED, CONFERENCE_LEFT,
    CONFERENCE_WILL_JOIN, CONFERENCE_WILL_LEAVE, ENTERED_BACKGROUND_MODE,
};
