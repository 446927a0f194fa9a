//! External event vocabulary
//!
//! The five conference lifecycle names are reused as the stable external
//! vocabulary; host applications key their listeners off these strings, so
//! they must never change.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use confkit_session_core::SessionState;

pub const CONFERENCE_WILL_JOIN: &str = "conference-will-join";
pub const CONFERENCE_JOINED: &str = "conference-joined";
pub const CONFERENCE_WILL_LEAVE: &str = "conference-will-leave";
pub const CONFERENCE_LEFT: &str = "conference-left";
pub const CONFERENCE_FAILED: &str = "conference-failed";

/// Sibling notification with no session correlation, emitted when the app
/// moves into a backgrounded presentation mode.
pub const ENTERED_BACKGROUND_MODE: &str = "entered-background-mode";

lazy_static! {
    /// Immutable state-to-event-name table, built once at startup.
    static ref STATE_EVENT_NAMES: HashMap<SessionState, &'static str> = {
        let mut names = HashMap::new();
        names.insert(SessionState::WillStart, CONFERENCE_WILL_JOIN);
        names.insert(SessionState::Started, CONFERENCE_JOINED);
        names.insert(SessionState::WillEnd, CONFERENCE_WILL_LEAVE);
        names.insert(SessionState::Ended, CONFERENCE_LEFT);
        names.insert(SessionState::Failed, CONFERENCE_FAILED);
        names
    };
}

/// The external event name mapped to a session state, if one is declared.
pub fn event_name_for(state: SessionState) -> Option<&'static str> {
    STATE_EVENT_NAMES.get(&state).copied()
}

/// Payload attached to every externally forwarded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEventData {
    pub url: String,
    pub error: String,
}

impl ExternalEventData {
    pub fn empty() -> Self {
        Self {
            url: String::new(),
            error: String::new(),
        }
    }

    /// JSON rendering for sinks that transport serialized payloads.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_session_state_has_an_event_name() {
        for state in [
            SessionState::WillStart,
            SessionState::Started,
            SessionState::WillEnd,
            SessionState::Ended,
            SessionState::Failed,
        ] {
            assert!(event_name_for(state).is_some(), "no name for {state}");
        }
    }

    #[test]
    fn will_start_maps_to_will_join() {
        assert_eq!(event_name_for(SessionState::WillStart), Some(CONFERENCE_WILL_JOIN));
        assert_eq!(event_name_for(SessionState::Failed), Some(CONFERENCE_FAILED));
    }

    #[test]
    fn payload_serializes_to_json() {
        let data = ExternalEventData {
            url: "https://meet.example/standup".to_string(),
            error: String::new(),
        };
        assert_eq!(
            data.to_json(),
            r#"{"url":"https://meet.example/standup","error":""}"#
        );
    }
}
