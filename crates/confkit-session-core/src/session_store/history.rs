//! Session transition history for debugging and diagnostics

use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::types::SessionState;

/// Configuration for history tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Enable history tracking
    pub enabled: bool,

    /// Maximum number of transitions to keep per session
    pub max_transitions: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            #[cfg(debug_assertions)]
            enabled: true,
            #[cfg(not(debug_assertions))]
            enabled: false,
            max_transitions: 50,
        }
    }
}

/// Record of a single applied lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Monotonic sequence number within the session
    pub sequence: u64,

    /// Label of the lifecycle event that was applied
    pub event: String,

    /// State before the update (None for a freshly created record)
    pub from_state: Option<SessionState>,

    /// State after the update
    pub to_state: Option<SessionState>,

    /// When the event was applied (milliseconds since UNIX epoch)
    pub timestamp_ms: u64,
}

impl TransitionRecord {
    pub fn new(event: &str, from_state: Option<SessionState>, to_state: Option<SessionState>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);
        Self {
            sequence: 0,
            event: event.to_string(),
            from_state,
            to_state,
            timestamp_ms,
        }
    }

    /// Whether the event actually moved the session to a different state.
    pub fn changed_state(&self) -> bool {
        self.from_state != self.to_state
    }
}

/// Ring buffer of transition records for one session
#[derive(Debug, Clone)]
pub struct SessionHistory {
    transitions: VecDeque<TransitionRecord>,
    next_sequence: u64,
    max_transitions: usize,
}

impl SessionHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            transitions: VecDeque::with_capacity(config.max_transitions.min(16)),
            next_sequence: 0,
            max_transitions: config.max_transitions,
        }
    }

    /// Append a record, evicting the oldest once the cap is reached.
    pub fn push(&mut self, mut record: TransitionRecord) {
        record.sequence = self.next_sequence;
        self.next_sequence += 1;
        if self.transitions.len() >= self.max_transitions {
            self.transitions.pop_front();
        }
        self.transitions.push_back(record);
    }

    pub fn transitions(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_caps_at_max_transitions() {
        let config = HistoryConfig {
            enabled: true,
            max_transitions: 3,
        };
        let mut history = SessionHistory::new(&config);
        for i in 0..5 {
            history.push(TransitionRecord::new(
                &format!("event-{i}"),
                None,
                Some(SessionState::WillStart),
            ));
        }
        assert_eq!(history.len(), 3);
        // Oldest entries evicted, sequence numbers keep climbing.
        let sequences: Vec<u64> = history.transitions().map(|t| t.sequence).collect();
        assert_eq!(sequences, vec![2, 3, 4]);
    }

    #[test]
    fn changed_state_detects_partial_updates() {
        let partial = TransitionRecord::new(
            "conference-will-join",
            Some(SessionState::WillStart),
            Some(SessionState::WillStart),
        );
        assert!(!partial.changed_state());

        let advance = TransitionRecord::new(
            "conference-joined",
            Some(SessionState::WillStart),
            Some(SessionState::Started),
        );
        assert!(advance.changed_state());
    }
}
