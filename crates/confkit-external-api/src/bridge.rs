//! External API bridge
//!
//! Observes session record updates and turns state transitions into events
//! for the host application. Only transitions are forwarded: a record update
//! that leaves the state where it was (or carries a state already reported
//! for its URL) stays internal.

use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use tracing::debug;

use confkit_session_core::{error_string, SessionObserver, SessionRecord, SessionState, SessionUrl};

use crate::events::{event_name_for, ExternalEventData, ENTERED_BACKGROUND_MODE};

/// Outbound notification channel to the host/native layer.
///
/// Delivery is fire-and-forget: implementations must not block the dispatch
/// loop, and there is no acknowledgment or retry.
pub trait NotificationSink: Send + Sync {
    fn send_event(&self, name: &str, data: &ExternalEventData, scope: &str);
}

/// Bridges session state transitions to a notification sink.
///
/// The host registers a scope identifying the view that should receive
/// events; while no scope is registered every send is suppressed outright,
/// not queued.
pub struct ExternalApiBridge {
    sink: Arc<dyn NotificationSink>,
    scope: RwLock<Option<String>>,
    /// Last state reported per URL, for transition deduplication.
    last_reported: DashMap<SessionUrl, SessionState>,
}

impl ExternalApiBridge {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            scope: RwLock::new(None),
            last_reported: DashMap::new(),
        }
    }

    pub fn with_scope(sink: Arc<dyn NotificationSink>, scope: impl Into<String>) -> Self {
        let bridge = Self::new(sink);
        bridge.register_scope(scope);
        bridge
    }

    /// Register the host context that should receive events.
    pub fn register_scope(&self, scope: impl Into<String>) {
        if let Ok(mut guard) = self.scope.write() {
            *guard = Some(scope.into());
        }
    }

    /// Drop the registered scope; subsequent sends are suppressed.
    pub fn clear_scope(&self) {
        if let Ok(mut guard) = self.scope.write() {
            *guard = None;
        }
    }

    /// Emit the backgrounded-mode sibling notification. Not correlated to
    /// any session; always sent (scope permitting).
    pub fn notify_entered_background(&self) {
        self.send(ENTERED_BACKGROUND_MODE, &ExternalEventData::empty());
    }

    fn send(&self, name: &str, data: &ExternalEventData) {
        let scope = self.scope.read().ok().and_then(|guard| guard.clone());
        match scope {
            Some(scope) => self.sink.send_event(name, data, &scope),
            None => debug!("No scope registered, suppressing {} event", name),
        }
    }
}

impl SessionObserver for ExternalApiBridge {
    fn on_session_changed(&self, record: &SessionRecord) {
        let Some(state) = record.state else {
            return;
        };
        let Some(name) = event_name_for(state) else {
            return;
        };

        // insert returns the previous value, which doubles as the repeat
        // check: an identical state was already reported for this URL.
        if self.last_reported.insert(record.url.clone(), state) == Some(state) {
            return;
        }

        let data = ExternalEventData {
            url: record.url.to_string(),
            error: error_string(record.error.as_ref()),
        };
        debug!("Forwarding {} for {}", name, record.url);
        self.send(name, &data);
    }
}

/// Sink that logs events instead of crossing a process boundary. Useful as
/// a default wiring and in development builds.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn send_event(&self, name: &str, data: &ExternalEventData, scope: &str) {
        tracing::info!(scope, payload = %data.to_json(), "external event: {}", name);
    }
}
