use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::session_store::{SessionRecord, SessionStore, SessionUpdate, TransitionRecord};
use crate::types::{ConferenceHandle, ConnectionHandle, EventError, LocationUrl, SessionState};

use super::guards::{self, CurrentSessionProvider};

/// Lifecycle events consumed by the state machine.
///
/// This is the complete inbound vocabulary; the reducer matches on it
/// exhaustively so a new variant cannot be silently ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    ConferenceWillJoin {
        conference: ConferenceHandle,
    },
    ConferenceJoined {
        conference: ConferenceHandle,
    },
    ConferenceWillLeave {
        conference: ConferenceHandle,
    },
    ConferenceLeft {
        conference: ConferenceHandle,
        error: Option<EventError>,
    },
    ConferenceFailed {
        conference: ConferenceHandle,
        error: Option<EventError>,
    },
    ConnectionWillConnect {
        connection: ConnectionHandle,
    },
    ConnectionDisconnected {
        connection: ConnectionHandle,
        error: Option<EventError>,
    },
    ConnectionFailed {
        connection: ConnectionHandle,
        error: Option<EventError>,
    },
    ConfigWillLoad {
        location_url: LocationUrl,
    },
    ConfigLoadError {
        location_url: LocationUrl,
        error: EventError,
    },
}

impl LifecycleEvent {
    /// Stable label used in logs and transition history.
    pub fn label(&self) -> &'static str {
        match self {
            LifecycleEvent::ConferenceWillJoin { .. } => "conference-will-join",
            LifecycleEvent::ConferenceJoined { .. } => "conference-joined",
            LifecycleEvent::ConferenceWillLeave { .. } => "conference-will-leave",
            LifecycleEvent::ConferenceLeft { .. } => "conference-left",
            LifecycleEvent::ConferenceFailed { .. } => "conference-failed",
            LifecycleEvent::ConnectionWillConnect { .. } => "connection-will-connect",
            LifecycleEvent::ConnectionDisconnected { .. } => "connection-disconnected",
            LifecycleEvent::ConnectionFailed { .. } => "connection-failed",
            LifecycleEvent::ConfigWillLoad { .. } => "config-will-load",
            LifecycleEvent::ConfigLoadError { .. } => "config-load-error",
        }
    }
}

/// The state machine executor.
///
/// Consumes lifecycle events one at a time and derives the next session
/// record from the current one. Processing is synchronous and in-memory
/// only: per event at most one lookup and one merge-upsert against the
/// store. Events that fail their guard are logged no-ops, never errors;
/// the event source is allowed to deliver duplicates and stale events.
pub struct StateMachine {
    store: Arc<SessionStore>,
    current: Arc<dyn CurrentSessionProvider>,
}

impl StateMachine {
    pub fn new(store: Arc<SessionStore>, current: Arc<dyn CurrentSessionProvider>) -> Self {
        Self { store, current }
    }

    /// Process one lifecycle event. Returns the merged record when the
    /// event was recognized, None when it was ignored.
    pub fn process_event(&self, event: &LifecycleEvent) -> Option<SessionRecord> {
        debug!("Processing {} event", event.label());
        let update = self.reduce(event)?;
        let from_state = self.store.state_of(&update.url);
        let record = self.store.apply(&update);
        self.store.record_transition(
            &record.url,
            TransitionRecord::new(event.label(), from_state, record.state),
        );
        Some(record)
    }

    /// The transition table. Returns the partial update an event produces,
    /// or None when its guard fails.
    fn reduce(&self, event: &LifecycleEvent) -> Option<SessionUpdate> {
        match event {
            LifecycleEvent::ConferenceWillJoin { conference } => {
                match self.store.get(conference.url()) {
                    Some(session) => Some(
                        SessionUpdate::for_url(session.url).attach_conference(conference.clone()),
                    ),
                    None => {
                        info!("Ignoring conference-will-join for {}", conference.url());
                        None
                    }
                }
            }

            LifecycleEvent::ConferenceJoined { conference } => {
                match self.store.get(conference.url()) {
                    Some(session)
                        if session.state == Some(SessionState::WillStart)
                            && session.conference.as_ref() == Some(conference) =>
                    {
                        Some(SessionUpdate::for_url(session.url).state(SessionState::Started))
                    }
                    _ => {
                        info!("Ignoring conference-joined for {}", conference.url());
                        None
                    }
                }
            }

            LifecycleEvent::ConferenceWillLeave { conference } => {
                match self.store.get(conference.url()) {
                    Some(session)
                        if session.state.is_some()
                            && session.state != Some(SessionState::WillEnd)
                            && session.conference.as_ref() == Some(conference) =>
                    {
                        Some(SessionUpdate::for_url(session.url).state(SessionState::WillEnd))
                    }
                    _ => {
                        info!("Ignoring conference-will-leave for {}", conference.url());
                        None
                    }
                }
            }

            LifecycleEvent::ConferenceLeft { conference, error }
            | LifecycleEvent::ConferenceFailed { conference, error } => {
                self.conference_torn_down(conference, error.as_ref())
            }

            LifecycleEvent::ConnectionWillConnect { connection } => {
                match self.store.get(connection.url()) {
                    // Switching connections implies leaving the old
                    // conference, so any stale attachment is cleared here.
                    Some(session) => Some(
                        SessionUpdate::for_url(session.url)
                            .attach_connection(connection.clone())
                            .detach_conference(),
                    ),
                    None => {
                        info!("Ignoring connection-will-connect for {}", connection.url());
                        None
                    }
                }
            }

            LifecycleEvent::ConnectionDisconnected { connection, error }
            | LifecycleEvent::ConnectionFailed { connection, error } => {
                self.connection_torn_down(connection, error.as_ref())
            }

            LifecycleEvent::ConfigWillLoad { location_url } => {
                let url = location_url.url();
                let session = self.store.get(url);
                if session.is_some() && location_url.has_valid_room() {
                    // Refresh to the newest resolution of the location.
                    Some(SessionUpdate::for_url(url.clone()).location_url(location_url.clone()))
                } else if location_url.has_valid_room() {
                    Some(
                        SessionUpdate::for_url(url.clone())
                            .state(SessionState::WillStart)
                            .location_url(location_url.clone()),
                    )
                } else {
                    info!("Ignoring config-will-load for {}", url);
                    None
                }
            }

            LifecycleEvent::ConfigLoadError { location_url, error } => {
                let url = location_url.url();
                match self.store.get(url) {
                    Some(session)
                        if session
                            .location_url
                            .as_ref()
                            .map_or(false, |held| held.is_same_resolution(location_url)) =>
                    {
                        if guards::is_game_over(self.current.as_ref(), &session, error) {
                            Some(
                                SessionUpdate::for_url(session.url)
                                    .state(SessionState::Failed)
                                    .error(error.clone()),
                            )
                        } else {
                            debug!("Recoverable config load error for {}, keeping session", url);
                            None
                        }
                    }
                    _ => {
                        info!("Ignoring config-load-error for {}", url);
                        None
                    }
                }
            }
        }
    }

    /// Shared teardown path for conference-left and conference-failed.
    ///
    /// Some conference failures are recoverable (the app may retry joining
    /// after e.g. collecting a password), so a failure only finalizes the
    /// session once classified terminal. Even then, a still-attached
    /// connection defers finalization: the session waits for both handles
    /// to be gone before it is declared finished.
    fn conference_torn_down(
        &self,
        conference: &ConferenceHandle,
        error: Option<&EventError>,
    ) -> Option<SessionUpdate> {
        let url = conference.url();
        let session = match self.store.get(url) {
            Some(session) if session.conference.as_ref() == Some(conference) => session,
            _ => {
                info!("Ignoring conference teardown for {}", url);
                return None;
            }
        };

        if let Some(error) = error {
            if !guards::is_game_over(self.current.as_ref(), &session, error) {
                debug!("Recoverable conference failure for {}, keeping session", url);
                return None;
            }
        }

        Some(if session.connection.is_some() {
            // Connection still up: detach the conference and wait.
            SessionUpdate::for_url(session.url).detach_conference()
        } else if let Some(error) = error {
            SessionUpdate::for_url(session.url)
                .state(SessionState::Failed)
                .error(error.clone())
        } else {
            SessionUpdate::for_url(session.url)
                .state(SessionState::Ended)
                .clear_error()
        })
    }

    /// Symmetric teardown path for connection-disconnected and
    /// connection-failed.
    fn connection_torn_down(
        &self,
        connection: &ConnectionHandle,
        error: Option<&EventError>,
    ) -> Option<SessionUpdate> {
        let url = connection.url();
        let session = match self.store.get(url) {
            Some(session) if session.connection.as_ref() == Some(connection) => session,
            _ => {
                info!("Ignoring connection teardown for {}", url);
                return None;
            }
        };

        if let Some(error) = error {
            if !guards::is_game_over(self.current.as_ref(), &session, error) {
                debug!("Recoverable connection failure for {}, keeping session", url);
                return None;
            }
        }

        Some(if session.conference.is_some() {
            // Conference still attached: drop the connection and wait for
            // the conference to be torn down as well.
            SessionUpdate::for_url(session.url).detach_connection()
        } else if let Some(error) = error {
            SessionUpdate::for_url(session.url)
                .state(SessionState::Failed)
                .error(error.clone())
        } else {
            SessionUpdate::for_url(session.url)
                .state(SessionState::Ended)
                .clear_error()
        })
    }
}
