use serde::{Deserialize, Serialize};

use crate::types::{ConferenceHandle, ConnectionHandle, EventError, LocationUrl, SessionState, SessionUrl};

/// Complete recorded state of one tracked session, keyed by URL.
///
/// At most one conference and one connection handle are attached at a time;
/// attaching a new one requires the old one to have been detached first via
/// a separate update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Canonical identity key. Immutable once the record exists.
    pub url: SessionUrl,

    /// Lifecycle state. None until the session has started its lifecycle.
    pub state: Option<SessionState>,

    /// Current conference attachment, if any.
    pub conference: Option<ConferenceHandle>,

    /// Current connection attachment, if any.
    pub connection: Option<ConnectionHandle>,

    /// Most recent resolved location descriptor for this session.
    pub location_url: Option<LocationUrl>,

    /// Last recorded terminal error, if any.
    pub error: Option<EventError>,
}

impl SessionRecord {
    pub fn new(url: SessionUrl) -> Self {
        Self {
            url,
            state: None,
            conference: None,
            connection: None,
            location_url: None,
            error: None,
        }
    }

    /// Whether the session has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.state.map_or(false, |state| state.is_terminal())
    }

    /// Merge a partial update into this record. Only fields the update
    /// explicitly sets overwrite; everything else keeps its previous value.
    pub(crate) fn merge(&mut self, update: &SessionUpdate) {
        debug_assert_eq!(self.url, update.url);
        if let Some(state) = update.state {
            self.state = Some(state);
        }
        if let Some(conference) = &update.conference {
            self.conference = conference.clone();
        }
        if let Some(connection) = &update.connection {
            self.connection = connection.clone();
        }
        if let Some(location_url) = &update.location_url {
            self.location_url = Some(location_url.clone());
        }
        if let Some(error) = &update.error {
            self.error = error.clone();
        }
    }
}

/// Partial update to a session record.
///
/// Handle and error fields are doubly optional: the outer level says whether
/// the update touches the field at all, the inner level distinguishes
/// attaching a value from explicitly clearing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub url: SessionUrl,
    pub state: Option<SessionState>,
    pub conference: Option<Option<ConferenceHandle>>,
    pub connection: Option<Option<ConnectionHandle>>,
    pub location_url: Option<LocationUrl>,
    pub error: Option<Option<EventError>>,
}

impl SessionUpdate {
    pub fn for_url(url: SessionUrl) -> Self {
        Self {
            url,
            state: None,
            conference: None,
            connection: None,
            location_url: None,
            error: None,
        }
    }

    pub fn state(mut self, state: SessionState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn attach_conference(mut self, conference: ConferenceHandle) -> Self {
        self.conference = Some(Some(conference));
        self
    }

    pub fn detach_conference(mut self) -> Self {
        self.conference = Some(None);
        self
    }

    pub fn attach_connection(mut self, connection: ConnectionHandle) -> Self {
        self.connection = Some(Some(connection));
        self
    }

    pub fn detach_connection(mut self) -> Self {
        self.connection = Some(None);
        self
    }

    pub fn location_url(mut self, location_url: LocationUrl) -> Self {
        self.location_url = Some(location_url);
        self
    }

    pub fn error(mut self, error: EventError) -> Self {
        self.error = Some(Some(error));
        self
    }

    pub fn clear_error(mut self) -> Self {
        self.error = Some(None);
        self
    }
}
