//! Core types for confkit-session-core
//!
//! This module defines the fundamental types used throughout the crate:
//! the session URL key, location descriptors, opaque conference/connection
//! handles, the session state enum and the lifecycle error variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Canonical session URL key.
///
/// URL parsing and normalization happen upstream; by the time a URL reaches
/// this crate it is already in its canonical string form and is used purely
/// as an identity key.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionUrl(pub String);

impl SessionUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

/// A resolved location descriptor produced by the config loader.
///
/// Each load of a URL produces a distinct resolution, so two descriptors for
/// the same URL are not interchangeable. `instance` carries that per-load
/// identity; guards that need "is this the same resolution the session holds"
/// use [`LocationUrl::is_same_resolution`], not URL equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationUrl {
    instance: Uuid,
    url: SessionUrl,
    room: Option<String>,
}

impl LocationUrl {
    pub fn new(url: SessionUrl, room: Option<String>) -> Self {
        Self {
            instance: Uuid::new_v4(),
            url,
            room,
        }
    }

    pub fn url(&self) -> &SessionUrl {
        &self.url
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Whether a joinable room can be resolved from this location.
    pub fn has_valid_room(&self) -> bool {
        self.room.as_deref().map_or(false, |room| !room.is_empty())
    }

    /// Identity comparison between two resolutions of a location.
    pub fn is_same_resolution(&self, other: &LocationUrl) -> bool {
        self.instance == other.instance
    }
}

impl fmt::Display for LocationUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// Opaque identity of a conference attachment.
///
/// The conference object itself lives in the signaling subsystem; only its
/// identity and the URL it was created for cross into this crate.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConferenceHandle {
    id: Uuid,
    url: SessionUrl,
}

impl ConferenceHandle {
    pub fn new(url: SessionUrl) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn url(&self) -> &SessionUrl {
        &self.url
    }
}

impl fmt::Display for ConferenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conference-{}", self.id)
    }
}

/// Opaque identity of a network connection attachment.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConnectionHandle {
    id: Uuid,
    url: SessionUrl,
}

impl ConnectionHandle {
    pub fn new(url: SessionUrl) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
        }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn url(&self) -> &SessionUrl {
        &self.url
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection-{}", self.id)
    }
}

/// Session states
///
/// Ordering is WillStart -> Started -> WillEnd -> Ended, with Failed
/// reachable from any non-terminal state. Ended and Failed are terminal.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum SessionState {
    WillStart,
    Started,
    WillEnd,
    Ended,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Ended | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::WillStart => write!(f, "WILL_START"),
            SessionState::Started => write!(f, "STARTED"),
            SessionState::WillEnd => write!(f, "WILL_END"),
            SessionState::Ended => write!(f, "ENDED"),
            SessionState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Error value attached to lifecycle events.
///
/// The signaling stack produces errors either as bare strings or as
/// structured error-like objects with a name, a message and an optional
/// recoverability marker. Both shapes are preserved here; one canonical
/// stringification covers every place an error crosses the external
/// boundary.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventError {
    Text(String),
    Structured {
        name: String,
        message: String,
        recoverable: Option<bool>,
    },
}

impl EventError {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn structured(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structured {
            name: name.into(),
            message: message.into(),
            recoverable: None,
        }
    }

    pub fn non_recoverable(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structured {
            name: name.into(),
            message: message.into(),
            recoverable: Some(false),
        }
    }

    /// The explicit recoverability marker, if the error carries one.
    /// Bare string errors never do.
    pub fn recoverable(&self) -> Option<bool> {
        match self {
            EventError::Text(_) => None,
            EventError::Structured { recoverable, .. } => *recoverable,
        }
    }

    /// Canonical string rendering. Text errors pass through unchanged;
    /// structured errors render as `name: message`, dropping whichever
    /// side is empty.
    pub fn to_error_string(&self) -> String {
        match self {
            EventError::Text(text) => text.clone(),
            EventError::Structured { name, message, .. } => {
                if name.is_empty() {
                    message.clone()
                } else if message.is_empty() {
                    name.clone()
                } else {
                    format!("{}: {}", name, message)
                }
            }
        }
    }
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_string())
    }
}

/// Renders an optional error for the external boundary. Absence renders to
/// an empty string.
pub fn error_string(error: Option<&EventError>) -> String {
    error.map(EventError::to_error_string).unwrap_or_default()
}
