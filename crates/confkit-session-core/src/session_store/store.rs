use dashmap::DashMap;
use tracing::{debug, info};

use crate::types::{SessionState, SessionUrl};

use super::history::{HistoryConfig, SessionHistory, TransitionRecord};
use super::record::{SessionRecord, SessionUpdate};

/// Keyed container mapping a canonical session URL to its current record.
///
/// Uses DashMap for lock-free concurrent access. Records are created by the
/// first merge-upsert for their URL and are never deleted; terminal sessions
/// stay queryable for diagnostics.
pub struct SessionStore {
    /// Session records keyed by URL (lock-free with DashMap)
    sessions: DashMap<SessionUrl, SessionRecord>,

    /// Optional per-session transition history
    histories: DashMap<SessionUrl, SessionHistory>,

    history_config: HistoryConfig,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_history(HistoryConfig::default())
    }

    pub fn with_history(history_config: HistoryConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            histories: DashMap::new(),
            history_config,
        }
    }

    /// Look up the session recorded for a URL. An unknown URL is an explicit
    /// absent result, logged, never an error.
    pub fn get(&self, url: &SessionUrl) -> Option<SessionRecord> {
        let record = self.sessions.get(url).map(|entry| entry.value().clone());
        if record.is_none() {
            debug!("No session recorded for {}", url);
        }
        record
    }

    /// Quiet state peek used when assembling transition records.
    pub(crate) fn state_of(&self, url: &SessionUrl) -> Option<SessionState> {
        self.sessions.get(url).and_then(|entry| entry.value().state)
    }

    /// Merge-upsert: apply a partial update, creating the record if this is
    /// the first update for its URL. Returns the merged record.
    pub fn apply(&self, update: &SessionUpdate) -> SessionRecord {
        let mut entry = self
            .sessions
            .entry(update.url.clone())
            .or_insert_with(|| {
                info!("Creating session record for {}", update.url);
                SessionRecord::new(update.url.clone())
            });
        entry.merge(update);
        let record = entry.value().clone();
        drop(entry);
        debug!(
            "Updated session {} (state: {:?})",
            record.url, record.state
        );
        record
    }

    /// Append a transition record to the session's history, if tracking is
    /// enabled.
    pub fn record_transition(&self, url: &SessionUrl, record: TransitionRecord) {
        if !self.history_config.enabled {
            return;
        }
        self.histories
            .entry(url.clone())
            .or_insert_with(|| SessionHistory::new(&self.history_config))
            .push(record);
    }

    /// Snapshot of the transition history for a session.
    pub fn history(&self, url: &SessionUrl) -> Vec<TransitionRecord> {
        self.histories
            .get(url)
            .map(|entry| entry.value().transitions().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of all recorded sessions.
    pub fn all(&self) -> Vec<SessionRecord> {
        self.sessions.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Aggregate counts over all recorded sessions.
    pub fn stats(&self) -> SessionStats {
        let mut stats = SessionStats::default();
        for entry in self.sessions.iter() {
            stats.total += 1;
            match entry.value().state {
                None => stats.pending += 1,
                Some(SessionState::WillStart) => stats.starting += 1,
                Some(SessionState::Started) => stats.active += 1,
                Some(SessionState::WillEnd) => stats.ending += 1,
                Some(SessionState::Ended) => stats.ended += 1,
                Some(SessionState::Failed) => stats.failed += 1,
            }
        }
        stats
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Session statistics
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    pub total: usize,
    pub pending: usize,
    pub starting: usize,
    pub active: usize,
    pub ending: usize,
    pub ended: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> SessionUrl {
        SessionUrl::new(format!("https://meet.example/{path}"))
    }

    #[test]
    fn unknown_url_is_absent_not_error() {
        let store = SessionStore::new();
        assert!(store.get(&url("nowhere")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn apply_creates_then_merges() {
        let store = SessionStore::new();
        let record = store.apply(&SessionUpdate::for_url(url("a")).state(SessionState::WillStart));
        assert_eq!(record.state, Some(SessionState::WillStart));

        let record = store.apply(&SessionUpdate::for_url(url("a")).state(SessionState::Started));
        assert_eq!(record.state, Some(SessionState::Started));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stats_count_terminal_sessions() {
        let store = SessionStore::new();
        store.apply(&SessionUpdate::for_url(url("a")).state(SessionState::Started));
        store.apply(&SessionUpdate::for_url(url("b")).state(SessionState::Failed));
        store.apply(&SessionUpdate::for_url(url("c")).state(SessionState::Ended));

        let stats = store.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.ended, 1);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn history_disabled_records_nothing() {
        let store = SessionStore::with_history(HistoryConfig {
            enabled: false,
            max_transitions: 10,
        });
        store.record_transition(
            &url("a"),
            TransitionRecord::new("config-will-load", None, Some(SessionState::WillStart)),
        );
        assert!(store.history(&url("a")).is_empty());
    }
}
