use crate::session_store::{SessionRecord, SessionStore};
use crate::types::{EventError, SessionUrl};

/// Capability answering "which session is currently active".
///
/// The surrounding application knows which URL the user is looking at right
/// now; the classifier only needs to read that answer, never mutate it.
/// Injecting it keeps the classifier testable in isolation.
pub trait CurrentSessionProvider: Send + Sync {
    /// URL of the session currently considered active, if any.
    fn current_url(&self) -> Option<SessionUrl>;
}

/// The "game over" predicate: decides whether a failure is terminal for a
/// session.
///
/// Terminal iff the session has been superseded (the currently active URL no
/// longer names it, e.g. the user navigated away before the error arrived),
/// or the error explicitly declares itself non-recoverable. An absent
/// recoverability marker means the session could still recover, so the
/// predicate stays conservative.
pub fn is_game_over(
    provider: &dyn CurrentSessionProvider,
    session: &SessionRecord,
    error: &EventError,
) -> bool {
    let superseded = provider.current_url().as_ref() != Some(&session.url);
    superseded || error.recoverable() == Some(false)
}

/// The session record for the currently active URL, if one is recorded.
pub fn current_session(
    provider: &dyn CurrentSessionProvider,
    store: &SessionStore,
) -> Option<SessionRecord> {
    provider.current_url().and_then(|url| store.get(&url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_store::SessionUpdate;
    use crate::types::SessionState;

    struct FixedCurrent(Option<SessionUrl>);

    impl CurrentSessionProvider for FixedCurrent {
        fn current_url(&self) -> Option<SessionUrl> {
            self.0.clone()
        }
    }

    fn record(url: &str) -> SessionRecord {
        SessionRecord::new(SessionUrl::from(url))
    }

    #[test]
    fn explicit_non_recoverable_is_game_over() {
        let provider = FixedCurrent(Some(SessionUrl::from("u")));
        let session = record("u");
        assert!(is_game_over(
            &provider,
            &session,
            &EventError::non_recoverable("Fatal", "gone"),
        ));
    }

    #[test]
    fn missing_marker_is_not_game_over_while_current() {
        let provider = FixedCurrent(Some(SessionUrl::from("u")));
        let session = record("u");
        assert!(!is_game_over(&provider, &session, &EventError::text("boom")));
        assert!(!is_game_over(
            &provider,
            &session,
            &EventError::structured("Maybe", "retryable"),
        ));
    }

    #[test]
    fn superseded_session_is_game_over_regardless_of_error() {
        let provider = FixedCurrent(Some(SessionUrl::from("elsewhere")));
        let session = record("u");
        assert!(is_game_over(&provider, &session, &EventError::text("boom")));

        let provider = FixedCurrent(None);
        assert!(is_game_over(&provider, &session, &EventError::text("boom")));
    }

    #[test]
    fn current_session_reads_through_the_store() {
        let store = SessionStore::new();
        let url = SessionUrl::from("u");
        store.apply(&SessionUpdate::for_url(url.clone()).state(SessionState::Started));

        let provider = FixedCurrent(Some(url.clone()));
        let session = current_session(&provider, &store);
        assert_eq!(session.map(|s| s.url), Some(url));

        let provider = FixedCurrent(Some(SessionUrl::from("other")));
        assert!(current_session(&provider, &store).is_none());
    }
}
