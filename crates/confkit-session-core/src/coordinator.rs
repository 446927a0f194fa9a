//! Single-writer dispatch coordinator
//!
//! Owns the session store and the state machine, and drains all lifecycle
//! events through one task so that no two events are ever processed
//! concurrently, for the same URL or otherwise. Observers are notified for
//! every applied update, in processing order.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::{Result, SessionError};
use crate::session_store::{HistoryConfig, SessionRecord, SessionStore, SessionUpdate, TransitionRecord};
use crate::state_machine::{self, CurrentSessionProvider, LifecycleEvent, StateMachine};
use crate::types::{error_string, EventError, SessionState, SessionUrl};

/// Observer of applied session updates.
///
/// Called synchronously from the dispatch loop; implementations must not
/// block.
pub trait SessionObserver: Send + Sync {
    fn on_session_changed(&self, record: &SessionRecord);
}

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity of the lifecycle event channel
    pub event_channel_capacity: usize,

    /// Transition history settings
    pub history: HistoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_channel_capacity: 128,
            history: HistoryConfig::default(),
        }
    }
}

/// Builder for creating a SessionCoordinator
pub struct CoordinatorBuilder {
    config: Config,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl CoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            observers: Vec::new(),
        }
    }

    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.event_channel_capacity = capacity;
        self
    }

    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.config.history = history;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self, current: Arc<dyn CurrentSessionProvider>) -> Arc<SessionCoordinator> {
        SessionCoordinator::new(self.config, current, self.observers)
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Work items accepted by the dispatch loop. Fatal-error reports travel the
/// same channel as lifecycle events so the single-writer ordering holds for
/// them too.
enum Command {
    Lifecycle(LifecycleEvent),
    FatalError(EventError),
}

struct Inner {
    store: Arc<SessionStore>,
    machine: StateMachine,
    current: Arc<dyn CurrentSessionProvider>,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl Inner {
    fn handle(&self, command: Command) {
        match command {
            Command::Lifecycle(event) => {
                if let Some(record) = self.machine.process_event(&event) {
                    self.notify(&record);
                }
            }
            Command::FatalError(error) => self.fail_current_session(error),
        }
    }

    fn notify(&self, record: &SessionRecord) {
        for observer in &self.observers {
            observer.on_session_changed(record);
        }
    }

    /// Force the currently active session to Failed, carrying the
    /// stringified error. A fatal error with no current session to claim it
    /// is a logged no-op.
    fn fail_current_session(&self, error: EventError) {
        let Some(session) = state_machine::current_session(self.current.as_ref(), &self.store)
        else {
            info!("No current session to fail");
            return;
        };
        let from_state = session.state;
        let update = SessionUpdate::for_url(session.url)
            .state(SessionState::Failed)
            .error(EventError::text(error_string(Some(&error))));
        let record = self.store.apply(&update);
        self.store.record_transition(
            &record.url,
            TransitionRecord::new("fatal-error", from_state, record.state),
        );
        self.notify(&record);
    }
}

/// The session lifecycle coordinator.
///
/// Create with [`CoordinatorBuilder`]; drop all clones to stop the dispatch
/// loop.
pub struct SessionCoordinator {
    inner: Arc<Inner>,
    command_tx: mpsc::Sender<Command>,
}

impl SessionCoordinator {
    fn new(
        config: Config,
        current: Arc<dyn CurrentSessionProvider>,
        observers: Vec<Arc<dyn SessionObserver>>,
    ) -> Arc<Self> {
        let store = Arc::new(SessionStore::with_history(config.history));
        let machine = StateMachine::new(store.clone(), current.clone());
        let inner = Arc::new(Inner {
            store,
            machine,
            current,
            observers,
        });

        let (command_tx, mut command_rx) = mpsc::channel(config.event_channel_capacity);
        let loop_inner = inner.clone();
        tokio::spawn(async move {
            // Single consumer keeps event handling strictly in arrival order.
            while let Some(command) = command_rx.recv().await {
                loop_inner.handle(command);
            }
            debug!("Lifecycle command channel closed, dispatch loop exiting");
        });

        Arc::new(Self { inner, command_tx })
    }

    /// Enqueue a lifecycle event for processing.
    pub async fn dispatch(&self, event: LifecycleEvent) -> Result<()> {
        self.command_tx
            .send(Command::Lifecycle(event))
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    /// Report a fatal error not claimed by any other recovery path; the
    /// currently active session, if any, transitions to Failed.
    pub async fn report_fatal_error(&self, error: EventError) -> Result<()> {
        self.command_tx
            .send(Command::FatalError(error))
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.inner.store
    }

    /// The recorded session for a URL.
    pub fn session(&self, url: &SessionUrl) -> Result<SessionRecord> {
        self.inner
            .store
            .get(url)
            .ok_or_else(|| SessionError::SessionNotFound(url.to_string()))
    }

    /// The record of the currently active session.
    pub fn current_session(&self) -> Result<SessionRecord> {
        state_machine::current_session(self.inner.current.as_ref(), &self.inner.store)
            .ok_or(SessionError::NoCurrentSession)
    }
}
