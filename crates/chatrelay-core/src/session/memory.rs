//! In-memory session store.
//!
//! State lives in a `DashMap` keyed by sender. Every operation takes the
//! entry guard for exactly one statement and clones what it returns, so no
//! guard is ever held across an `.await`.

use std::sync::Arc;

use dashmap::DashMap;

use chatrelay_types::error::RepositoryError;
use chatrelay_types::session::{Backend, SenderId, SessionState, Turn};

use super::store::SessionStore;

/// Process-resident [`SessionStore`]. A restart loses every session.
///
/// Cloning produces a shared view of the same underlying map.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<DashMap<SenderId, SessionState>>,
    default_backend: Backend,
}

impl InMemorySessionStore {
    /// Create an empty store whose unset senders read as `default_backend`.
    pub fn new(default_backend: Backend) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            default_backend,
        }
    }

    /// Number of senders seen so far.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Cloned snapshot of one sender's state, without creating an entry.
    pub fn snapshot(&self, sender: &SenderId) -> Option<SessionState> {
        self.sessions.get(sender).map(|r| r.value().clone())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Backend::default())
    }
}

impl SessionStore for InMemorySessionStore {
    async fn get_history(&self, sender: &SenderId) -> Result<Vec<Turn>, RepositoryError> {
        Ok(self
            .sessions
            .entry(sender.clone())
            .or_default()
            .history
            .clone())
    }

    async fn append_turn(&self, sender: &SenderId, turn: Turn) -> Result<(), RepositoryError> {
        self.sessions
            .entry(sender.clone())
            .or_default()
            .history
            .push(turn);
        Ok(())
    }

    async fn last_n(&self, sender: &SenderId, n: usize) -> Result<Vec<Turn>, RepositoryError> {
        Ok(self
            .sessions
            .get(sender)
            .map(|r| r.value().last_n(n).to_vec())
            .unwrap_or_default())
    }

    async fn reset_history(&self, sender: &SenderId) -> Result<(), RepositoryError> {
        self.sessions.entry(sender.clone()).or_default().history = Vec::new();
        Ok(())
    }

    async fn get_model(&self, sender: &SenderId) -> Result<Backend, RepositoryError> {
        Ok(self
            .sessions
            .get(sender)
            .and_then(|r| r.value().model)
            .unwrap_or(self.default_backend))
    }

    async fn selected_model(&self, sender: &SenderId) -> Result<Option<Backend>, RepositoryError> {
        Ok(self.sessions.get(sender).and_then(|r| r.value().model))
    }

    async fn set_model(&self, sender: &SenderId, choice: Backend) -> Result<(), RepositoryError> {
        self.sessions.entry(sender.clone()).or_default().model = Some(choice);
        Ok(())
    }
}
