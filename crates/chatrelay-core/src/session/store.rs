//! SessionStore trait definition.
//!
//! Follows the same RPITIT pattern as the other port traits so a persistent
//! implementation can replace the in-memory one without touching callers.

use chatrelay_types::error::RepositoryError;
use chatrelay_types::session::{Backend, SenderId, Turn};

/// Owner of all per-sender conversation state.
///
/// Each mutating operation is a single atomic step on one sender's entry.
/// Callers only ever receive clones; no reference into the store outlives a
/// call.
pub trait SessionStore: Send + Sync {
    /// Full history for `sender`, oldest first.
    ///
    /// The first access for an unseen sender records an empty entry.
    fn get_history(
        &self,
        sender: &SenderId,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Append a turn to the end of the sender's history.
    fn append_turn(
        &self,
        sender: &SenderId,
        turn: Turn,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The last `n` turns in original order (fewer if the history is shorter).
    fn last_n(
        &self,
        sender: &SenderId,
        n: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Replace the history with an empty sequence. The model selection is kept.
    fn reset_history(
        &self,
        sender: &SenderId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The sender's backend, or the store's default when none was selected.
    fn get_model(
        &self,
        sender: &SenderId,
    ) -> impl std::future::Future<Output = Result<Backend, RepositoryError>> + Send;

    /// The explicit selection, if the sender ever made one.
    fn selected_model(
        &self,
        sender: &SenderId,
    ) -> impl std::future::Future<Output = Result<Option<Backend>, RepositoryError>> + Send;

    /// Record the sender's backend choice. Last write wins.
    fn set_model(
        &self,
        sender: &SenderId,
        choice: Backend,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
