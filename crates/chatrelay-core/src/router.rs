//! Response routing for content messages.
//!
//! `ResponseRouter::respond` records the user's turn, builds the context
//! window from the most recent turns, calls the sender's backend and records
//! the reply. Messages from the same sender are serialized by a per-sender
//! lock held for the whole sequence; the store itself is never locked while
//! the backend call is in flight.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use chatrelay_types::error::BackendError;
use chatrelay_types::session::{SenderId, Turn};

use crate::backend::BackendRegistry;
use crate::session::SessionStore;

/// Default number of turns passed to the backend as context.
pub const DEFAULT_CONTEXT_TURNS: usize = 4;

/// Default upper bound on one backend call.
pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(120);

/// Render turns as a newline-joined `"<Role>: <content>"` transcript.
pub fn format_context(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(Turn::transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// One async mutex per sender, created on first use and dropped again once
/// no task holds or waits for it.
#[derive(Debug, Default)]
pub struct SenderLocks {
    locks: DashMap<SenderId, Arc<Mutex<()>>>,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `sender`'s conversation.
    ///
    /// The `DashMap` guard is released before awaiting the mutex.
    pub async fn acquire(&self, sender: &SenderId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.entry(sender.clone()).or_default().value());
        lock.lock_owned().await
    }

    /// Drop `sender`'s lock if nobody holds or waits for it.
    ///
    /// Holders and waiters own a clone of the `Arc`, so a strong count of one
    /// means only the map refers to it. `remove_if` runs under the shard lock,
    /// the same lock `acquire` takes to clone, so no waiter can slip in.
    pub fn release(&self, sender: &SenderId) {
        self.locks
            .remove_if(sender, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Number of senders that have a lock allocated.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Routes content messages to the sender's selected backend.
pub struct ResponseRouter<S: SessionStore> {
    store: Arc<S>,
    backends: BackendRegistry,
    locks: SenderLocks,
    context_turns: usize,
    timeout: Duration,
}

impl<S: SessionStore> ResponseRouter<S> {
    pub fn new(store: Arc<S>, backends: BackendRegistry) -> Self {
        Self {
            store,
            backends,
            locks: SenderLocks::new(),
            context_turns: DEFAULT_CONTEXT_TURNS,
            timeout: DEFAULT_BACKEND_TIMEOUT,
        }
    }

    pub fn with_context_turns(mut self, turns: usize) -> Self {
        self.context_turns = turns;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    /// Produce a reply to `text` from `sender`'s backend.
    ///
    /// On failure no bot turn is recorded; the user turn stays in history.
    pub async fn respond(&self, sender: &SenderId, text: &str) -> Result<String, BackendError> {
        let guard = self.locks.acquire(sender).await;
        let result = self.respond_locked(sender, text).await;
        drop(guard);
        self.locks.release(sender);
        result
    }

    async fn respond_locked(&self, sender: &SenderId, text: &str) -> Result<String, BackendError> {
        self.store.append_turn(sender, Turn::user(text)).await?;

        let recent = self.store.last_n(sender, self.context_turns).await?;
        let context = format_context(&recent);
        let model = self.store.get_model(sender).await?;
        let backend = self.backends.get(model)?;

        info!(%sender, backend = %model, context_turns = recent.len(), "routing message to backend");

        let reply = match tokio::time::timeout(self.timeout, backend.generate(text, &context)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(%sender, backend = %model, timeout_secs = self.timeout.as_secs(), "backend call timed out");
                return Err(BackendError::Timeout(self.timeout.as_secs()));
            }
        };

        self.store.append_turn(sender, Turn::bot(reply.clone())).await?;
        debug!(%sender, backend = %model, reply_len = reply.len(), "backend reply recorded");

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chatrelay_types::session::Backend;

    use crate::backend::GenerationBackend;
    use crate::session::InMemorySessionStore;

    /// Records every call and answers with a fixed reply or error.
    #[derive(Clone, Default)]
    struct Scripted {
        calls: Arc<StdMutex<Vec<(String, String)>>>,
        fail: bool,
        reply: &'static str,
    }

    impl Scripted {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply,
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GenerationBackend for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str, context: &str) -> Result<String, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), context.to_string()));
            if self.fail {
                Err(BackendError::Status {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(self.reply.to_string())
            }
        }
    }

    struct Slow;

    impl GenerationBackend for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        async fn generate(&self, _prompt: &str, _context: &str) -> Result<String, BackendError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("late".to_string())
        }
    }

    fn sender() -> SenderId {
        SenderId::new("15550001")
    }

    #[test]
    fn test_format_context() {
        assert_eq!(format_context(&[]), "");
        assert_eq!(
            format_context(&[Turn::user("hi"), Turn::bot("hello")]),
            "User: hi\nBot: hello"
        );
    }

    #[tokio::test]
    async fn test_respond_records_both_turns() {
        let store = Arc::new(InMemorySessionStore::default());
        let gemini = Scripted::replying("A contract is...");
        let router = ResponseRouter::new(
            store.clone(),
            BackendRegistry::new().with(Backend::Gemini, gemini.clone()),
        );

        let reply = router.respond(&sender(), "What is a contract?").await.unwrap();

        assert_eq!(reply, "A contract is...");
        assert_eq!(
            store.get_history(&sender()).await.unwrap(),
            vec![Turn::user("What is a contract?"), Turn::bot("A contract is...")]
        );
        let calls = gemini.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "What is a contract?");
        assert_eq!(calls[0].1, "User: What is a contract?");
    }

    #[tokio::test]
    async fn test_respond_uses_last_four_turns() {
        let store = Arc::new(InMemorySessionStore::default());
        let s = sender();
        for turn in [Turn::user("U1"), Turn::bot("B1"), Turn::user("U2"), Turn::bot("B2")] {
            store.append_turn(&s, turn).await.unwrap();
        }
        let gemini = Scripted::replying("B3");
        let router = ResponseRouter::new(
            store.clone(),
            BackendRegistry::new().with(Backend::Gemini, gemini.clone()),
        );

        router.respond(&s, "U3").await.unwrap();

        assert_eq!(gemini.calls()[0].1, "Bot: B1\nUser: U2\nBot: B2\nUser: U3");
    }

    #[tokio::test]
    async fn test_respond_routes_to_selected_backend() {
        let store = Arc::new(InMemorySessionStore::default());
        store.set_model(&sender(), Backend::Ollama).await.unwrap();
        let gemini = Scripted::replying("from gemini");
        let ollama = Scripted::replying("from ollama");
        let router = ResponseRouter::new(
            store.clone(),
            BackendRegistry::new()
                .with(Backend::Gemini, gemini.clone())
                .with(Backend::Ollama, ollama.clone()),
        );

        assert_eq!(router.respond(&sender(), "hi").await.unwrap(), "from ollama");
        assert!(gemini.calls().is_empty());
        assert_eq!(ollama.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_keeps_user_turn_only() {
        let store = Arc::new(InMemorySessionStore::default());
        let router = ResponseRouter::new(
            store.clone(),
            BackendRegistry::new().with(Backend::Gemini, Scripted::failing()),
        );

        let err = router.respond(&sender(), "hello?").await.unwrap_err();

        assert!(matches!(err, BackendError::Status { status: 500, .. }));
        assert_eq!(
            store.get_history(&sender()).await.unwrap(),
            vec![Turn::user("hello?")]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_backend_is_an_error() {
        let store = Arc::new(InMemorySessionStore::default());
        let router = ResponseRouter::new(store.clone(), BackendRegistry::new());

        let err = router.respond(&sender(), "hi").await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(_)));
        assert_eq!(store.get_history(&sender()).await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_timeout() {
        let store = Arc::new(InMemorySessionStore::default());
        let router = ResponseRouter::new(
            store.clone(),
            BackendRegistry::new().with(Backend::Gemini, Slow),
        )
        .with_timeout(Duration::from_secs(5));

        let err = router.respond(&sender(), "hi").await.unwrap_err();
        assert!(matches!(err, BackendError::Timeout(5)));
        assert_eq!(
            store.get_history(&sender()).await.unwrap(),
            vec![Turn::user("hi")]
        );
    }

    #[tokio::test]
    async fn test_context_turns_is_configurable() {
        let store = Arc::new(InMemorySessionStore::default());
        let s = sender();
        store.append_turn(&s, Turn::user("old")).await.unwrap();
        let gemini = Scripted::replying("ok");
        let router = ResponseRouter::new(
            store.clone(),
            BackendRegistry::new().with(Backend::Gemini, gemini.clone()),
        )
        .with_context_turns(1);

        router.respond(&s, "new").await.unwrap();
        assert_eq!(gemini.calls()[0].1, "User: new");
    }

    /// Counts how many calls are in flight at once.
    #[derive(Clone, Default)]
    struct Overlap {
        active: Arc<AtomicUsize>,
        max_seen: Arc<AtomicUsize>,
    }

    impl GenerationBackend for Overlap {
        fn name(&self) -> &str {
            "overlap"
        }

        async fn generate(&self, prompt: &str, _context: &str) -> Result<String, BackendError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(format!("re: {prompt}"))
        }
    }

    #[tokio::test]
    async fn test_same_sender_messages_are_serialized() {
        let store = Arc::new(InMemorySessionStore::default());
        let backend = Overlap::default();
        let router = Arc::new(ResponseRouter::new(
            store.clone(),
            BackendRegistry::new().with(Backend::Gemini, backend.clone()),
        ));

        let mut handles = Vec::new();
        for i in 0..5 {
            let router = Arc::clone(&router);
            handles.push(tokio::spawn(async move {
                router.respond(&sender(), &format!("q{i}")).await.unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(backend.max_seen.load(Ordering::SeqCst), 1);

        // Every user turn is immediately followed by its own reply.
        let history = store.get_history(&sender()).await.unwrap();
        assert_eq!(history.len(), 10);
        for pair in history.chunks(2) {
            assert_eq!(pair[1].content, format!("re: {}", pair[0].content));
        }
    }

    #[tokio::test]
    async fn test_different_senders_run_concurrently() {
        let store = Arc::new(InMemorySessionStore::default());
        let backend = Overlap::default();
        let router = Arc::new(ResponseRouter::new(
            store.clone(),
            BackendRegistry::new().with(Backend::Gemini, backend.clone()),
        ));

        let mut handles = Vec::new();
        for i in 0..4 {
            let router = Arc::clone(&router);
            handles.push(tokio::spawn(async move {
                router
                    .respond(&SenderId::new(format!("sender-{i}")), "hi")
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert!(backend.max_seen.load(Ordering::SeqCst) >= 1);
        assert_eq!(store.len(), 4);
        assert!(router.locks.is_empty());
    }

    #[tokio::test]
    async fn test_sender_lock_kept_while_held_or_awaited() {
        let locks = Arc::new(SenderLocks::new());
        let guard = locks.acquire(&sender()).await;

        locks.release(&sender());
        assert_eq!(locks.len(), 1);

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.acquire(&sender()).await;
            })
        };
        // Let the waiter clone the lock and park on it.
        while Arc::strong_count(locks.locks.get(&sender()).unwrap().value()) < 3 {
            tokio::task::yield_now().await;
        }

        drop(guard);
        locks.release(&sender());
        waiter.await.unwrap();
        locks.release(&sender());
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_lock_map_drains_after_responses() {
        let store = Arc::new(InMemorySessionStore::default());
        let router = ResponseRouter::new(
            store,
            BackendRegistry::new().with(Backend::Gemini, Overlap::default()),
        );
        for i in 0..3 {
            router
                .respond(&SenderId::new(format!("s{i}")), "hi")
                .await
                .unwrap();
        }
        assert!(router.locks.is_empty());
    }
}
