//! Keyed session store with per-conversation mutual exclusion.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use concierge_types::{Session, SharedKnowledge};

/// Owns every live session, keyed by conversation identifier.
///
/// Each session sits behind its own `Mutex`: a turn holds the session lock
/// from first read to final state commit, so two near-simultaneous messages
/// from the same user serialize while different users proceed
/// independently. The outer map lock is held only for the lookup.
///
/// Sessions are created lazily and never evicted here; retention is the
/// caller's concern.
pub struct SessionStore {
    knowledge: SharedKnowledge,
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    /// Create a store whose sessions share `knowledge`.
    pub fn new(knowledge: SharedKnowledge) -> Self {
        Self {
            knowledge,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the session for `conversation_id`, creating it at the root
    /// menu on first contact.
    pub async fn get_or_create(&self, conversation_id: &str) -> Arc<Mutex<Session>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(conversation_id.to_string())
            .or_insert_with(|| {
                debug!(conversation_id, "Creating session");
                Arc::new(Mutex::new(Session::new(self.knowledge.clone())))
            })
            .clone()
    }

    /// The shared knowledge handle injected into every session.
    pub fn knowledge(&self) -> &SharedKnowledge {
        &self.knowledge
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether any session exists.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_types::TurnMode;

    #[tokio::test]
    async fn test_get_or_create_reuses_sessions() {
        let store = SessionStore::new(SharedKnowledge::default());

        let first = store.get_or_create("user-1").await;
        first.lock().await.mode = TurnMode::AwaitingQuestion;

        let again = store.get_or_create("user-1").await;
        assert_eq!(again.lock().await.mode, TurnMode::AwaitingQuestion);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_identifiers_get_distinct_sessions() {
        let store = SessionStore::new(SharedKnowledge::default());

        let a = store.get_or_create("user-a").await;
        a.lock().await.mode = TurnMode::AwaitingNps;
        let b = store.get_or_create("user-b").await;

        assert_eq!(b.lock().await.mode, TurnMode::initial());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_same_session_turns_serialize() {
        let store = Arc::new(SessionStore::new(SharedKnowledge::default()));

        let session = store.get_or_create("user-1").await;
        let guard = session.lock().await;

        // While one turn holds the lock, a second handle can be fetched
        // but its turn cannot start.
        let other = store.get_or_create("user-1").await;
        assert!(other.try_lock().is_err());
        drop(guard);
        assert!(other.try_lock().is_ok());
    }
}
