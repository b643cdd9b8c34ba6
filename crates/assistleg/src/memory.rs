//! Conversation memory shared by every agent in the process.
//!
//! Histories are keyed by session id and created on first use. A session's history is
//! locked for the whole turn, so concurrent turns of one session run one after the other
//! and never interleave their records.
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::executor::{Respond, TurnOutcome};
use crate::models::turn::Turn;

lazy_static! {
    static ref GLOBAL_STORE: Arc<ConversationStore> = Arc::new(ConversationStore::new());
}

type History = Arc<Mutex<Vec<Turn>>>;

#[derive(Debug, Default)]
pub struct ConversationStore {
    sessions: Mutex<HashMap<String, History>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The store that lives for the whole process
    pub fn global() -> Arc<Self> {
        GLOBAL_STORE.clone()
    }

    async fn session(&self, session_id: &str) -> History {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    /// A snapshot of a session's turns, oldest first
    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        let session = self.session(session_id).await;
        let turns = session.lock().await;
        turns.clone()
    }

    pub async fn append(&self, session_id: &str, turns: impl IntoIterator<Item = Turn>) {
        let session = self.session(session_id).await;
        session.lock().await.extend(turns);
    }

    pub async fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Feeds a responder the session history and records each exchange afterwards
pub struct WithMemory<R> {
    inner: R,
    store: Arc<ConversationStore>,
}

impl<R: Respond> WithMemory<R> {
    pub fn new(inner: R, store: Arc<ConversationStore>) -> Self {
        Self { inner, store }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub async fn invoke(&self, session_id: &str, question: &str) -> TurnOutcome {
        let session = self.store.session(session_id).await;
        let mut history = session.lock().await;

        let outcome = self.inner.respond(question, &history).await;

        // Empty questions leave no trace
        if outcome != TurnOutcome::NoInput {
            history.push(Turn::user(question.trim()));
            history.push(Turn::assistant(outcome.text()));
        }
        tracing::debug!(session = session_id, turns = history.len(), "turn recorded");
        outcome
    }
}
