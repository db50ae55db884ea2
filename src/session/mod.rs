//! Conversation session state.
//!
//! A [`SessionState`] is the only mutable shared resource in a run: a
//! keyed store of published agent outputs plus the append-only message
//! history. The [`SessionStore`] is the process-wide owner of sessions;
//! the coordinator holds a session exclusively for the duration of a run
//! via the store's per-session lock.

use crate::types::{AppError, Message, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Mutable, keyed state scoped to one conversation.
#[derive(Debug)]
pub struct SessionState {
    id: String,
    published: HashMap<String, String>,
    history: Vec<Message>,
}

impl SessionState {
    /// Create a fresh session with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            published: HashMap::new(),
            history: Vec::new(),
        }
    }

    /// The opaque session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Publish an agent output under its output key. Latest value wins;
    /// overwriting an existing key is allowed but logged, since distinct
    /// agents sharing a key usually indicates a wiring mistake.
    pub fn publish(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if self.published.contains_key(&key) {
            tracing::warn!(key = %key, "overwriting previously published output");
        }
        self.published.insert(key, value.into());
    }

    /// Look up a published output.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.published.get(key).map(String::as_str)
    }

    /// All published outputs.
    pub fn published(&self) -> &HashMap<String, String> {
        &self.published
    }

    /// Append a turn to the conversation history.
    pub fn append_history(&mut self, message: Message) {
        self.history.push(message);
    }

    /// The full conversation history, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

/// Process-wide owner of session state.
///
/// Sessions are created explicitly, live until explicitly removed, and
/// are handed out behind a `tokio::sync::Mutex` so a coordinator run can
/// hold one across await points without blocking the store itself.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<tokio::sync::Mutex<SessionState>>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with a generated identifier and return the id.
    pub fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.write().insert(
            id.clone(),
            Arc::new(tokio::sync::Mutex::new(SessionState::new(id.clone()))),
        );
        id
    }

    /// Fetch a handle to an existing session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown id.
    pub fn session(&self, id: &str) -> Result<Arc<tokio::sync::Mutex<SessionState>>> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("session '{id}'")))
    }

    /// Remove a session. Teardown is the hosting process's decision; the
    /// engine never removes sessions on its own.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.write().remove(id).is_some()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
