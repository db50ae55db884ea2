//! Common types shared across the engine.
//!
//! This module defines the message and tool shapes exchanged with the
//! generative backend, the caller-facing turn result, and the error
//! taxonomy used by the retry layer to classify failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============= Conversation Types =============

/// A single turn in a conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who produced this turn.
    pub role: MessageRole,
    /// The textual content of the turn.
    pub content: String,
    /// When the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with the current timestamp.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Shorthand for a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Shorthand for an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Shorthand for a tool-result turn.
    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Tool, content)
    }
}

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instructions or engine-injected context.
    System,
    /// The end user.
    User,
    /// A model-backed agent.
    Assistant,
    /// The result of an external capability call fed back to the model.
    Tool,
}

// ============= Tool Types =============

/// Schema describing an external capability to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Capability name the backend may request by.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON schema of the accepted arguments.
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the requested capability.
    pub name: String,
    /// Arguments as produced by the model.
    pub arguments: serde_json::Value,
}

/// One result row returned by a search-style capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSnippet {
    /// Result title.
    pub title: String,
    /// Source reference, when the capability provides one.
    pub url: Option<String>,
    /// Extracted text.
    pub snippet: String,
}

// ============= Caller-Facing Types =============

/// The result of one conversation turn.
///
/// `final_text` is the single answer extracted from the run's event
/// stream. `intermediate_outputs` holds exactly the outputs published
/// into session state during this run, keyed by each agent's output key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// The answer returned to the caller.
    pub final_text: String,
    /// Outputs published by pipeline steps during this run.
    pub intermediate_outputs: HashMap<String, String>,
}

// ============= Error Types =============

/// Engine error taxonomy.
///
/// The retry layer only ever retries variants for which
/// [`AppError::is_retryable`] returns true; everything else aborts the
/// current pipeline step immediately.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Transient backend failure (rate limit, 5xx-equivalent).
    #[error("backend error (retryable): {0}")]
    RetryableBackend(String),

    /// Permanent backend failure (malformed request, auth rejection).
    #[error("backend error: {0}")]
    FatalBackend(String),

    /// External capability failure. Retryable unless the capability
    /// signalled a permanent condition.
    #[error("capability '{name}' failed: {message}")]
    Capability {
        /// Capability that failed.
        name: String,
        /// Failure description.
        message: String,
        /// Whether the capability signalled a permanent condition.
        permanent: bool,
    },

    /// A single attempt exceeded its time budget.
    #[error("attempt timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The caller cancelled the run.
    #[error("run cancelled")]
    Cancelled,

    /// Programming-contract bug: a run produced zero final events, or a
    /// tool-call loop exceeded its round-trip cap.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Invalid construction-time configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unknown session, agent, or capability lookup.
    #[error("not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Whether the retry executor may attempt the operation again.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::RetryableBackend(_) | AppError::Timeout(_) => true,
            AppError::Capability { permanent, .. } => !permanent,
            _ => false,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;
