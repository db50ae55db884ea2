//! Generative backend abstraction.
//!
//! The engine treats text generation as an opaque capability: it hands
//! the backend an instruction block, a conversation, and the tool
//! schemas the current agent may use, and gets back either text or a
//! tool-call request. [`gemini::GeminiBackend`] is the shipped
//! implementation; tests substitute scripted backends.

pub mod gemini;

use crate::types::{Message, Result, ToolCall, ToolDefinition};
use async_trait::async_trait;

/// One generation request on behalf of an agent.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// Model identifier from the agent's backend configuration.
    pub model: String,
    /// The agent's static instructions, passed through unmodified.
    pub instructions: String,
    /// Conversation input, oldest first.
    pub messages: Vec<Message>,
    /// Tools the agent is allowed to invoke; empty when the agent has no
    /// capabilities.
    pub tools: Vec<ToolDefinition>,
}

/// The backend's reply: text, a tool-call request, or both.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    /// Generated text; may be empty when the model only requested tools.
    pub content: String,
    /// Tool invocations the model asked for.
    pub tool_calls: Vec<ToolCall>,
    /// Why generation stopped (e.g. "stop", "tool_calls").
    pub finish_reason: String,
}

impl BackendResponse {
    /// Plain text reply with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            finish_reason: "stop".to_string(),
        }
    }

    /// Whether this response is a tool-call request that needs a
    /// capability round-trip before the agent can resolve to text.
    pub fn is_tool_call(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Opaque text-generation contract.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Run one generation call. Implementations classify their failures
    /// as retryable or fatal through the
    /// [`AppError`](crate::types::AppError) taxonomy.
    async fn generate(&self, request: &BackendRequest) -> Result<BackendResponse>;
}
