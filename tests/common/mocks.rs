//! Mock implementations for testing.
//!
//! Provides a scripted backend and a recording capability so
//! coordinator behavior can be tested without a real model or network.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use tandem::{
    AppError, BackendRequest, BackendResponse, Capability, GenerativeBackend, Result,
    SearchSnippet, ToolCall,
};

/// One pre-scripted backend reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Plain text response.
    Text(String),
    /// A tool-call request for the named capability.
    ToolCall { name: String, query: String },
    /// A transient failure.
    Retryable(String),
    /// A permanent failure.
    Fatal(String),
    /// Never resolves; used to exercise per-attempt timeouts.
    Hang,
}

/// Backend that replays a fixed script and records every request.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<BackendRequest>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<ScriptedReply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// How many times the backend was called.
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Every request received, in call order.
    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, request: &BackendRequest) -> Result<BackendResponse> {
        self.requests.lock().push(request.clone());
        let reply = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::Fatal("script exhausted".to_string()));

        match reply {
            ScriptedReply::Text(text) => Ok(BackendResponse::text(text)),
            ScriptedReply::ToolCall { name, query } => Ok(BackendResponse {
                content: String::new(),
                tool_calls: vec![ToolCall {
                    name,
                    arguments: json!({ "query": query }),
                }],
                finish_reason: "tool_calls".to_string(),
            }),
            ScriptedReply::Retryable(message) => Err(AppError::RetryableBackend(message)),
            ScriptedReply::Fatal(message) => Err(AppError::FatalBackend(message)),
            ScriptedReply::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

/// Capability that records queries and returns fixed snippets, with an
/// optional number of transient failures before the first success.
pub struct RecordingCapability {
    name: String,
    snippets: Vec<SearchSnippet>,
    attempts: Mutex<usize>,
    queries: Mutex<Vec<String>>,
    failures_before_success: Mutex<usize>,
}

impl RecordingCapability {
    pub fn new(name: &str, snippets: Vec<SearchSnippet>) -> Self {
        Self {
            name: name.to_string(),
            snippets,
            attempts: Mutex::new(0),
            queries: Mutex::new(Vec::new()),
            failures_before_success: Mutex::new(0),
        }
    }

    /// Fail transiently the first `n` times before succeeding.
    pub fn with_failures(self, n: usize) -> Self {
        *self.failures_before_success.lock() = n;
        self
    }

    /// Total invocation attempts, including failed ones.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    /// Queries from successful invocations, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl Capability for RecordingCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Recording capability for tests"
    }

    async fn query(&self, query: &str) -> Result<Vec<SearchSnippet>> {
        *self.attempts.lock() += 1;

        let mut failures = self.failures_before_success.lock();
        if *failures > 0 {
            *failures -= 1;
            return Err(AppError::Capability {
                name: self.name.clone(),
                message: "simulated transient failure".to_string(),
                permanent: false,
            });
        }
        drop(failures);

        self.queries.lock().push(query.to_string());
        Ok(self.snippets.clone())
    }
}

/// A single snippet, convenient for scenario setup.
pub fn snippet(title: &str, url: &str, text: &str) -> SearchSnippet {
    SearchSnippet {
        title: title.to_string(),
        url: Some(url.to_string()),
        snippet: text.to_string(),
    }
}
