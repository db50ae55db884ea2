//! Gemini `generateContent` backend client.

use crate::backend::{BackendRequest, BackendResponse, GenerativeBackend};
use crate::types::{AppError, MessageRole, Result, ToolCall};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

/// Public Gemini API endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiBackend {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl GeminiBackend {
    /// Create a client against the public API endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_api_base(api_key, DEFAULT_API_BASE)
    }

    /// Create a client against a custom endpoint (proxies, test servers).
    pub fn with_api_base(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            api_base: api_base.into(),
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(&self, request: &BackendRequest) -> Result<BackendResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, request.model
        );
        let body = build_request_body(request);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::RetryableBackend(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &detail));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::RetryableBackend(format!("malformed response body: {e}")))?;

        extract_response(parsed)
    }
}

/// Build the JSON body for one generation call.
fn build_request_body(request: &BackendRequest) -> Value {
    let contents: Vec<Value> = request
        .messages
        .iter()
        .map(|message| {
            // Gemini only distinguishes "user" and "model"; tool results
            // are fed back as user turns.
            let role = match message.role {
                MessageRole::Assistant => "model",
                _ => "user",
            };
            json!({
                "role": role,
                "parts": [{"text": message.content}],
            })
        })
        .collect();

    let mut body = json!({
        "systemInstruction": {"parts": [{"text": request.instructions}]},
        "contents": contents,
    });

    if !request.tools.is_empty() {
        let declarations: Vec<Value> = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                })
            })
            .collect();
        body["tools"] = json!([{"functionDeclarations": declarations}]);
    }

    body
}

/// Map an HTTP failure status onto the error taxonomy.
fn classify_status(status: u16, detail: &str) -> AppError {
    match status {
        408 | 429 => AppError::RetryableBackend(format!("status {status}: {detail}")),
        500..=599 => AppError::RetryableBackend(format!("status {status}: {detail}")),
        _ => AppError::FatalBackend(format!("status {status}: {detail}")),
    }
}

fn extract_response(parsed: GenerateContentResponse) -> Result<BackendResponse> {
    let candidate = parsed
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| AppError::RetryableBackend("backend returned no candidates".to_string()))?;

    let mut content = String::new();
    let mut tool_calls = Vec::new();

    for part in candidate
        .content
        .and_then(|c| c.parts)
        .unwrap_or_default()
    {
        if let Some(text) = part.text {
            content.push_str(&text);
        }
        if let Some(call) = part.function_call {
            tool_calls.push(ToolCall {
                name: call.name,
                arguments: call.args.unwrap_or(Value::Null),
            });
        }
    }

    if content.is_empty() && tool_calls.is_empty() {
        return Err(AppError::RetryableBackend(
            "backend returned an empty candidate".to_string(),
        ));
    }

    let finish_reason = candidate
        .finish_reason
        .unwrap_or_else(|| if tool_calls.is_empty() { "stop" } else { "tool_calls" }.to_string());

    Ok(BackendResponse {
        content,
        tool_calls,
        finish_reason,
    })
}

// ============= Wire Types =============

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    args: Option<Value>,
}
