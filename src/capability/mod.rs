//! External capabilities agents may invoke.
//!
//! A capability is an opaque callable contract at the engine boundary:
//! it takes a query string and returns snippets. The registry exposes
//! capability schemas to the backend as tool definitions and resolves
//! tool-call requests back to the named capability.

pub mod search;

use crate::types::{Result, SearchSnippet, ToolDefinition};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// An external operation an agent may invoke (e.g. web search).
#[async_trait]
pub trait Capability: Send + Sync {
    /// Unique capability name, referenced by agent definitions and by
    /// the backend's tool calls.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the accepted arguments. The default is the engine's
    /// fixed query-string contract.
    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The query to run"
                }
            },
            "required": ["query"]
        })
    }

    /// Run the capability. Failures are retryable unless the
    /// implementation marks them permanent.
    async fn query(&self, query: &str) -> Result<Vec<SearchSnippet>>;
}

/// Registry mapping capability names to implementations.
#[derive(Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under its own name. Last registration wins.
    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        self.capabilities
            .insert(capability.name().to_string(), capability);
    }

    /// Look up a capability by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(name).cloned()
    }

    /// Whether a capability is registered.
    pub fn has(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Tool definitions for the named capabilities, in the order given.
    /// Unknown names are skipped; the coordinator rejects them at
    /// dispatch time instead.
    pub fn definitions_for(&self, names: &[String]) -> Vec<ToolDefinition> {
        names
            .iter()
            .filter_map(|name| self.capabilities.get(name))
            .map(|capability| ToolDefinition {
                name: capability.name().to_string(),
                description: capability.description().to_string(),
                parameters: capability.parameters_schema(),
            })
            .collect()
    }
}

/// Render snippets into the textual form fed back to the backend.
pub fn render_snippets(snippets: &[SearchSnippet]) -> String {
    if snippets.is_empty() {
        return "No results found.".to_string();
    }
    snippets
        .iter()
        .map(|s| match &s.url {
            Some(url) => format!("- {} ({}): {}", s.title, url, s.snippet),
            None => format!("- {}: {}", s.title, s.snippet),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
