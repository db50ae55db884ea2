//! Agent definitions.
//!
//! An [`AgentDefinition`] is the immutable description of one callable
//! unit: its name, instructions, backend configuration, the capabilities
//! it may invoke, and the session key its output is published under.
//! The engine never mutates definitions after registration.

pub mod registry;

pub use registry::AgentRegistry;

use crate::config::EngineConfig;
use crate::retry::RetryPolicy;
use crate::types::Result;

/// Name of the reference research agent.
pub const RESEARCH_AGENT: &str = "research-agent";
/// Name of the reference summarizer agent.
pub const SUMMARIZER_AGENT: &str = "summarizer-agent";
/// Session key the research agent publishes its findings under.
pub const RESEARCH_FINDINGS_KEY: &str = "research_findings";

/// Backend parameters for one agent.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Model identifier passed through to the backend.
    pub model: String,
    /// Retry, backoff, and timeout parameters for this agent's calls.
    pub retry: RetryPolicy,
}

/// Immutable description of one callable agent.
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    /// Unique name within a coordinator's registry.
    pub name: String,
    /// Static behavior-guiding text, opaque to the engine.
    pub instructions: String,
    /// Model and retry configuration.
    pub backend: BackendConfig,
    /// Ordered names of external capabilities this agent may invoke.
    pub capabilities: Vec<String>,
    /// Session key to publish this agent's final text under, if any.
    pub output_key: Option<String>,
}

impl AgentDefinition {
    /// Create a definition with no capabilities and no output key.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        backend: BackendConfig,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            backend,
            capabilities: Vec::new(),
            output_key: None,
        }
    }

    /// Grant an external capability by name.
    pub fn with_capability(mut self, name: impl Into<String>) -> Self {
        self.capabilities.push(name.into());
        self
    }

    /// Publish this agent's output under the given session key.
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }
}

/// The reference research agent: searches the web and returns findings
/// as sourced bullet points, published under
/// [`RESEARCH_FINDINGS_KEY`].
pub fn research_agent(config: &EngineConfig) -> Result<AgentDefinition> {
    let instructions = r#"You are a research specialist.
- Use web_search when needed to answer the user's query.
- Return your findings as clear bullet points.
- Include sources in parentheses after each key point."#;

    Ok(AgentDefinition::new(
        RESEARCH_AGENT,
        instructions,
        BackendConfig {
            model: config.model.clone(),
            retry: config.retry_policy()?,
        },
    )
    .with_capability("web_search")
    .with_output_key(RESEARCH_FINDINGS_KEY))
}

/// The reference summarizer agent: turns research notes into a concise
/// user-facing answer. Its output is the run's final event, so it has
/// no output key.
pub fn summarizer_agent(config: &EngineConfig) -> Result<AgentDefinition> {
    let instructions = r#"You will receive research notes (bullets + sources).
- Write a concise, friendly explanation for the user in Markdown.
- Focus on clarity, not length.
- You may include 1-2 key sources if helpful."#;

    Ok(AgentDefinition::new(
        SUMMARIZER_AGENT,
        instructions,
        BackendConfig {
            model: config.model.clone(),
            retry: config.retry_policy()?,
        },
    ))
}

/// Build the reference two-step registry and its pipeline order.
pub fn default_pipeline(config: &EngineConfig) -> Result<(AgentRegistry, Vec<String>)> {
    let mut registry = AgentRegistry::new();
    registry.register(research_agent(config)?)?;
    registry.register(summarizer_agent(config)?)?;
    Ok((
        registry,
        vec![RESEARCH_AGENT.to_string(), SUMMARIZER_AGENT.to_string()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let config = EngineConfig::default();
        let agent = research_agent(&config).unwrap();

        assert_eq!(agent.name, RESEARCH_AGENT);
        assert_eq!(agent.capabilities, vec!["web_search".to_string()]);
        assert_eq!(agent.output_key.as_deref(), Some(RESEARCH_FINDINGS_KEY));
        assert!(agent.instructions.contains("research specialist"));
    }

    #[test]
    fn test_summarizer_has_no_output_key() {
        let config = EngineConfig::default();
        let agent = summarizer_agent(&config).unwrap();
        assert!(agent.output_key.is_none());
        assert!(agent.capabilities.is_empty());
    }

    #[test]
    fn test_default_pipeline_order() {
        let config = EngineConfig::default();
        let (registry, pipeline) = default_pipeline(&config).unwrap();
        assert_eq!(pipeline, vec![RESEARCH_AGENT, SUMMARIZER_AGENT]);
        assert!(registry.has_agent(RESEARCH_AGENT));
        assert!(registry.has_agent(SUMMARIZER_AGENT));
    }
}
