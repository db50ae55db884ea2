//! Static agent registry.
//!
//! Agents reference each other only through the pipeline order held by
//! the coordinator; the registry is the explicit name-to-definition map
//! that replaces any dynamic call-time wiring. Duplicate names are
//! rejected at registration so every lookup is unambiguous.

use crate::agents::AgentDefinition;
use crate::types::{AppError, Result};
use std::collections::HashMap;

/// Registry mapping agent names to their immutable definitions.
#[derive(Debug, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentDefinition>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent definition.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when an agent with the same
    /// name is already registered. Output-key collisions between
    /// distinct agents are allowed (last writer wins at publish time)
    /// but logged, since they usually indicate a wiring mistake.
    pub fn register(&mut self, agent: AgentDefinition) -> Result<()> {
        if self.agents.contains_key(&agent.name) {
            return Err(AppError::Configuration(format!(
                "agent '{}' is already registered",
                agent.name
            )));
        }

        if let Some(key) = &agent.output_key {
            let colliding = self
                .agents
                .values()
                .find(|other| other.output_key.as_deref() == Some(key.as_str()));
            if let Some(other) = colliding {
                tracing::warn!(
                    key = %key,
                    first = %other.name,
                    second = %agent.name,
                    "two agents publish under the same output key"
                );
            }
        }

        self.agents.insert(agent.name.clone(), agent);
        Ok(())
    }

    /// Look up an agent by name.
    pub fn get(&self, name: &str) -> Option<&AgentDefinition> {
        self.agents.get(name)
    }

    /// Whether an agent is registered.
    pub fn has_agent(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// All registered agent names.
    pub fn agent_names(&self) -> Vec<String> {
        self.agents.keys().cloned().collect()
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::BackendConfig;
    use crate::retry::{BackoffStrategy, RetryPolicy};
    use std::time::Duration;

    fn definition(name: &str) -> AgentDefinition {
        AgentDefinition::new(
            name,
            "instructions",
            BackendConfig {
                model: "test-model".to_string(),
                retry: RetryPolicy::new(
                    1,
                    Duration::from_secs(1),
                    BackoffStrategy::Fixed(Duration::from_millis(10)),
                )
                .unwrap(),
            },
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = AgentRegistry::new();
        registry.register(definition("research-agent")).unwrap();

        assert!(registry.has_agent("research-agent"));
        assert_eq!(
            registry.get("research-agent").unwrap().name,
            "research-agent"
        );
        assert!(registry.get("summarizer-agent").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = AgentRegistry::new();
        registry.register(definition("research-agent")).unwrap();

        let result = registry.register(definition("research-agent"));
        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_output_key_collision_is_not_an_error() {
        let mut registry = AgentRegistry::new();
        registry
            .register(definition("first").with_output_key("shared"))
            .unwrap();
        // Logged, not rejected: last-writer-wins is the defined resolution
        registry
            .register(definition("second").with_output_key("shared"))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }
}
