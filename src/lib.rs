//! # Tandem - Multi-Agent Research Coordination Engine
//!
//! Tandem answers a user question by sequencing calls to two
//! model-backed sub-agents - a researcher with web search and a
//! summarizer - and returning a single final answer.
//!
//! ## Overview
//!
//! The engine is built from a small set of composable parts:
//!
//! - [`agents`] - immutable agent definitions and the static registry
//! - [`coordinator`] - the pipeline dispatcher producing event streams
//! - [`retry`] - bounded retries, backoff with jitter, per-attempt timeouts
//! - [`session`] - per-conversation keyed state and message history
//! - [`events`] - the run event stream and final-response extraction
//! - [`backend`] - the opaque text-generation contract (Gemini shipped)
//! - [`capability`] - external tools agents may invoke (web search shipped)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tandem::{
//!     agents, backend::gemini::GeminiBackend, capability::search::WebSearchCapability,
//!     capability::CapabilityRegistry, Coordinator, EngineConfig, SessionStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::from_env()?;
//!     let backend = Arc::new(GeminiBackend::new(config.api_key.clone().unwrap()));
//!
//!     let mut capabilities = CapabilityRegistry::new();
//!     capabilities.register(Arc::new(WebSearchCapability::new()));
//!
//!     let (registry, pipeline) = agents::default_pipeline(&config)?;
//!     let coordinator = Coordinator::new(
//!         Arc::new(registry),
//!         Arc::new(capabilities),
//!         backend,
//!         pipeline,
//!         config.tool_round_trip_cap,
//!     )?;
//!
//!     let store = SessionStore::new();
//!     let session_id = store.create_session();
//!     let outcome = coordinator
//!         .run_conversation_turn(&store, &session_id, "What is the capital of France?")
//!         .await?;
//!     println!("{}", outcome.final_text);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Model
//!
//! Transient backend and capability failures are absorbed by the retry
//! layer up to each agent's attempt budget. A step that still fails
//! collapses the run into a degraded final event - the caller always
//! receives text, never an unhandled fault. A run that produces zero
//! final events (a protocol violation, e.g. an unbounded tool-call
//! loop) resolves to the [`events::NO_FINAL_RESPONSE`] sentinel.

#![warn(missing_docs)]

/// Agent definitions and the static agent registry.
pub mod agents;
/// Generative backend contract and the Gemini implementation.
pub mod backend;
/// External capabilities (web search) and their registry.
pub mod capability;
/// Environment-driven engine configuration.
pub mod config;
/// The pipeline coordinator.
pub mod coordinator;
/// Run event streams and final-response extraction.
pub mod events;
/// Bounded retry with backoff and timeouts.
pub mod retry;
/// Session state and the process-wide session store.
pub mod session;
/// Shared types and the error taxonomy.
pub mod types;

// Re-export commonly used types
pub use agents::{AgentDefinition, AgentRegistry, BackendConfig};
pub use backend::{BackendRequest, BackendResponse, GenerativeBackend};
pub use capability::{Capability, CapabilityRegistry};
pub use config::EngineConfig;
pub use coordinator::Coordinator;
pub use events::{extract_final, Event, EventKind, EventStream, NO_FINAL_RESPONSE};
pub use retry::{BackoffStrategy, RetryExecutor, RetryPolicy};
pub use session::{SessionState, SessionStore};
pub use types::{AppError, Message, MessageRole, Result, SearchSnippet, ToolCall, ToolDefinition, TurnOutcome};
