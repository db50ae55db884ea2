//! Pipeline coordination.
//!
//! The [`Coordinator`] answers a user message by dispatching it through
//! a statically ordered pipeline of agents. The first step receives the
//! raw user message; every later step receives the prior step's
//! published output looked up in session state. Each backend and
//! capability call is wrapped by the retry executor, and a fatal failure
//! at any step collapses the run into a single degraded final event so
//! the caller always gets text back.

use crate::agents::{AgentDefinition, AgentRegistry};
use crate::backend::{BackendRequest, GenerativeBackend};
use crate::capability::{render_snippets, CapabilityRegistry};
use crate::events::{extract_final, Event, EventKind, EventStream};
use crate::retry::RetryExecutor;
use crate::session::{SessionState, SessionStore};
use crate::types::{AppError, Message, Result, TurnOutcome};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Producer name used for events the coordinator synthesizes itself.
const COORDINATOR: &str = "coordinator";

/// How many earlier conversation turns are replayed to each agent.
const HISTORY_WINDOW: usize = 5;

/// Events and final text produced by one agent invocation.
struct AgentRun {
    events: Vec<Event>,
    text: String,
}

/// The orchestration core: a fixed pipeline of agents over a shared
/// session, producing an event stream per run.
pub struct Coordinator {
    registry: Arc<AgentRegistry>,
    capabilities: Arc<CapabilityRegistry>,
    backend: Arc<dyn GenerativeBackend>,
    pipeline: Vec<String>,
    tool_round_trip_cap: usize,
}

impl Coordinator {
    /// Create a coordinator over a validated pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when the pipeline is empty,
    /// references an unregistered agent, or the tool round-trip cap is
    /// zero.
    pub fn new(
        registry: Arc<AgentRegistry>,
        capabilities: Arc<CapabilityRegistry>,
        backend: Arc<dyn GenerativeBackend>,
        pipeline: Vec<String>,
        tool_round_trip_cap: usize,
    ) -> Result<Self> {
        if pipeline.is_empty() {
            return Err(AppError::Configuration(
                "pipeline must contain at least one agent".to_string(),
            ));
        }
        for name in &pipeline {
            if !registry.has_agent(name) {
                return Err(AppError::Configuration(format!(
                    "pipeline references unregistered agent '{name}'"
                )));
            }
        }
        if tool_round_trip_cap < 1 {
            return Err(AppError::Configuration(
                "tool round-trip cap must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            registry,
            capabilities,
            backend,
            pipeline,
            tool_round_trip_cap,
        })
    }

    /// The pipeline order this coordinator executes.
    pub fn pipeline(&self) -> &[String] {
        &self.pipeline
    }

    /// Execute the pipeline for one user message.
    ///
    /// The returned stream carries every intermediate event plus, except
    /// in the protocol-violation case, exactly one final event. Fatal
    /// step failures are converted to a degraded final event rather than
    /// an error; the session keeps whatever state was committed before
    /// the failure.
    pub async fn run(
        &self,
        user_message: &str,
        session: &mut SessionState,
        cancel: &CancellationToken,
    ) -> EventStream {
        let mut stream = EventStream::new();
        // Context from earlier turns; the current message is threaded
        // through step inputs instead so later steps never see it raw.
        let prior_history: Vec<Message> = session.history().to_vec();
        session.append_history(Message::user(user_message));

        let mut prior: Option<(Option<String>, String)> = None;
        let total_steps = self.pipeline.len();

        for (index, name) in self.pipeline.iter().enumerate() {
            if stream.has_final() {
                break;
            }

            let Some(agent) = self.registry.get(name) else {
                // Checked at construction; a miss here is a contract bug.
                tracing::error!(agent = %name, "pipeline references unknown agent");
                break;
            };

            let input = match &prior {
                None => user_message.to_string(),
                Some((output_key, text)) => output_key
                    .as_deref()
                    .and_then(|key| session.get(key))
                    .map(str::to_string)
                    .unwrap_or_else(|| text.clone()),
            };

            tracing::info!(
                agent = %name,
                step = index + 1,
                total = total_steps,
                "running pipeline step"
            );

            match self
                .invoke_agent(agent, &input, &prior_history, cancel)
                .await
            {
                Ok(run) => {
                    for event in run.events {
                        stream.push(event);
                    }

                    if let Some(key) = &agent.output_key {
                        session.publish(key.clone(), run.text.clone());
                    }

                    let is_last = index + 1 == total_steps;
                    stream.push(Event {
                        producer: name.clone(),
                        kind: EventKind::AgentOutput,
                        content: run.text.clone(),
                        is_final: is_last,
                    });
                    if is_last {
                        session.append_history(Message::assistant(run.text.clone()));
                    }
                    prior = Some((agent.output_key.clone(), run.text));
                }
                Err(AppError::Protocol(message)) => {
                    // Surfaced through the extractor's sentinel: the
                    // stream deliberately ends with zero final events.
                    tracing::error!(agent = %name, %message, "protocol violation");
                    break;
                }
                Err(AppError::Cancelled) => {
                    tracing::warn!(agent = %name, "run cancelled");
                    let degraded =
                        "The request was cancelled before an answer could be produced.";
                    stream.push(Event::final_response(COORDINATOR, degraded));
                    session.append_history(Message::assistant(degraded));
                    break;
                }
                Err(error) => {
                    tracing::error!(agent = %name, error = %error, "pipeline step failed");
                    let degraded = format!(
                        "Sorry - I couldn't answer that right now: the '{name}' step \
                         failed after repeated attempts. Please try again later."
                    );
                    stream.push(Event::final_response(COORDINATOR, degraded.clone()));
                    session.append_history(Message::assistant(degraded));
                    break;
                }
            }
        }

        stream
    }

    /// Run one conversation turn inside a store-owned session and
    /// collapse the event stream into the caller-facing result.
    pub async fn run_conversation_turn(
        &self,
        store: &SessionStore,
        session_id: &str,
        user_text: &str,
    ) -> Result<TurnOutcome> {
        let cancel = CancellationToken::new();
        self.run_conversation_turn_with_cancel(store, session_id, user_text, &cancel)
            .await
    }

    /// Like [`run_conversation_turn`](Self::run_conversation_turn), with
    /// a caller-supplied cancellation token so the hosting process can
    /// abort an in-flight turn.
    pub async fn run_conversation_turn_with_cancel(
        &self,
        store: &SessionStore,
        session_id: &str,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome> {
        let handle = store.session(session_id)?;
        let mut session = handle.lock().await;
        Ok(self.run_turn(user_text, &mut session, cancel).await)
    }

    /// Like [`run`](Self::run), but collapses the stream into a
    /// [`TurnOutcome`] whose intermediate outputs are exactly the keys
    /// published during this run.
    pub async fn run_turn(
        &self,
        user_text: &str,
        session: &mut SessionState,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        let stream = self.run(user_text, session, cancel).await;
        let final_text = extract_final(&stream).to_string();

        // An agent output event exists exactly when that step succeeded,
        // which is exactly when its output key (if any) was published.
        // Re-deriving from the stream keeps keys whose re-published value
        // happens to match the prior turn's.
        let intermediate_outputs = stream
            .events()
            .iter()
            .filter(|event| event.kind == EventKind::AgentOutput)
            .filter_map(|event| {
                self.registry
                    .get(&event.producer)
                    .and_then(|agent| agent.output_key.as_ref())
                    .map(|key| (key.clone(), event.content.clone()))
            })
            .collect();

        TurnOutcome {
            final_text,
            intermediate_outputs,
        }
    }

    /// Invoke one agent: call the backend through the retry executor and
    /// resolve tool-call requests against the capability registry until
    /// the backend produces text or the round-trip cap is hit.
    async fn invoke_agent(
        &self,
        agent: &AgentDefinition,
        input: &str,
        prior_history: &[Message],
        cancel: &CancellationToken,
    ) -> Result<AgentRun> {
        let tools = self.capabilities.definitions_for(&agent.capabilities);
        let mut events = Vec::new();

        let mut messages: Vec<Message> = prior_history
            .iter()
            .rev()
            .take(HISTORY_WINDOW)
            .rev()
            .cloned()
            .collect();
        messages.push(Message::user(input));

        let mut round_trips = 0usize;
        loop {
            let request = BackendRequest {
                model: agent.backend.model.clone(),
                instructions: agent.instructions.clone(),
                messages: messages.clone(),
                tools: tools.clone(),
            };

            let response = RetryExecutor::invoke(&agent.backend.retry, cancel, || {
                let backend = Arc::clone(&self.backend);
                let request = request.clone();
                async move { backend.generate(&request).await }
            })
            .await?;

            if !response.is_tool_call() {
                return Ok(AgentRun {
                    events,
                    text: response.content,
                });
            }

            round_trips += 1;
            if round_trips > self.tool_round_trip_cap {
                return Err(AppError::Protocol(format!(
                    "agent '{}' exceeded {} tool round-trips without resolving to text",
                    agent.name, self.tool_round_trip_cap
                )));
            }

            if !response.content.is_empty() {
                messages.push(Message::assistant(response.content.clone()));
            }

            for call in &response.tool_calls {
                if !agent.capabilities.iter().any(|c| c == &call.name) {
                    return Err(AppError::FatalBackend(format!(
                        "agent '{}' requested capability '{}' it was not granted",
                        agent.name, call.name
                    )));
                }
                let capability = self.capabilities.get(&call.name).ok_or_else(|| {
                    AppError::NotFound(format!("capability '{}'", call.name))
                })?;

                let query = call
                    .arguments
                    .get("query")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        AppError::FatalBackend(format!(
                            "tool call '{}' is missing its 'query' argument",
                            call.name
                        ))
                    })?
                    .to_string();

                tracing::debug!(
                    agent = %agent.name,
                    capability = %call.name,
                    query = %query,
                    round_trip = round_trips,
                    "dispatching capability"
                );
                events.push(Event::intermediate(
                    &agent.name,
                    EventKind::ToolCallRequest,
                    format!("{}: {}", call.name, query),
                ));

                let snippets = RetryExecutor::invoke(&agent.backend.retry, cancel, || {
                    let capability = Arc::clone(&capability);
                    let query = query.clone();
                    async move { capability.query(&query).await }
                })
                .await?;

                let rendered = render_snippets(&snippets);
                events.push(Event::intermediate(
                    &agent.name,
                    EventKind::ToolResult,
                    rendered.clone(),
                ));
                messages.push(Message::tool(format!(
                    "Result of {}:\n{}",
                    call.name, rendered
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{AgentDefinition, BackendConfig};
    use crate::backend::BackendResponse;
    use crate::retry::{BackoffStrategy, RetryPolicy};
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticBackend;

    #[async_trait]
    impl GenerativeBackend for StaticBackend {
        async fn generate(&self, _request: &BackendRequest) -> Result<BackendResponse> {
            Ok(BackendResponse::text("ok"))
        }
    }

    fn definition(name: &str) -> AgentDefinition {
        AgentDefinition::new(
            name,
            "instructions",
            BackendConfig {
                model: "test-model".to_string(),
                retry: RetryPolicy::new(
                    1,
                    Duration::from_secs(1),
                    BackoffStrategy::Fixed(Duration::from_millis(1)),
                )
                .unwrap(),
            },
        )
    }

    #[test]
    fn test_rejects_empty_pipeline() {
        let result = Coordinator::new(
            Arc::new(AgentRegistry::new()),
            Arc::new(CapabilityRegistry::new()),
            Arc::new(StaticBackend),
            vec![],
            5,
        );
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_rejects_unregistered_pipeline_agent() {
        let mut registry = AgentRegistry::new();
        registry.register(definition("research-agent")).unwrap();

        let result = Coordinator::new(
            Arc::new(registry),
            Arc::new(CapabilityRegistry::new()),
            Arc::new(StaticBackend),
            vec!["research-agent".to_string(), "missing".to_string()],
            5,
        );
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_rejects_zero_round_trip_cap() {
        let mut registry = AgentRegistry::new();
        registry.register(definition("research-agent")).unwrap();

        let result = Coordinator::new(
            Arc::new(registry),
            Arc::new(CapabilityRegistry::new()),
            Arc::new(StaticBackend),
            vec!["research-agent".to_string()],
            0,
        );
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_single_step_pipeline_produces_final() {
        let mut registry = AgentRegistry::new();
        registry.register(definition("research-agent")).unwrap();

        let coordinator = Coordinator::new(
            Arc::new(registry),
            Arc::new(CapabilityRegistry::new()),
            Arc::new(StaticBackend),
            vec!["research-agent".to_string()],
            5,
        )
        .unwrap();

        let mut session = SessionState::new("s1");
        let cancel = CancellationToken::new();
        let stream = coordinator.run("question", &mut session, &cancel).await;

        assert!(stream.has_final());
        assert_eq!(extract_final(&stream), "ok");
        assert_eq!(session.history().len(), 2);
    }
}
