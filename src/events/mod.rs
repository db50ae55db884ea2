//! Run event stream.
//!
//! Every coordinator run produces an ordered [`EventStream`]: agent
//! outputs, tool-call requests, tool results, and exactly one terminal
//! event carrying the final answer. The stream is append-only during a
//! run and read-only afterwards.

mod extractor;

pub use extractor::{extract_final, NO_FINAL_RESPONSE};

/// What a single event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Text produced by an agent (or the degraded message synthesized by
    /// the coordinator).
    AgentOutput,
    /// The backend asked for an external capability.
    ToolCallRequest,
    /// The capability's result, as fed back to the backend.
    ToolResult,
}

/// One entry in a run's event stream.
#[derive(Debug, Clone)]
pub struct Event {
    /// Agent name, or `"coordinator"` for synthesized events.
    pub producer: String,
    /// What this event carries.
    pub kind: EventKind,
    /// Textual payload.
    pub content: String,
    /// Marks the terminal event of the run. At most one event per run
    /// carries this flag.
    pub is_final: bool,
}

impl Event {
    /// An intermediate (non-terminal) event.
    pub fn intermediate(producer: impl Into<String>, kind: EventKind, content: impl Into<String>) -> Self {
        Self {
            producer: producer.into(),
            kind,
            content: content.into(),
            is_final: false,
        }
    }

    /// The terminal event of a run.
    pub fn final_response(producer: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            producer: producer.into(),
            kind: EventKind::AgentOutput,
            content: content.into(),
            is_final: true,
        }
    }
}

/// Ordered, appendable sequence of events for one coordinator run.
#[derive(Debug, Default)]
pub struct EventStream {
    events: Vec<Event>,
}

impl EventStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Appending a second final event is a contract
    /// violation and is logged rather than silently accepted.
    pub fn push(&mut self, event: Event) {
        if event.is_final && self.has_final() {
            tracing::error!(
                producer = %event.producer,
                "protocol violation: second final event appended to stream"
            );
        }
        self.events.push(event);
    }

    /// All events in production order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Whether a terminal event has been produced.
    pub fn has_final(&self) -> bool {
        self.events.iter().any(|e| e.is_final)
    }

    /// The terminal event, if any.
    pub fn final_event(&self) -> Option<&Event> {
        self.events.iter().find(|e| e.is_final)
    }

    /// Number of events in the stream.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the stream is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_keep_production_order() {
        let mut stream = EventStream::new();
        stream.push(Event::intermediate(
            "research-agent",
            EventKind::ToolCallRequest,
            "web_search: rust",
        ));
        stream.push(Event::intermediate(
            "research-agent",
            EventKind::ToolResult,
            "results",
        ));
        stream.push(Event::final_response("summarizer-agent", "done"));

        assert_eq!(stream.len(), 3);
        assert_eq!(stream.events()[0].kind, EventKind::ToolCallRequest);
        assert_eq!(stream.events()[2].content, "done");
        assert!(stream.has_final());
    }

    #[test]
    fn test_final_event_lookup() {
        let mut stream = EventStream::new();
        assert!(stream.final_event().is_none());

        stream.push(Event::intermediate(
            "research-agent",
            EventKind::AgentOutput,
            "notes",
        ));
        stream.push(Event::final_response("summarizer-agent", "answer"));

        let terminal = stream.final_event().unwrap();
        assert_eq!(terminal.producer, "summarizer-agent");
        assert_eq!(terminal.content, "answer");
    }
}
