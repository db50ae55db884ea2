//! Final-response extraction.

use super::EventStream;

/// Fallback text returned when a run produced no terminal event.
///
/// Surfacing this sentinel is a degraded outcome, not a failure: the
/// caller always receives text, never an unhandled fault.
pub const NO_FINAL_RESPONSE: &str = "no final response produced";

/// Scan a run's events in order and return the terminal, non-empty
/// textual payload.
///
/// A stream with no final event is a protocol violation by whoever
/// produced it; it is logged here and resolved to [`NO_FINAL_RESPONSE`].
pub fn extract_final(stream: &EventStream) -> &str {
    match stream.final_event() {
        Some(event) if !event.content.trim().is_empty() => &event.content,
        Some(_) => {
            tracing::error!("protocol violation: final event has an empty payload");
            NO_FINAL_RESPONSE
        }
        None => {
            tracing::error!("protocol violation: run produced zero final events");
            NO_FINAL_RESPONSE
        }
    }
}
