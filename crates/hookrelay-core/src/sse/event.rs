//! Decoded event model for text/event-stream sources.

use serde_json::Value;

/// Reconnection delay assumed when the source never sends a `retry` field.
const DEFAULT_RETRY_MS: u64 = 2000;

/// One decoded unit from an event stream.
///
/// ref: <https://html.spec.whatwg.org/multipage/server-sent-events.html>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Last `id` field seen in the block, if any.
    pub id: Option<String>,
    /// Event type from the `event` field; `"message"` when absent.
    pub event_type: String,
    /// Reconnection delay from the `retry` field, in milliseconds.
    /// Informational only; nothing in the relay enforces it.
    pub retry_ms: u64,
    /// Accumulated `data` field lines, joined with `\n` in arrival order.
    /// `None` until the first `data` line of the block.
    pub data: Option<String>,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            id: None,
            event_type: "message".to_owned(),
            retry_ms: DEFAULT_RETRY_MS,
            data: None,
        }
    }
}

impl Event {
    /// Append one `data` field value, joining repeated lines with `\n`.
    pub(crate) fn append_data(&mut self, value: &str) {
        match &mut self.data {
            Some(data) => {
                data.push('\n');
                data.push_str(value);
            }
            None => self.data = Some(value.to_owned()),
        }
    }

    /// Decode the accumulated data as JSON.
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(self.data.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_wire_format() {
        let event = Event::default();
        assert_eq!(event.event_type, "message");
        assert_eq!(event.retry_ms, 2000);
        assert!(event.id.is_none());
        assert!(event.data.is_none());
    }

    #[test]
    fn repeated_data_lines_join_with_newline() {
        let mut event = Event::default();
        event.append_data("YHOO");
        event.append_data("+2");
        event.append_data("10");
        assert_eq!(event.data.as_deref(), Some("YHOO\n+2\n10"));
    }

    #[test]
    fn json_round_trips_unicode() {
        let mut event = Event::default();
        event.append_data(r#"{"key":"🥇"}"#);
        let value = event.json().unwrap();
        assert_eq!(value["key"], "🥇");
    }

    #[test]
    fn json_fails_without_data() {
        let event = Event::default();
        assert!(event.json().is_err());
    }
}
