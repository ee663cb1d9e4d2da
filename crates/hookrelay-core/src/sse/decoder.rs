//! Line-level decoding of event blocks.

use tracing::trace;

use super::Event;

/// Streaming decoder that turns an ordered sequence of text lines into
/// completed [`Event`]s.
///
/// Feed one line at a time with [`feed_line`](Self::feed_line); a completed
/// event comes back at the blank line that terminates a block carrying data.
/// A block that never sets `data` (comments only, bookkeeping fields only)
/// is discarded silently, as is a block still accumulating when the input
/// ends. Dropping the decoder drops any pending block with it.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Option<Event>,
}

impl SseDecoder {
    /// Create a decoder in its initial (idle) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line, stripped of its trailing line terminator.
    ///
    /// Classification, applied top to bottom:
    /// 1. blank line: emit the pending event if it has data, reset either way
    /// 2. `:`-prefixed line: comment, never touches decoder state
    /// 3. field line: split on the first `:`; exactly one leading space is
    ///    stripped from the value; a line without `:` is a field with an
    ///    empty value
    ///
    /// Unrecognized field names and unparseable `retry` values are ignored
    /// without failing the stream.
    pub fn feed_line(&mut self, line: &str) -> Option<Event> {
        if line.is_empty() {
            return self.pending.take().filter(|event| event.data.is_some());
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        let event = self.pending.get_or_insert_with(Event::default);
        match field {
            "id" => event.id = Some(value.to_owned()),
            "event" => event.event_type = value.to_owned(),
            "retry" => match value.parse() {
                Ok(ms) => event.retry_ms = ms,
                Err(_) => trace!(value, "Ignoring unparseable retry field"),
            },
            "data" => event.append_data(value),
            other => trace!(field = other, "Ignoring unrecognized field"),
        }
        None
    }
}
