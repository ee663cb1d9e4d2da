//! Incremental decoder for text/event-stream sources.
//!
//! Implements the field-line grammar of the Server-Sent Events format:
//! - `data:` lines carry the payload (repeatable, newline-joined)
//! - `event:` lines name the event type
//! - `id:` and `retry:` lines carry bookkeeping fields
//! - lines starting with `:` are comments (used for keepalive)
//! - blank lines delimit events
//!
//! The decoder is a pure state machine over lines; byte framing and
//! character decoding belong to the transport that feeds it.

mod decoder;
mod event;

pub use decoder::SseDecoder;
pub use event::Event;
