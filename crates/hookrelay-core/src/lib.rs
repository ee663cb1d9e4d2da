//! hookrelay Core Library
//!
//! Shared functionality for hookrelay components:
//! - Incremental decoding of the text/event-stream wire format
//! - The decoded event model

pub mod sse;

pub use sse::{Event, SseDecoder};
