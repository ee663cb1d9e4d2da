//! Streaming subscription to a text/event-stream source.
//!
//! [`EventSource`] opens the HTTP GET and [`EventStream`] exposes the
//! response body as a pull-based sequence of decoded events. The body is
//! consumed incrementally, one bounded chunk per read; the connection may
//! stay open indefinitely.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use reqwest::Url;
use reqwest::header::{self, HeaderMap};
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use hookrelay_core::sse::{Event, SseDecoder};

use crate::error::TransportError;

type BodyStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Opens streaming subscriptions against a webhook channel.
pub struct EventSource {
    http: reqwest::Client,
}

impl EventSource {
    /// Build a source with the given connect timeout.
    ///
    /// No overall request timeout is set; the subscription is expected to
    /// stay open.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { http })
    }

    /// Subscribe to `source`, returning the stream of decoded events.
    ///
    /// Sends `Accept: text/event-stream` and keeps the body streamed rather
    /// than materialized. A non-success response status fails here, before
    /// any event is decoded.
    pub async fn connect(&self, source: &Url) -> Result<EventStream, TransportError> {
        let response = self
            .http
            .get(source.clone())
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        // The channel URL can differ from the subscription URL: smee-style
        // services redirect `/new` to a freshly minted channel.
        let url = response.url().clone();
        let encoding = declared_encoding(response.headers());
        debug!(url = %url, encoding = encoding.name(), "Source connection established");

        Ok(EventStream {
            url,
            encoding,
            body: Box::pin(response.bytes_stream()),
            buffer: Vec::new(),
            decoder: SseDecoder::new(),
        })
    }
}

/// Pull-based stream of decoded events over one open connection.
///
/// A stream must be driven from a single call site; the `&mut self`
/// receiver on [`next_event`](Self::next_event) makes concurrent
/// consumption unrepresentable.
pub struct EventStream {
    url: Url,
    encoding: &'static Encoding,
    body: BodyStream,
    buffer: Vec<u8>,
    decoder: SseDecoder,
}

impl EventStream {
    /// The resolved channel URL, after any redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Wait for the next completed event.
    ///
    /// Returns `Ok(None)` when the source closes the stream; a block still
    /// accumulating at that point yields nothing. Read failures propagate
    /// verbatim; no retry or reconnection is attempted here.
    pub async fn next_event(&mut self) -> Result<Option<Event>, TransportError> {
        loop {
            while let Some(line) = self.take_line() {
                if let Some(event) = self.decoder.feed_line(&line) {
                    return Ok(Some(event));
                }
            }
            match self.body.next().await {
                Some(chunk) => self.buffer.extend_from_slice(&chunk?),
                None => return Ok(None),
            }
        }
    }

    /// Pop the next complete line out of the read buffer, decoding it with
    /// the response's declared character encoding. CRLF and LF line endings
    /// are both accepted.
    fn take_line(&mut self) -> Option<String> {
        let newline = self.buffer.iter().position(|&byte| byte == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        let (text, _, _) = self.encoding.decode(&line);
        Some(text.into_owned())
    }
}

/// Character encoding declared by the Content-Type header; UTF-8 when
/// unspecified or unrecognized.
fn declared_encoding(headers: &HeaderMap) -> &'static Encoding {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|content_type| {
            content_type.split(';').skip(1).find_map(|param| {
                let (key, value) = param.split_once('=')?;
                key.trim().eq_ignore_ascii_case("charset").then_some(value)
            })
        })
        .map(|label| label.trim().trim_matches('"'))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}
