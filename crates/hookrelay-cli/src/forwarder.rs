//! Typed dispatch of decoded events.
//!
//! Routes each event by its declared type through a fixed handler table.
//! Only `message` events have a network effect: their payload is unpacked
//! and relayed to the target as an HTTP POST. Unrecognized types fall
//! through a default branch that logs and moves on.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use hookrelay_core::sse::Event;

use crate::error::RelayError;

/// The payload carried by a `message` event: the original webhook body and
/// its HTTP headers, with the channel's own bookkeeping keys alongside.
#[derive(Debug, Deserialize)]
struct MessagePayload {
    /// The webhook body; re-encoded compactly and posted as-is.
    body: Value,
    /// Query string of the original request; dropped.
    #[serde(rename = "query")]
    _query: Value,
    /// Channel receive timestamp; dropped.
    #[serde(rename = "timestamp")]
    _timestamp: Value,
    /// Every other top-level key is forwarded verbatim as a request header.
    #[serde(flatten)]
    headers: Map<String, Value>,
}

/// Dispatches decoded events to their per-type behavior.
pub struct Forwarder {
    http: reqwest::Client,
    source: Url,
    target: Url,
    delivery_timeout: Duration,
}

impl Forwarder {
    /// Build a forwarder delivering to `target`.
    ///
    /// `source` only labels log lines; `delivery_timeout` bounds each POST.
    pub const fn new(
        http: reqwest::Client,
        source: Url,
        target: Url,
        delivery_timeout: Duration,
    ) -> Self {
        Self {
            http,
            source,
            target,
            delivery_timeout,
        }
    }

    /// Route one decoded event to its handler.
    ///
    /// Returns only once the event is fully handled; delivery happens
    /// inline, so events are relayed strictly in arrival order.
    ///
    /// # Errors
    ///
    /// `RelayError::Parse` when a `message` event does not carry the
    /// expected JSON payload. Delivery transport failures are handled here
    /// (logged, skipped) and never surface.
    pub async fn dispatch(&self, event: &Event) -> Result<(), RelayError> {
        match event.event_type.as_str() {
            "ready" => {
                info!(source = %self.source, "Connected to source channel");
                Ok(())
            }
            "ping" => {
                debug!(source = %self.source, "Source channel is still alive");
                Ok(())
            }
            "message" => self.forward(event).await,
            other => {
                warn!(
                    event_type = other,
                    event_id = ?event.id,
                    "Ignoring event with unrecognized type"
                );
                Ok(())
            }
        }
    }

    /// Unpack a message event and relay its body to the target.
    async fn forward(&self, event: &Event) -> Result<(), RelayError> {
        let payload: MessagePayload =
            serde_json::from_str(event.data.as_deref().unwrap_or_default())?;
        let body = serde_json::to_string(&payload.body)?;

        let mut request = self
            .http
            .post(self.target.clone())
            .timeout(self.delivery_timeout)
            .body(body);
        for (name, value) in &payload.headers {
            request = match value {
                Value::String(text) => request.header(name.as_str(), text.as_str()),
                other => request.header(name.as_str(), other.to_string()),
            };
        }

        match request.send().await {
            Ok(_) => {
                debug!(event_id = ?event.id, "Event delivered");
                Ok(())
            }
            Err(error) => {
                // Delivery failures are local to the event: warn and keep
                // the run loop alive.
                warn!(
                    event_id = ?event.id,
                    error = %error,
                    "Event was not delivered; target did not respond"
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn forwarder(target: &str) -> Forwarder {
        Forwarder::new(
            reqwest::Client::new(),
            Url::parse("https://smee.io/test-channel").unwrap(),
            Url::parse(target).unwrap(),
            Duration::from_secs(5),
        )
    }

    fn message(data: &str) -> Event {
        Event {
            id: Some("42".to_owned()),
            data: Some(data.to_owned()),
            ..Event::default()
        }
    }

    #[tokio::test]
    async fn message_posts_body_with_payload_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("x-github-event", "issues")
            .match_header("x-attempt", "3")
            .match_body(r#"{"action":"opened"}"#)
            .expect(1)
            .create_async()
            .await;

        let event = message(
            r#"{"body":{"action":"opened"},"query":{},"timestamp":1,"x-github-event":"issues","x-attempt":3}"#,
        );
        forwarder(&server.url()).dispatch(&event).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bookkeeping_keys_are_not_forwarded_as_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("query", mockito::Matcher::Missing)
            .match_header("timestamp", mockito::Matcher::Missing)
            .expect(1)
            .create_async()
            .await;

        let event = message(r#"{"body":{"a":1},"query":{"token":"x"},"timestamp":170}"#);
        forwarder(&server.url()).dispatch(&event).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_message_types_have_no_network_effect() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let fwd = forwarder(&server.url());
        for event_type in ["ready", "ping", "pong"] {
            let event = Event {
                event_type: event_type.to_owned(),
                data: Some("{}".to_owned()),
                ..Event::default()
            };
            fwd.dispatch(&event).await.unwrap();
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_target_is_not_fatal() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let event = message(r#"{"body":{},"query":{},"timestamp":1}"#);
        let result = forwarder(&format!("http://127.0.0.1:{port}/"))
            .dispatch(&event)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn malformed_payload_is_a_parse_error() {
        let event = message("not json");
        let result = forwarder("http://127.0.0.1:1/").dispatch(&event).await;
        assert!(matches!(result, Err(RelayError::Parse(_))));
    }

    #[tokio::test]
    async fn payload_missing_body_key_is_a_parse_error() {
        let event = message(r#"{"query":{},"timestamp":1}"#);
        let result = forwarder("http://127.0.0.1:1/").dispatch(&event).await;
        assert!(matches!(result, Err(RelayError::Parse(_))));
    }
}
