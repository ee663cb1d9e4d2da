//! Error types for the relay client.

use thiserror::Error;

/// Errors raised by the source transport.
///
/// A transport failure on the source connection is fatal to the run; the
/// same class of failure on a target delivery is handled locally by the
/// forwarder and never surfaces through this type.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection or read failure on the HTTP transport.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The source answered the subscription with a non-success status.
    #[error("source returned HTTP status {0}")]
    Status(reqwest::StatusCode),
}

/// Errors that terminate a relay run.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Source connection or read failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A message event carried a payload that is not the expected JSON.
    #[error("failed to decode message event payload: {0}")]
    Parse(#[from] serde_json::Error),
}
