//! The relay run loop.
//!
//! Connects one source subscription to one target and pumps events between
//! them. Single logical thread of control: one read from the source, one
//! fully-handled dispatch, then the next read.

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::RelayConfig;
use crate::error::{RelayError, TransportError};
use crate::forwarder::Forwarder;
use crate::source::EventSource;

/// Drives the source-to-target relay for one run.
pub struct RelayClient {
    config: RelayConfig,
}

impl RelayClient {
    /// Create a client owning `config` for the run's lifetime.
    pub const fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Run until the source stream ends.
    pub async fn run(&self) -> Result<(), RelayError> {
        self.run_until(CancellationToken::new()).await
    }

    /// Run until the source stream ends or `shutdown` fires.
    ///
    /// A connect failure is fatal and reported before any event is handled.
    /// After that, events are dispatched strictly in arrival order; the
    /// next event is not read until the current handler returns. The stream
    /// ending and cancellation both terminate cleanly; no reconnection is
    /// attempted.
    pub async fn run_until(&self, shutdown: CancellationToken) -> Result<(), RelayError> {
        let source = EventSource::new(self.config.connect_timeout)?;
        let mut events = source.connect(&self.config.source).await?;

        info!(source = %events.url(), target = %self.config.target, "Forwarding events");

        let http = reqwest::Client::builder()
            .build()
            .map_err(TransportError::from)?;
        let forwarder = Forwarder::new(
            http,
            events.url().clone(),
            self.config.target.clone(),
            self.config.delivery_timeout,
        );

        loop {
            // Biased so a shutdown request wins over a ready event; the
            // check runs between dispatches and at the read boundary.
            let next = tokio::select! {
                biased;
                () = shutdown.cancelled() => {
                    info!("Shutdown requested; closing source stream");
                    return Ok(());
                }
                next = events.next_event() => next?,
            };

            match next {
                Some(event) => forwarder.dispatch(&event).await?,
                None => {
                    info!("Source stream ended");
                    return Ok(());
                }
            }
        }
    }
}
