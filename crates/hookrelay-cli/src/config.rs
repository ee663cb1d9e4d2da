//! Per-run relay configuration.

use std::time::Duration;

use reqwest::Url;

/// Connect timeout for the source subscription. The established stream
/// itself carries no read timeout; it is expected to stay open.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-delivery timeout for posts to the target.
const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable per-run settings for the relay.
///
/// Built once at startup and handed to [`RelayClient`](crate::RelayClient);
/// nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// URL of the webhook channel to subscribe to.
    pub source: Url,
    /// URL the decoded message events are posted to.
    pub target: Url,
    /// Connect timeout for the source subscription.
    pub connect_timeout: Duration,
    /// Timeout applied to each delivery post.
    pub delivery_timeout: Duration,
}

impl RelayConfig {
    /// Create a config with the default timeouts.
    pub const fn new(source: Url, target: Url) -> Self {
        Self {
            source,
            target,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }
}

/// Target URL for a local HTTP server: `http://127.0.0.1:{port}/` joined
/// with `path` (RFC 3986 join, so `/events` and `events` resolve the same).
pub fn local_target(port: u16, path: &str) -> anyhow::Result<Url> {
    let base = Url::parse(&format!("http://127.0.0.1:{port}/"))?;
    Ok(base.join(path)?)
}
