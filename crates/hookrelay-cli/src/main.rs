//! hookrelay CLI
//!
//! Webhook data delivery client: subscribes to a webhook channel and
//! forwards each event to a local HTTP endpoint. Runs until the channel
//! closes or the process is interrupted.

use clap::Parser;
use reqwest::Url;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hookrelay_cli::client::RelayClient;
use hookrelay_cli::config::{self, RelayConfig};

#[derive(Parser, Debug)]
#[command(name = "hookrelay")]
#[command(version, about = "Webhook data delivery client", long_about = None)]
struct Cli {
    /// URL of the webhook proxy service.
    #[arg(
        short = 'u',
        long,
        env = "WEBHOOK_PROXY",
        default_value = "https://smee.io/new"
    )]
    url: String,

    /// Full URL (including protocol and path) of the target service the
    /// events will be forwarded to [default: http://127.0.0.1:{port}{path}]
    #[arg(short = 't', long)]
    target: Option<String>,

    /// Local HTTP server port.
    #[arg(short = 'p', long, default_value_t = 3000)]
    port: u16,

    /// URL path to post proxied requests to.
    #[arg(short = 'P', long, default_value = "/")]
    path: String,

    /// Default log level when RUST_LOG is not set (error, warn, info, debug, trace).
    #[arg(short = 'l', long, default_value = "info")]
    logging: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

/// Set up the global tracing subscriber.
///
/// `RUST_LOG` overrides the `-l/--logging` level; logs go to stderr so a
/// piped target stays clean, as JSON when `json` is set.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hookrelay={level}")));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.logging, cli.log_json);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting hookrelay");

    let source = Url::parse(&cli.url)?;
    let target = match &cli.target {
        Some(target) => Url::parse(target)?,
        None => config::local_target(cli.port, &cli.path)?,
    };

    let client = RelayClient::new(RelayConfig::new(source, target));

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C shutdown signal");
            signal.cancel();
        }
    });

    if let Err(e) = client.run_until(shutdown).await {
        error!(error = %e, "Relay terminated");
        return Err(e.into());
    }

    info!("Relay stopped");
    Ok(())
}
