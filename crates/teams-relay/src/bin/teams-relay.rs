//! teams-relay service binary.
//!
//! Receives Alertmanager webhooks on `/alertmanager` and forwards them to a
//! Microsoft Teams incoming webhook.
//!
//! # Environment Variables
//!
//! - `TEAMS_INCOMING_WEBHOOK_URL` - Teams incoming webhook URL (required)
//! - `MARKDOWN_ENABLED` - `yes` to render card sections as Markdown
//! - `PORT` - listen port (default 2000)
//! - `REQUEST_TIMEOUT_SECS` - timeout for requests to Teams (default 30)

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use teams_relay::config::{self, RelayConfig, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS};
use teams_relay::server::{self, AppState};
use teams_relay::CardDispatcher;

/// Log filter used when `RUST_LOG` is unset, empty or invalid.
const DEFAULT_LOG_FILTER: &str = "teams_relay=info";

/// Relay Prometheus Alertmanager webhooks to Microsoft Teams.
#[derive(Parser)]
#[command(name = "teams-relay")]
#[command(version)]
struct Cli {
    /// Teams incoming webhook URL (or set `TEAMS_INCOMING_WEBHOOK_URL` env var)
    #[arg(long, env = "TEAMS_INCOMING_WEBHOOK_URL", hide_env_values = true)]
    webhook_url: String,

    /// Render card sections as Markdown: yes/no (or set `MARKDOWN_ENABLED` env var)
    #[arg(long, env = "MARKDOWN_ENABLED", default_value = "no")]
    markdown: String,

    /// HTTP listen port (or set `PORT` env var)
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Timeout in seconds for requests to Teams
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            webhook_url: self.webhook_url.clone(),
            markdown_enabled: config::parse_toggle(&self.markdown),
            port: self.port,
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = env_filter(std::env::var("RUST_LOG").ok().as_deref());
    if cli.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    let config = cli.relay_config();

    info!(
        markdown_enabled = config.markdown_enabled,
        request_timeout_secs = config.request_timeout_secs,
        "Starting teams-relay..."
    );

    let dispatcher = CardDispatcher::new(config.request_timeout())
        .context("Failed to create HTTP client")?;

    let port = config.port;
    let app = server::build_router(AppState::new(config, dispatcher));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port, path = server::ALERTMANAGER_PATH, "teams-relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// Build the log filter from a raw `RUST_LOG` value, falling back to
/// [`DEFAULT_LOG_FILTER`].
fn env_filter(raw: Option<&str>) -> EnvFilter {
    raw.filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
