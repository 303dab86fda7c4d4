//! scriptorium-ui - Bible-translation pipeline dashboard
//!
//! Serves the operator dashboard: project uploads, scripture statistics,
//! task launch and monitoring, and draft browsing. All work is done by the
//! pipeline backend; this service renders pages and forwards actions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use scriptorium_common::config::{ConfigOverrides, DashboardConfig};
use scriptorium_ui::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for scriptorium-ui
#[derive(Parser, Debug)]
#[command(name = "scriptorium-ui")]
#[command(about = "Operator dashboard for the Bible-translation pipeline")]
#[command(version)]
struct Args {
    /// Config file (default: <config_dir>/scriptorium/config.toml)
    #[arg(short, long, env = "SCRIPTORIUM_CONFIG")]
    config: Option<PathBuf>,

    /// Backend REST API base URL
    #[arg(long, env = "SCRIPTORIUM_API_URL")]
    api_url: Option<String>,

    /// Address to bind
    #[arg(long, env = "SCRIPTORIUM_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SCRIPTORIUM_PORT")]
    port: Option<u16>,

    /// Backend request timeout in seconds
    #[arg(long, env = "SCRIPTORIUM_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            api_url: self.api_url.clone(),
            bind_addr: self.bind.clone(),
            port: self.port,
            request_timeout_secs: self.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scriptorium_ui=info,scriptorium_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Scriptorium dashboard (scriptorium-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config = DashboardConfig::resolve(&args.overrides())
        .context("Failed to resolve configuration")?;
    info!("Backend API: {}", config.api_url);

    let addr = config.socket_addr().context("Invalid listen address")?;
    let state = AppState::from_config(config).context("Failed to create backend client")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("scriptorium-ui listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
