//! Search-Summarizer: summarize web search results over HTTP
//!
//! This is the main entry point for the application.

use anyhow::Result;
use clap::Parser;
use search_summarizer::{
    config::{self, SETTINGS_PATH_ENV},
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Summarize web search results with a language model
#[derive(Debug, Parser)]
#[command(name = "search-summarizer", version, about)]
struct Cli {
    /// Path to settings.yml
    #[arg(short, long, env = SETTINGS_PATH_ENV)]
    config: Option<PathBuf>,

    /// Server port (overrides settings and PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Starting search-summarizer v{}", search_summarizer::VERSION);

    // Load configuration
    let mut settings = config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        settings.server.port = port;
    }
    settings.validate()?;
    info!(
        "Using {} backend with model {}",
        settings.llm.backend.as_str(),
        settings.llm.resolved_model()
    );

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;

    // Create application state
    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);
    let state = AppState::from_settings(settings, client)?;

    // Create router
    let app = create_router(state);

    info!("App listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
