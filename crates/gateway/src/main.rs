mod config;
mod error;
mod metrics;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    config::{GatewayConfig, LogFormat, LogOutput},
    routes::build_router,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Phase 1: Basic tracing so we can log during config loading
    // Uses set_default (thread-local) so it can be replaced by Phase 2's global subscriber
    let basic_tracing = init_tracing_basic();

    info!("Starting Log Fetch Gateway v{}", env!("CARGO_PKG_VERSION"));

    let config = GatewayConfig::load()
        .context("Failed to load configuration")?;

    config.validate()
        .context("Configuration validation failed")?;

    // Phase 2: Re-initialize tracing with config (format, level, output)
    drop(basic_tracing);
    init_tracing_from_config(&config)
        .context("Failed to initialize logging")?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.server.bind_address);

    let addr: SocketAddr = config.server.bind_address
        .parse()
        .context("Invalid bind address")?;

    let state = AppState::new(config)
        .context("Failed to create application state")?;
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("  - Fetch endpoint: http://{}/FetchLogContent", addr);
    info!("  - Health check: http://{}/health", addr);
    info!("  - Metrics: http://{}/metrics", addr);
    info!("✓ Log Fetch Gateway is ready!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()))
        .await
        .context("Server error")?;

    state.metrics.log_summary();
    info!("Server shut down gracefully");
    Ok(())
}

/// Phase 1: Basic tracing init so we can log during config loading.
/// Uses RUST_LOG env var or a sensible default.
fn init_tracing_basic() -> tracing::subscriber::DefaultGuard {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gateway=debug"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// Phase 2: Install the global subscriber described by the configuration.
fn init_tracing_from_config(config: &GatewayConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Prefer RUST_LOG env var, fall back to config level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let open_log_file = |path: &str| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(Arc::new)
            .with_context(|| format!("Failed to open log file '{}'", path))
    };

    match (&config.logging.format, &config.logging.output) {
        (LogFormat::Json, LogOutput::Stdout) => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Json, LogOutput::File { path }) => {
            let layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .with_writer(open_log_file(path.as_str())?);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Pretty, LogOutput::Stdout) => {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        (LogFormat::Pretty, LogOutput::File { path }) => {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(false)
                .with_writer(open_log_file(path.as_str())?);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }

    Ok(())
}

/// Graceful shutdown signal handler. Cancels in-flight fetches once a
/// signal arrives so the server can drain promptly.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        },
        _ = shutdown.cancelled() => {},
    }

    shutdown.cancel();
}
