// Main entry point - Dependency injection, poll loop and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::controls::Controls;
use crate::application::poll_loop::{PollLoop, PollSettings};
use crate::domain::topic::Catalog;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_fetcher::HttpSeriesFetcher;
use crate::infrastructure::tracing_renderer::TracingRenderer;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,telemetry_dashboard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (fail-fast)
    let config = load_dashboard_config()?;
    tracing::info!(
        source = %config.base_url(),
        interval_ms = config.poll.interval_ms,
        fetch_timeout_ms = config.source.fetch_timeout_ms,
        "Configuration loaded"
    );

    let catalog = Arc::new(Catalog::builtin().with_extra(config.topics.clone()));

    // Fetcher (infrastructure layer)
    let fetcher = Arc::new(HttpSeriesFetcher::new(config.base_url(), config.fetch_timeout())?);

    // Poll loop (application layer)
    let mut controls = Controls::new(config.poll.initial_topics.clone(), config.poll.default_limit)?;
    controls.align_axes = config.poll.align_axes;
    controls.stopped = config.poll.start_stopped;

    let poll_loop = Arc::new(PollLoop::new(
        fetcher,
        catalog.clone(),
        Arc::new(TracingRenderer),
        PollSettings {
            interval: config.interval(),
            fetch_timeout: config.fetch_timeout(),
        },
        controls,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = tokio::spawn(poll_loop.clone().run(shutdown_rx));

    let state = Arc::new(AppState {
        catalog,
        poll_loop,
    });

    // Router (presentation layer)
    let router = presentation::router(state);

    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(address = %addr, "Starting telemetry-dashboard");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cancel the interval; in-flight ticks are dropped without touching the chart
    let _ = shutdown_tx.send(true);
    poller.await?;

    tracing::info!("Shut down gracefully");
    Ok(())
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
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
