//! HTTP server initialization and runtime setup.
//!
//! Wires together the database pool, click worker pool, availability
//! monitor, and Axum server, then handles graceful shutdown: once the
//! server stops accepting requests all queue senders are dropped, workers
//! drain what is left, and the process waits a bounded grace period for
//! in-flight click writes to finish.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::application::services::LinkService;
use crate::config::Config;
use crate::domain::click_worker::{click_channel, spawn_click_workers};
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use crate::monitor::{HttpProber, UrlMonitor};
use crate::routes::app_router;
use crate::state::AppState;

/// How long shutdown waits for click workers to finish draining.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Click pipeline (bounded queue + worker pool)
/// - URL availability monitor
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if the database connection, migration run, or server
/// bind fails, or on a server runtime error.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let pool = Arc::new(pool);
    let link_repository = Arc::new(PgLinkRepository::new(pool.clone()));
    let click_repository = Arc::new(PgClickRepository::new(pool.clone()));

    let (clicks, click_rx) = click_channel(config.click_queue_capacity);
    let workers = spawn_click_workers(
        config.click_worker_count,
        click_rx,
        link_repository.clone(),
        click_repository,
    );
    info!(
        capacity = config.click_queue_capacity,
        workers = config.click_worker_count,
        "Click pipeline started"
    );

    let prober = Arc::new(HttpProber::new(Duration::from_secs(
        config.monitor_probe_timeout_seconds,
    ))?);
    let monitor = UrlMonitor::new(
        link_repository.clone(),
        prober,
        Duration::from_secs(config.monitor_interval_minutes * 60),
    );
    tokio::spawn(async move { monitor.start().await });
    info!(
        interval_minutes = config.monitor_interval_minutes,
        "URL monitor started"
    );

    let state = AppState::new(
        pool,
        config.base_url.clone(),
        Arc::new(LinkService::new(link_repository)),
        clicks.clone(),
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router (and its state) is gone; dropping the last producer handle
    // closes the queue so the workers drain remaining events and exit.
    drop(clicks);

    info!("Draining click queue");
    let drain = async {
        for handle in workers {
            let _ = handle.await;
        }
    };
    if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
        warn!(
            grace = ?SHUTDOWN_GRACE,
            "click workers did not finish within the grace period, abandoning remaining events"
        );
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
