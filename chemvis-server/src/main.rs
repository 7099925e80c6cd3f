//! chemvis-server - Equipment monitoring backend
//!
//! Accepts equipment CSV uploads, keeps the most recent upload sessions in
//! SQLite, and serves summaries, listings, PDF reports and a live-update
//! event stream.

use anyhow::{Context, Result};
use chemvis_common::config::{prepare_root_folder, TomlConfig};
use chemvis_common::events::EventBus;
use chemvis_server::config::{ServerArgs, ServerConfig};
use chemvis_server::{build_router, db, AppState};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Buffered notifications per subscriber before it starts lagging
const EVENT_BUS_CAPACITY: usize = 100;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chemvis_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting ChemVis server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = ServerArgs::parse();
    let file_config = TomlConfig::load(args.config.as_deref());
    let config = ServerConfig::resolve(args, &file_config);

    let db_path = prepare_root_folder(&config.root_folder)
        .with_context(|| format!("Failed to prepare root folder {}", config.root_folder.display()))?;
    info!("Database path: {}", db_path.display());

    let pool = db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    info!(
        "Keeping the {} most recent upload sessions",
        config.retention.keep_sessions()
    );

    let state = AppState::new(pool.clone(), EventBus::new(EVENT_BUS_CAPACITY), config.retention);
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("chemvis-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel open event streams
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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

    shutdown.cancel();
}
