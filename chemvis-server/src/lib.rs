//! chemvis-server library interface
//!
//! Equipment monitoring backend: CSV upload ingestion, SQLite storage with
//! session retention, summary statistics, PDF reports and a Server-Sent
//! Events stream announcing dataset changes.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chemvis_common::events::EventBus;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::RetentionPolicy;

/// Largest accepted upload body
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Change notifier feeding the `/events` stream
    pub event_bus: EventBus,
    /// How many upload sessions survive each upload
    pub retention: RetentionPolicy,
    /// Cancelled at shutdown; ends every open event stream
    pub shutdown: CancellationToken,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, event_bus: EventBus, retention: RetentionPolicy) -> Self {
        Self {
            db,
            event_bus,
            retention,
            shutdown: CancellationToken::new(),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/upload", post(api::upload_csv))
        .route("/summary", get(api::get_summary))
        .route("/equipment", get(api::list_equipment))
        .route("/history", get(api::list_history))
        .route("/report", get(api::download_report))
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
