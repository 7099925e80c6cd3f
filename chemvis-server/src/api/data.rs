//! Read-only data endpoints
//!
//! - GET /summary
//! - GET /equipment
//! - GET /history

use axum::{extract::State, Json};
use chemvis_common::models::{EquipmentItem, SummaryStats, UploadSession};

use crate::db;
use crate::error::ApiResult;
use crate::AppState;

/// GET /summary
///
/// Aggregates over every stored item; zeros and an empty distribution when
/// nothing has been uploaded.
pub async fn get_summary(State(state): State<AppState>) -> ApiResult<Json<SummaryStats>> {
    let summary = db::summarize(&state.db).await?;
    Ok(Json(summary))
}

/// GET /equipment
pub async fn list_equipment(State(state): State<AppState>) -> ApiResult<Json<Vec<EquipmentItem>>> {
    let items = db::list_equipment(&state.db).await?;
    Ok(Json(items))
}

/// GET /history
///
/// Retained upload sessions, most recent first.
pub async fn list_history(State(state): State<AppState>) -> ApiResult<Json<Vec<UploadSession>>> {
    let sessions = db::list_sessions(&state.db).await?;
    Ok(Json(sessions))
}
