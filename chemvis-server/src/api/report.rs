//! PDF report download

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chemvis_common::report::ReportContent;
use chrono::Local;
use tracing::info;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /report
///
/// Renders the current dataset as a PDF attachment. 404 when the store is
/// empty.
pub async fn download_report(State(state): State<AppState>) -> ApiResult<Response> {
    let db::Dataset { summary, equipment } = db::load_dataset(&state.db).await?;

    let content = ReportContent::build(&summary, &equipment, Local::now().naive_local())?;
    let filename = content.filename();

    let bytes = tokio::task::spawn_blocking(move || content.render_pdf())
        .await
        .map_err(|e| ApiError::Internal(format!("Report task failed: {}", e)))??;

    info!("Generated report {} ({} bytes, {} items)", filename, bytes.len(), equipment.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
            (
                header::ACCESS_CONTROL_EXPOSE_HEADERS,
                header::CONTENT_DISPOSITION.to_string(),
            ),
        ],
        bytes,
    )
        .into_response())
}
