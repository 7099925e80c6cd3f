//! CSV upload endpoint

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use chemvis_common::models::UploadResponse;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::ingest::process_upload;
use crate::AppState;

/// Multipart field carrying the CSV file
pub const FILE_FIELD: &str = "file";

/// Filename recorded when the client sends none
pub const DEFAULT_FILENAME: &str = "upload.csv";

const MAX_FILENAME_CHARS: usize = 255;

fn normalize_filename(name: Option<&str>) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(DEFAULT_FILENAME);
    name.chars().take(MAX_FILENAME_CHARS).collect()
}

/// POST /upload
///
/// Accepts a multipart form with a `file` field. Responds 201 with the new
/// session id, or 400 when the file is missing or fails validation.
pub async fn upload_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let mut multipart =
        multipart.map_err(|e| ApiError::BadRequest(format!("Expected multipart form: {}", e.body_text())))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e.body_text())))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let filename = normalize_filename(field.file_name());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e.body_text())))?;

        let stored = process_upload(&state, &filename, &bytes).await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                success: true,
                message: format!("Processed {} items", stored.session.item_count),
                session_id: Some(stored.session.id),
            }),
        ));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
