//! Upload with local-only fallback

use std::path::Path;

use chemvis_common::csv_schema::parse_equipment_csv;
use chemvis_common::models::{EquipmentRecord, UploadResponse};
use tracing::{info, warn};

use crate::api::{ApiClient, Snapshot};
use crate::error::ClientResult;
use crate::fallback::local_snapshot;

/// A file that passed local validation
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub records: Vec<EquipmentRecord>,
}

impl PreparedUpload {
    /// Read and validate a CSV file before anything is sent
    pub async fn from_path(path: &Path) -> ClientResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let records = parse_equipment_csv(&bytes)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        Ok(Self {
            filename,
            bytes,
            records,
        })
    }
}

#[derive(Debug)]
pub enum UploadOutcome {
    /// Server accepted and stored the file
    Uploaded(UploadResponse),
    /// Server unreachable or refused; the file is shown locally only
    Local { snapshot: Snapshot, reason: String },
}

/// Send a validated file, falling back to local-only processing on failure
pub async fn upload_with_fallback(client: &ApiClient, upload: PreparedUpload) -> UploadOutcome {
    let PreparedUpload {
        filename,
        bytes,
        records,
    } = upload;

    match client.upload_csv(&filename, bytes).await {
        Ok(response) => {
            info!("Uploaded {}: {}", filename, response.message);
            UploadOutcome::Uploaded(response)
        }
        Err(e) => {
            let reason = if e.is_rejection() {
                format!("server rejected the file: {}", e)
            } else {
                format!("server unavailable: {}", e)
            };
            warn!("Upload of {} failed, processing locally: {}", filename, reason);
            UploadOutcome::Local {
                snapshot: local_snapshot(records),
                reason,
            }
        }
    }
}
