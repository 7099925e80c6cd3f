//! Writing reports to disk

use std::path::{Path, PathBuf};

use chemvis_common::report::ReportContent;
use chrono::Local;
use tracing::info;

use crate::api::{DownloadedReport, Snapshot};
use crate::error::{ClientError, ClientResult};

/// Render the displayed snapshot to a PDF in `dir`
///
/// Works without the server.
pub async fn write_local_report(snapshot: &Snapshot, dir: &Path) -> ClientResult<PathBuf> {
    let content = ReportContent::build(&snapshot.summary, &snapshot.equipment, Local::now().naive_local())?;
    let path = dir.join(content.filename());

    let bytes = tokio::task::spawn_blocking(move || content.render_pdf())
        .await
        .map_err(|e| ClientError::Report(format!("Report task failed: {}", e)))??;

    tokio::fs::write(&path, &bytes).await?;
    info!("Wrote local report {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Save a report fetched from the server into `dir`
pub async fn save_downloaded_report(report: &DownloadedReport, dir: &Path) -> ClientResult<PathBuf> {
    let path = dir.join(&report.filename);
    tokio::fs::write(&path, &report.bytes).await?;
    info!("Saved server report {} ({} bytes)", path.display(), report.bytes.len());
    Ok(path)
}
