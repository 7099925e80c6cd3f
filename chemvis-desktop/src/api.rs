//! ChemVis server API client
//!
//! Every request carries its own timeout; nothing is retried.

use std::future::Future;
use std::time::Duration;

use chemvis_common::models::{EquipmentItem, ErrorResponse, SummaryStats, UploadResponse, UploadSession};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{multipart, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::DesktopConfig;
use crate::error::{ClientError, ClientResult};

const USER_AGENT: &str = concat!("chemvis-desktop/", env!("CARGO_PKG_VERSION"));

/// What the dashboard displays: one summary plus the matching listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub summary: SummaryStats,
    pub equipment: Vec<EquipmentItem>,
}

/// Something that can produce a fresh [`Snapshot`]
pub trait SnapshotSource: Send + Sync + 'static {
    fn fetch_snapshot(&self) -> impl Future<Output = ClientResult<Snapshot>> + Send;
}

/// A downloaded server report
#[derive(Debug, Clone)]
pub struct DownloadedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// HTTP client for one ChemVis server
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &DesktopConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            http,
            base_url: config.server_url.clone(),
            request_timeout: config.request_timeout,
            upload_timeout: config.upload_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying client, shared with the live-update listener
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        debug!("GET {}", path);
        let response = self
            .http
            .get(self.url(path))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn fetch_summary(&self) -> ClientResult<SummaryStats> {
        self.get_json("/summary").await
    }

    pub async fn fetch_equipment(&self) -> ClientResult<Vec<EquipmentItem>> {
        self.get_json("/equipment").await
    }

    pub async fn fetch_history(&self) -> ClientResult<Vec<UploadSession>> {
        self.get_json("/history").await
    }

    /// POST the file as multipart field `file`
    pub async fn upload_csv(&self, filename: &str, bytes: Vec<u8>) -> ClientResult<UploadResponse> {
        let part = multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("file", part);

        debug!("POST /upload ({})", filename);
        let response = self
            .http
            .post(self.url("/upload"))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// GET /report
    pub async fn download_report(&self) -> ClientResult<DownloadedReport> {
        let response = self
            .http
            .get(self.url("/report"))
            .timeout(self.upload_timeout)
            .send()
            .await?;
        let response = check_status(response).await?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_filename)
            .unwrap_or_else(|| "Industrial_Report.pdf".to_string());
        let bytes = response.bytes().await?.to_vec();

        Ok(DownloadedReport { filename, bytes })
    }
}

impl SnapshotSource for ApiClient {
    async fn fetch_snapshot(&self) -> ClientResult<Snapshot> {
        let (summary, equipment) = tokio::try_join!(self.fetch_summary(), self.fetch_equipment())?;
        Ok(Snapshot { summary, equipment })
    }
}

/// Turn a non-success response into [`ClientError::Server`]
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(body) => body.error,
        Err(_) => text,
    };

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Extract the filename from `attachment; filename="..."`, keeping only the
/// final path component
pub fn attachment_filename(disposition: &str) -> Option<String> {
    let value = disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?;
    let name = value.trim_matches('"');
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_filename() {
        assert_eq!(
            attachment_filename("attachment; filename=\"Industrial_Report_20261016.pdf\""),
            Some("Industrial_Report_20261016.pdf".to_string())
        );
        assert_eq!(
            attachment_filename("attachment; filename=report.pdf"),
            Some("report.pdf".to_string())
        );
        assert_eq!(
            attachment_filename("attachment; filename=\"../../etc/passwd\""),
            Some("passwd".to_string())
        );
        assert_eq!(attachment_filename("attachment"), None);
        assert_eq!(attachment_filename("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let config = DesktopConfig {
            server_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(2),
            upload_timeout: Duration::from_secs(8),
            output_dir: ".".into(),
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.url("/summary"), "http://localhost:8000/summary");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
