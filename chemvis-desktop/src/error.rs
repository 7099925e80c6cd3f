//! Error types for chemvis-desktop

use chemvis_common::csv_schema::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection failure, timeout or undecodable response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    /// File rejected by local schema validation
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF generation failed
    #[error("Report error: {0}")]
    Report(String),
}

impl ClientError {
    /// True when the server was reached and refused the request
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Server { status, .. } if (400..500).contains(status))
    }
}

impl From<chemvis_common::Error> for ClientError {
    fn from(err: chemvis_common::Error) -> Self {
        match err {
            chemvis_common::Error::Validation(e) => ClientError::Validation(e),
            chemvis_common::Error::Io(e) => ClientError::Io(e),
            other => ClientError::Report(other.to_string()),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
