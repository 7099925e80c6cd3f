//! Common error types for ChemVis

use thiserror::Error;

use crate::csv_schema::ValidationError;

/// Common result type for ChemVis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the server and the desktop viewer
#[derive(Error, Debug)]
pub enum Error {
    /// Uploaded file failed schema validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found (or nothing to report on)
    #[error("Not found: {0}")]
    NotFound(String),

    /// PDF generation failed
    #[error("Report error: {0}")]
    Report(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
