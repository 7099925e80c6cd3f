//! HTTP API handlers for chemvis-server

pub mod data;
pub mod health;
pub mod report;
pub mod sse;
pub mod upload;

pub use data::{get_summary, list_equipment, list_history};
pub use health::health_routes;
pub use report::download_report;
pub use sse::event_stream;
pub use upload::upload_csv;
