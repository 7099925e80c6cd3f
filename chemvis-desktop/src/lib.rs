//! chemvis-desktop library interface
//!
//! Terminal viewer for a ChemVis server. Data is fetched on background
//! tasks and handed to the [`dashboard::Dashboard`] through channels; a
//! live-update listener requests refetches when the server announces a
//! dataset change. When the server cannot be reached the viewer shows a
//! built-in demo dataset, or the contents of a locally processed file.

pub mod api;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fallback;
pub mod poller;
pub mod report;
pub mod subscriber;
pub mod upload;

pub use crate::error::{ClientError, ClientResult};
