//! # ChemVis Common Library
//!
//! Shared code for the ChemVis server and desktop viewer including:
//! - Equipment data model and JSON wire types
//! - CSV schema validation for uploaded equipment files
//! - Summary statistics (averages and type distribution)
//! - Change-notification event types (EventBus)
//! - PDF report layout and rendering
//! - Configuration loading and root folder resolution

pub mod config;
pub mod csv_schema;
pub mod error;
pub mod events;
pub mod models;
pub mod report;
pub mod summary;

pub use error::{Error, Result};
pub use models::{EquipmentItem, EquipmentRecord, SummaryStats, UploadSession};
