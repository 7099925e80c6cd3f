//! Equipment data model
//!
//! Field names on the serialized types are the HTTP wire contract shared by
//! the server handlers and the desktop client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One accepted upload. Owns the equipment items parsed from its file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSession {
    pub id: i64,
    /// Original filename as sent by the client
    pub filename: String,
    pub upload_date: DateTime<Utc>,
    /// Number of rows parsed from the source file
    pub item_count: i64,
}

/// A stored equipment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: i64,
    /// Owning upload session id
    pub upload_session: i64,
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// A validated CSV row, not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl EquipmentRecord {
    /// Attach identifiers, producing the stored form
    pub fn into_item(self, id: i64, upload_session: i64) -> EquipmentItem {
        EquipmentItem {
            id,
            upload_session,
            equipment_name: self.name,
            equipment_type: self.equipment_type,
            flowrate: self.flowrate,
            pressure: self.pressure,
            temperature: self.temperature,
        }
    }
}

/// Aggregate statistics over every stored equipment item
///
/// Averages are rounded to 2 decimal places and are 0 for an empty store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_equipment: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    /// Equipment type -> number of items of that type
    pub type_distribution: BTreeMap<String, i64>,
}

/// Successful `POST /upload` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
}

/// Error payload returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
