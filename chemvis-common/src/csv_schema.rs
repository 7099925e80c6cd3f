//! CSV schema validation for equipment uploads
//!
//! Turns raw file bytes into typed [`EquipmentRecord`]s. Validation fails
//! closed: the whole file is rejected on the first row that cannot be
//! converted, so callers never persist a partial upload.

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

use crate::models::EquipmentRecord;

/// Column holding the equipment name
pub const COL_NAME: &str = "Equipment Name";
/// Column holding the equipment type (category)
pub const COL_TYPE: &str = "Type";
pub const COL_FLOWRATE: &str = "Flowrate";
pub const COL_PRESSURE: &str = "Pressure";
pub const COL_TEMPERATURE: &str = "Temperature";

/// Header names every upload must carry (exact match, any order)
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_NAME,
    COL_TYPE,
    COL_FLOWRATE,
    COL_PRESSURE,
    COL_TEMPERATURE,
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reasons an uploaded file is rejected
///
/// Row numbers count data rows from 1; the header line is not counted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("CSV file is empty. Please add equipment data.")]
    EmptyFile,

    #[error(
        "Missing required columns: {}. Needed: {}",
        .0.join(", "),
        REQUIRED_COLUMNS.join(", ")
    )]
    MissingColumns(Vec<String>),

    #[error("Row {row}: '{column}' must not be blank")]
    MissingValue { row: usize, column: &'static str },

    #[error("Row {row}: '{column}' value '{value}' is not a valid number")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Malformed CSV: {0}")]
    Malformed(String),
}

/// Positions of the required columns within the header record
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    name: usize,
    equipment_type: usize,
    flowrate: usize,
    pressure: usize,
    temperature: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, ValidationError> {
        let position = |column: &str| headers.iter().position(|h| h == column);

        match (
            position(COL_NAME),
            position(COL_TYPE),
            position(COL_FLOWRATE),
            position(COL_PRESSURE),
            position(COL_TEMPERATURE),
        ) {
            (Some(name), Some(equipment_type), Some(flowrate), Some(pressure), Some(temperature)) => {
                Ok(Self {
                    name,
                    equipment_type,
                    flowrate,
                    pressure,
                    temperature,
                })
            }
            _ => {
                let missing = REQUIRED_COLUMNS
                    .iter()
                    .filter(|column| position(column).is_none())
                    .map(|column| column.to_string())
                    .collect();
                Err(ValidationError::MissingColumns(missing))
            }
        }
    }

    fn extract(&self, record: &StringRecord, row: usize) -> Result<EquipmentRecord, ValidationError> {
        Ok(EquipmentRecord {
            name: text_field(record, self.name, row, COL_NAME)?,
            equipment_type: text_field(record, self.equipment_type, row, COL_TYPE)?,
            flowrate: number_field(record, self.flowrate, row, COL_FLOWRATE)?,
            pressure: number_field(record, self.pressure, row, COL_PRESSURE)?,
            temperature: number_field(record, self.temperature, row, COL_TEMPERATURE)?,
        })
    }
}

fn text_field(
    record: &StringRecord,
    index: usize,
    row: usize,
    column: &'static str,
) -> Result<String, ValidationError> {
    match record.get(index) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::MissingValue { row, column }),
    }
}

fn number_field(
    record: &StringRecord,
    index: usize,
    row: usize,
    column: &'static str,
) -> Result<f64, ValidationError> {
    let raw = record
        .get(index)
        .filter(|value| !value.is_empty())
        .ok_or(ValidationError::MissingValue { row, column })?;

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        }),
    }
}

/// Validate and convert an uploaded equipment CSV
///
/// Headers and cells are trimmed; columns beyond the required five are ignored.
pub fn parse_equipment_csv(bytes: &[u8]) -> Result<Vec<EquipmentRecord>, ValidationError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::EmptyFile);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ValidationError::Malformed(e.to_string()))?
        .clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ValidationError::Malformed(e.to_string()))?;
        records.push(columns.extract(&record, index + 1)?);
    }

    if records.is_empty() {
        return Err(ValidationError::EmptyFile);
    }

    Ok(records)
}
