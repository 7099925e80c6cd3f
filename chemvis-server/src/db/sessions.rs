//! Upload session persistence and retention

use chemvis_common::models::{EquipmentRecord, UploadSession};
use chemvis_common::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Number of most recent upload sessions kept after each upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    keep_sessions: usize,
}

impl RetentionPolicy {
    pub const DEFAULT_KEEP_SESSIONS: usize = 5;

    /// Never keeps fewer than one session (the upload just made)
    pub fn new(keep_sessions: usize) -> Self {
        Self {
            keep_sessions: keep_sessions.max(1),
        }
    }

    pub fn keep_sessions(&self) -> usize {
        self.keep_sessions
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEEP_SESSIONS)
    }
}

/// Outcome of a committed upload
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    pub session: UploadSession,
    /// Older sessions removed by retention in the same transaction
    pub sessions_purged: u64,
}

/// Timestamps are stored as fixed-width RFC 3339 text so that text ordering
/// matches time ordering.
fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid stored timestamp '{}': {}", value, e)))
}

fn session_from_row(row: &SqliteRow) -> Result<UploadSession> {
    let upload_date: String = row.try_get("upload_date")?;
    Ok(UploadSession {
        id: row.try_get("id")?,
        filename: row.try_get("filename")?,
        upload_date: parse_timestamp(&upload_date)?,
        item_count: row.try_get("item_count")?,
    })
}

/// Persist one validated upload and apply retention
///
/// Session insert, item inserts and the retention purge share one
/// transaction: either the whole upload lands (with older sessions trimmed)
/// or nothing changes.
pub async fn store_upload(
    pool: &SqlitePool,
    filename: &str,
    records: &[EquipmentRecord],
    retention: RetentionPolicy,
) -> Result<StoredUpload> {
    let upload_date = format_timestamp(&Utc::now());
    let item_count = records.len() as i64;

    let mut tx = pool.begin().await?;

    let session_id = sqlx::query(
        "INSERT INTO upload_sessions (filename, upload_date, item_count) VALUES (?, ?, ?)",
    )
    .bind(filename)
    .bind(&upload_date)
    .bind(item_count)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for record in records {
        sqlx::query(
            r#"
            INSERT INTO equipment_items
                (upload_session, equipment_name, equipment_type, flowrate, pressure, temperature)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(&record.name)
        .bind(&record.equipment_type)
        .bind(record.flowrate)
        .bind(record.pressure)
        .bind(record.temperature)
        .execute(&mut *tx)
        .await?;
    }

    let sessions_purged = sqlx::query(
        r#"
        DELETE FROM upload_sessions
        WHERE id NOT IN (
            SELECT id FROM upload_sessions
            ORDER BY upload_date DESC, id DESC
            LIMIT ?
        )
        "#,
    )
    .bind(retention.keep_sessions() as i64)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    Ok(StoredUpload {
        session: UploadSession {
            id: session_id,
            filename: filename.to_string(),
            upload_date: parse_timestamp(&upload_date)?,
            item_count,
        },
        sessions_purged,
    })
}

/// All retained sessions, most recent first
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<UploadSession>> {
    let rows = sqlx::query(
        r#"
        SELECT id, filename, upload_date, item_count
        FROM upload_sessions
        ORDER BY upload_date DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(session_from_row).collect()
}

pub async fn count_sessions(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM upload_sessions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
