//! Upload ingestion: validate, store, notify

use chemvis_common::csv_schema::parse_equipment_csv;
use chemvis_common::events::ChemvisEvent;
use tracing::{debug, info, warn};

use crate::db::{self, StoredUpload};
use crate::error::ApiResult;
use crate::AppState;

/// Validate `bytes` as an equipment CSV and commit it as a new upload session
///
/// Nothing is written when validation fails. Subscribers are notified once
/// the transaction has committed.
pub async fn process_upload(state: &AppState, filename: &str, bytes: &[u8]) -> ApiResult<StoredUpload> {
    let records = match parse_equipment_csv(bytes) {
        Ok(records) => records,
        Err(e) => {
            warn!("Rejected upload {}: {}", filename, e);
            return Err(e.into());
        }
    };

    let stored = db::store_upload(&state.db, filename, &records, state.retention).await?;

    info!(
        "Stored upload {} as session {}: {} items, {} old sessions purged",
        filename, stored.session.id, stored.session.item_count, stored.sessions_purged
    );

    match state.event_bus.emit(ChemvisEvent::DataUpdated) {
        Ok(receivers) => debug!("Notified {} subscribers of data update", receivers),
        Err(_) => debug!("No subscribers for data update"),
    }

    Ok(stored)
}
