//! Background snapshot fetching
//!
//! Each refresh runs on its own tokio task and reports back through an mpsc
//! channel. Fetches are numbered in request order so the receiver can drop
//! results that arrive after a newer request's.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::{Snapshot, SnapshotSource};
use crate::error::ClientResult;

/// Result of one fetch, tagged with its request number
#[derive(Debug)]
pub struct FetchOutcome {
    pub sequence: u64,
    pub result: ClientResult<Snapshot>,
}

pub struct Poller<S> {
    source: Arc<S>,
    last_sequence: AtomicU64,
    tx: mpsc::UnboundedSender<FetchOutcome>,
}

impl<S: SnapshotSource> Poller<S> {
    pub fn new(source: Arc<S>, tx: mpsc::UnboundedSender<FetchOutcome>) -> Self {
        Self {
            source,
            last_sequence: AtomicU64::new(0),
            tx,
        }
    }

    /// Start a fetch in the background and return its sequence number
    ///
    /// In-flight fetches are never cancelled.
    pub fn request_refresh(&self) -> u64 {
        let sequence = self.last_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let result = source.fetch_snapshot().await;
            if tx.send(FetchOutcome { sequence, result }).is_err() {
                debug!("Fetch {} finished after the viewer closed", sequence);
            }
        });

        sequence
    }

    /// Sequence number of the most recent request (0 before the first)
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence.load(Ordering::SeqCst)
    }
}
