//! Change-notification events
//!
//! Provides the shared event definition and the EventBus used by the server
//! to fan "dataset changed" notifications out to live-update subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// ChemVis event types
///
/// Events carry no data: subscribers re-read whatever they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChemvisEvent {
    /// An upload was committed; the equipment set changed
    DataUpdated,
}

impl ChemvisEvent {
    /// SSE `event:` field used on the wire
    pub fn sse_name(&self) -> &'static str {
        match self {
            ChemvisEvent::DataUpdated => DataUpdateMessage::DATA_UPDATED,
        }
    }

    /// JSON body sent to subscribers for this event
    pub fn wire_message(&self) -> DataUpdateMessage {
        match self {
            ChemvisEvent::DataUpdated => DataUpdateMessage::data_updated(),
        }
    }
}

/// Body of a live-update message: `{"message": "data_updated"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataUpdateMessage {
    pub message: String,
}

impl DataUpdateMessage {
    pub const DATA_UPDATED: &'static str = "data_updated";

    pub fn data_updated() -> Self {
        Self {
            message: Self::DATA_UPDATED.to_string(),
        }
    }

    pub fn is_data_updated(&self) -> bool {
        self.message == Self::DATA_UPDATED
    }
}

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// Delivery is best-effort and at-most-once: a receiver only sees events
/// emitted after it subscribed, and nothing is kept for absent subscribers.
///
/// # Examples
///
/// ```
/// use chemvis_common::events::{ChemvisEvent, EventBus};
///
/// let event_bus = EventBus::new(16);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit(ChemvisEvent::DataUpdated).ok();
/// assert_eq!(rx.try_recv().unwrap(), ChemvisEvent::DataUpdated);
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChemvisEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events buffered per subscriber before the
    ///   oldest are dropped for that subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ChemvisEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    pub fn emit(
        &self,
        event: ChemvisEvent,
    ) -> Result<usize, broadcast::error::SendError<ChemvisEvent>> {
        self.tx.send(event)
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
