//! Server-Sent Events stream of dataset changes

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::AppState;

/// Name of the first event sent on every stream
pub const CONNECTED_EVENT: &str = "connected";

/// GET /events
///
/// Sends `connected` once, then one `data_updated` event per committed
/// upload. The stream ends when the server shuts down.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE client connected");

    let rx = state.event_bus.subscribe();

    let connected = stream::once(async {
        Ok::<_, Infallible>(Event::default().event(CONNECTED_EVENT).data("{}"))
    });

    let updates = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match Event::default().event(event.sse_name()).json_data(event.wire_message()) {
                Ok(sse_event) => Some(Ok(sse_event)),
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    None
                }
            },
            Err(e) => {
                // Lagged subscribers skip what they missed
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    let stream = connected
        .chain(updates)
        .take_until(state.shutdown.clone().cancelled_owned());

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
