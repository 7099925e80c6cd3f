//! Live-update listener
//!
//! Holds one Server-Sent Events connection to `/events` and turns every
//! `data_updated` event into a refresh request. The listener never
//! reconnects: when the stream cannot be opened or ends, it logs and stops,
//! and manual refresh keeps working.

use chemvis_common::events::DataUpdateMessage;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// Asks the viewer to refetch its snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTrigger;

/// One dispatched SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    /// `message` when the event carried no `event:` field
    pub event: String,
    pub data: String,
}

impl SseMessage {
    pub fn is_data_update(&self) -> bool {
        if self.event == DataUpdateMessage::DATA_UPDATED {
            return true;
        }
        serde_json::from_str::<DataUpdateMessage>(&self.data)
            .map(|message| message.is_data_updated())
            .unwrap_or(false)
    }
}

/// Incremental SSE parser
///
/// Accepts arbitrary byte chunks; events split across chunks are held until
/// the blank line that ends them arrives. Lines may end in `\r\n`, `\n` or a
/// bare `\r`.
#[derive(Debug, Default)]
pub struct SseFrameParser {
    buffer: Vec<u8>,
    /// Last byte seen was `\r`; a following `\n` belongs to the same line end
    after_cr: bool,
}

impl SseFrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every event it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        for &byte in chunk {
            if std::mem::take(&mut self.after_cr) && byte == b'\n' {
                continue;
            }
            if byte == b'\r' {
                self.buffer.push(b'\n');
                self.after_cr = true;
            } else {
                self.buffer.push(byte);
            }
        }

        let mut messages = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(message) = parse_block(&String::from_utf8_lossy(&block)) {
                messages.push(message);
            }
        }
        messages
    }
}

fn parse_block(block: &str) -> Option<SseMessage> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in block.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if event.is_none() && data.is_empty() {
        return None;
    }

    Some(SseMessage {
        event: event.unwrap_or_else(|| "message".to_string()),
        data: data.join("\n"),
    })
}

/// Follow `url` until the stream ends, the request fails or `cancel` fires
///
/// Returns how many refreshes were requested.
pub async fn listen(
    http: reqwest::Client,
    url: String,
    triggers: mpsc::UnboundedSender<RefreshTrigger>,
    cancel: CancellationToken,
) -> ClientResult<usize> {
    let response = http
        .get(&url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ClientError::Server {
            status: response.status().as_u16(),
            message: "event stream unavailable".to_string(),
        });
    }

    info!("Live updates connected: {}", url);

    let mut parser = SseFrameParser::new();
    let mut stream = response.bytes_stream();
    let mut requested = 0;

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => break,
            chunk = stream.next() => chunk,
        };

        let Some(chunk) = chunk else {
            warn!("Live update stream closed by server");
            break;
        };

        for message in parser.push(&chunk?) {
            debug!("SSE event: {}", message.event);
            if message.is_data_update() {
                if triggers.send(RefreshTrigger).is_err() {
                    return Ok(requested);
                }
                requested += 1;
            }
        }
    }

    Ok(requested)
}
