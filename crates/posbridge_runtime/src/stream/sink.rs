use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

use posbridge_core::event::CanonicalEvent;

/// The sink refused a payload (closed stream, malformed payload, ...).
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("event sink rejected payload: {0}")]
pub struct SinkError(pub String);

/// Outbound side of the event stream, as seen by the bridge.
///
/// Calls happen while the subscriber lock is held, so implementations must
/// return promptly and never call back into the coordinator.
pub trait EventSink: Send + Sync {
    /// Push one event.
    fn success(&self, event: &CanonicalEvent) -> Result<(), SinkError>;

    /// The stream's own error channel.
    fn error(&self, code: &str, message: &str);
}

/// One item observed on a [`ChannelSink`]'s receiving end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StreamItem {
    Event { event: CanonicalEvent },
    StreamError { code: String, message: String },
}

pub type EventStream = mpsc::UnboundedReceiver<StreamItem>;

/// In-process sink backed by an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StreamItem>,
}

impl ChannelSink {
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a sink and the stream it feeds.
pub fn event_channel() -> (Arc<ChannelSink>, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(ChannelSink { tx }), rx)
}

impl EventSink for ChannelSink {
    fn success(&self, event: &CanonicalEvent) -> Result<(), SinkError> {
        self.tx
            .send(StreamItem::Event {
                event: event.clone(),
            })
            .map_err(|_| SinkError("event stream closed".to_string()))
    }

    fn error(&self, code: &str, message: &str) {
        let _ = self.tx.send(StreamItem::StreamError {
            code: code.to_string(),
            message: message.to_string(),
        });
    }
}
