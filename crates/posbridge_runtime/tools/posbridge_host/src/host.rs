//! Line-delimited JSON front end.
//!
//! One method call per input line, one [`HostLine`] per output line. Replies
//! and stream items share the output channel, so their relative order on
//! stdout is the order they were produced in.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, info};

use posbridge_core::error::{CoreError, Domain, ErrorKind};
use posbridge_core::provider::PositioningProvider;
use posbridge_runtime::channel::{CommandChannel, MethodCall, Reply};
use posbridge_runtime::error::log_core_error;
use posbridge_runtime::lifecycle::LifecycleCoordinator;
use posbridge_runtime::stream::{event_channel, StreamItem};
use posbridge_runtime::{CanonicalEvent, Result};

/// One line of host output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HostLine {
    Reply { method: String, reply: Reply },
    Event { event: CanonicalEvent },
    StreamError { code: String, message: String },
}

impl From<StreamItem> for HostLine {
    fn from(item: StreamItem) -> Self {
        match item {
            StreamItem::Event { event } => HostLine::Event { event },
            StreamItem::StreamError { code, message } => HostLine::StreamError { code, message },
        }
    }
}

pub type HostOutput = mpsc::UnboundedSender<HostLine>;

pub struct Host<P: PositioningProvider + 'static> {
    channel: CommandChannel<P>,
    out: HostOutput,
}

impl<P: PositioningProvider + 'static> Host<P> {
    pub fn new(coordinator: Arc<LifecycleCoordinator<P>>, out: HostOutput) -> Self {
        Self {
            channel: CommandChannel::new(coordinator),
            out,
        }
    }

    /// Handle one input line and return its reply line.
    pub fn handle_line(&self, line: &str) -> HostLine {
        let call: MethodCall = match serde_json::from_str(line) {
            Ok(call) => call,
            Err(e) => {
                let err = CoreError::warn()
                    .domain(Domain::Command)
                    .kind(ErrorKind::InvalidArgument)
                    .msgf(format_args!("malformed method call: {e}"))
                    .build();
                log_core_error(&err);
                return HostLine::Reply {
                    method: String::new(),
                    reply: Reply::from_error(&err),
                };
            }
        };

        let reply = match call.method.as_str() {
            "listen" => self.stream_reply(self.listen()),
            "cancel" => self.stream_reply(self.cancel()),
            _ => self.channel.handle(&call),
        };

        HostLine::Reply {
            method: call.method,
            reply,
        }
    }

    /// Subscribe a fresh sink and forward its items to the output.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen(&self) -> Result<()> {
        let (sink, mut stream) = event_channel();
        self.channel.coordinator().subscribe(sink)?;

        let out = self.out.clone();
        tokio::spawn(async move {
            // Ends once the sink is dropped (cancel, a newer listen, teardown).
            while let Some(item) = stream.recv().await {
                if out.send(item.into()).is_err() {
                    break;
                }
            }
            debug!("event forwarder finished");
        });
        info!("listening for positioning events");
        Ok(())
    }

    pub fn cancel(&self) -> Result<()> {
        self.channel.coordinator().unsubscribe()
    }

    fn stream_reply(&self, result: Result<()>) -> Reply {
        match result {
            Ok(()) => Reply::Success(json!(true)),
            Err(err) => {
                log_core_error(&err);
                Reply::from_error(&err)
            }
        }
    }
}
