//! posbridge_runtime::stream
//!
//! Outbound event stream: the subscriber slot, the sink abstraction and the
//! single-consumer dispatcher that serializes provider callbacks.

mod dispatcher;
pub use dispatcher::{BindingId, Dispatch, Dispatcher, StreamShared, NO_BINDING};

mod sink;
pub use sink::{event_channel, ChannelSink, EventSink, EventStream, SinkError, StreamItem};

mod slot;
pub use slot::{Delivery, SubscriberSlot};
