use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{trace, warn};

use posbridge_core::error::{CoreError, ErrorKind, Result};
use posbridge_core::event::CanonicalEvent;

use super::EventSink;

/// What happened to one event at delivery time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Delivery {
    Delivered,
    NoSubscriber,
    Rejected,
}

/// The single subscriber reference.
///
/// Delivery reads and uses the sink under one lock, so an unsubscribe either
/// happens entirely before a delivery (nothing is sent) or entirely after it.
#[derive(Default)]
pub struct SubscriberSlot {
    sink: Mutex<Option<Arc<dyn EventSink>>>,
}

impl SubscriberSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a sink, replacing any previous one. Returns true if one was replaced.
    pub fn set(&self, sink: Arc<dyn EventSink>) -> Result<bool> {
        let mut guard = self.lock("subscribe")?;
        Ok(guard.replace(sink).is_some())
    }

    /// Clear the sink. Returns true if there was one.
    pub fn clear(&self) -> Result<bool> {
        let mut guard = self.lock("unsubscribe")?;
        Ok(guard.take().is_some())
    }

    pub fn is_set(&self) -> bool {
        self.lock("is_set").map(|g| g.is_some()).unwrap_or(false)
    }

    /// Deliver to whoever is subscribed right now.
    ///
    /// A rejected payload is reported on the sink's error channel; it never
    /// propagates to the caller.
    pub fn deliver(&self, event: &CanonicalEvent) -> Delivery {
        let guard = match self.lock("deliver") {
            Ok(guard) => guard,
            Err(err) => {
                warn!("{err}");
                return Delivery::NoSubscriber;
            }
        };

        let Some(sink) = guard.as_ref() else {
            trace!(kind = event.kind(), "no subscriber; dropping event");
            return Delivery::NoSubscriber;
        };

        match sink.success(event) {
            Ok(()) => Delivery::Delivered,
            Err(err) => {
                warn!(kind = event.kind(), "{err}");
                sink.error(ErrorKind::DeliveryError.code(), &err.to_string());
                Delivery::Rejected
            }
        }
    }

    fn lock(
        &self,
        where_ctx: &'static str,
    ) -> Result<MutexGuard<'_, Option<Arc<dyn EventSink>>>> {
        self.sink.lock().map_err(|_| CoreError::poisoned(where_ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{event_channel, SinkError, StreamItem};
    use posbridge_core::event::BridgeState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RejectingSink {
        errors: AtomicUsize,
    }

    impl EventSink for RejectingSink {
        fn success(&self, _event: &CanonicalEvent) -> std::result::Result<(), SinkError> {
            Err(SinkError("malformed payload".into()))
        }

        fn error(&self, code: &str, _message: &str) {
            assert_eq!(code, "DELIVERY_ERROR");
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn empty_slot_drops_events() {
        let slot = SubscriberSlot::new();
        assert_eq!(
            slot.deliver(&CanonicalEvent::state(BridgeState::Running)),
            Delivery::NoSubscriber
        );
    }

    #[test]
    fn cleared_slot_stops_delivery() {
        let slot = SubscriberSlot::new();
        let (sink, mut rx) = event_channel();

        assert!(!slot.set(sink).unwrap());
        assert_eq!(
            slot.deliver(&CanonicalEvent::state(BridgeState::Running)),
            Delivery::Delivered
        );
        assert!(slot.clear().unwrap());
        assert_eq!(
            slot.deliver(&CanonicalEvent::state(BridgeState::Paused)),
            Delivery::NoSubscriber
        );

        assert!(matches!(rx.try_recv(), Ok(StreamItem::Event { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn rejected_payload_goes_to_error_channel() {
        let slot = SubscriberSlot::new();
        let sink = Arc::new(RejectingSink {
            errors: AtomicUsize::new(0),
        });
        slot.set(sink.clone()).unwrap();

        assert_eq!(
            slot.deliver(&CanonicalEvent::state(BridgeState::Running)),
            Delivery::Rejected
        );
        assert_eq!(sink.errors.load(Ordering::Relaxed), 1);
    }
}
