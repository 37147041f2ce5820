use std::sync::Arc;

use tokio::sync::mpsc;

use posbridge_core::event::ProviderCallback;
use posbridge_core::provider::{PositioningListener, ProviderLocation, ProviderState};

use crate::stream::{BindingId, Dispatch};

/// Listener registered with a provider handle.
///
/// Never touches the session: every callback is tagged with the binding id
/// and queued for the dispatcher. Sending on an unbounded channel never blocks
/// the provider's thread.
struct BindingListener {
    id: BindingId,
    queue: mpsc::UnboundedSender<Dispatch>,
}

impl BindingListener {
    fn push(&self, callback: ProviderCallback) {
        // Dispatcher gone means the coordinator is being dropped.
        let _ = self.queue.send(Dispatch::Callback {
            binding: self.id,
            callback,
        });
    }
}

impl PositioningListener for BindingListener {
    fn on_state_change(&self, state: ProviderState) {
        self.push(ProviderCallback::StateChange(state));
    }

    fn on_error(&self, code: i32, message: String) {
        self.push(ProviderCallback::Error { code, message });
    }

    fn on_orientation_change(&self, heading: f32, accuracy: i32) {
        self.push(ProviderCallback::Orientation { heading, accuracy });
    }

    fn on_location_change(&self, location: ProviderLocation) {
        self.push(ProviderCallback::Location(location));
    }
}

/// One registration of a [`BindingListener`] on the live handle.
pub(crate) struct ListenerBinding {
    pub(crate) id: BindingId,
    pub(crate) listener: Arc<dyn PositioningListener>,
}

impl ListenerBinding {
    pub(crate) fn new(id: BindingId, queue: mpsc::UnboundedSender<Dispatch>) -> Self {
        Self {
            id,
            listener: Arc::new(BindingListener { id, queue }),
        }
    }
}
