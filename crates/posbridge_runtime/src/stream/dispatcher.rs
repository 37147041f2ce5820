use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use posbridge_core::error::{CoreError, Domain, ErrorKind, Result};
use posbridge_core::event::{
    translate, BridgeState, CanonicalEvent, DeliveryClock, ProviderCallback,
};

use super::{Delivery, SubscriberSlot};

/// Identity of one listener registration. `0` means "no live binding".
pub type BindingId = u64;

pub const NO_BINDING: BindingId = 0;

/// Work item on the single-consumer queue.
#[derive(Debug)]
pub enum Dispatch {
    /// A provider callback, tagged with the binding that received it.
    Callback {
        binding: BindingId,
        callback: ProviderCallback,
    },
    /// A lifecycle transition the coordinator completed.
    Lifecycle(BridgeState),
    /// Barrier: answered once everything queued before it is handled.
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// State shared between the coordinator (writer) and the dispatcher (reader).
#[derive(Default)]
pub struct StreamShared {
    live_binding: AtomicU64,
    subscriber: SubscriberSlot,
    clock: DeliveryClock,
}

impl StreamShared {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_binding(&self) -> BindingId {
        self.live_binding.load(Ordering::Acquire)
    }

    pub fn set_live_binding(&self, id: BindingId) {
        self.live_binding.store(id, Ordering::Release);
    }

    /// Retire `id` if it is still the live binding.
    pub fn retire_binding(&self, id: BindingId) {
        let _ = self.live_binding.compare_exchange(
            id,
            NO_BINDING,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    pub fn subscriber(&self) -> &SubscriberSlot {
        &self.subscriber
    }
}

/// Single consumer of the dispatch queue.
///
/// All translation and delivery happens here, on one execution context, in
/// queue order.
pub struct Dispatcher {
    rx: mpsc::UnboundedReceiver<Dispatch>,
    shared: Arc<StreamShared>,
}

impl Dispatcher {
    pub fn new(rx: mpsc::UnboundedReceiver<Dispatch>, shared: Arc<StreamShared>) -> Self {
        Self { rx, shared }
    }

    /// Run on the current tokio runtime if there is one, else on a dedicated thread.
    pub fn spawn(self) -> Result<()> {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(self.run());
            return Ok(());
        }

        std::thread::Builder::new()
            .name("posbridge-dispatch".to_string())
            .spawn(move || self.run_blocking())
            .map(|_| ())
            .map_err(|e| {
                CoreError::fatal()
                    .domain(Domain::Delivery)
                    .kind(ErrorKind::Internal)
                    .msgf(format_args!("failed to spawn dispatcher thread: {e}"))
                    .build()
            })
    }

    pub async fn run(mut self) {
        while let Some(item) = self.rx.recv().await {
            if self.handle(item).is_break() {
                break;
            }
        }
        debug!("event dispatcher stopped");
    }

    fn run_blocking(mut self) {
        while let Some(item) = self.rx.blocking_recv() {
            if self.handle(item).is_break() {
                break;
            }
        }
        debug!("event dispatcher stopped");
    }

    fn handle(&mut self, item: Dispatch) -> ControlFlow<()> {
        match item {
            Dispatch::Callback { binding, callback } => {
                let live = self.shared.live_binding();
                if binding != live {
                    trace!(binding, live, "discarding callback from detached binding");
                    return ControlFlow::Continue(());
                }
                match translate(callback, self.shared.clock.now_millis()) {
                    // Lifecycle states are announced by the coordinator only.
                    Some(CanonicalEvent::StateChanged { state }) => {
                        trace!(?state, "provider state report not forwarded");
                    }
                    Some(event) => self.forward(event),
                    None => {}
                }
            }
            Dispatch::Lifecycle(state) => self.forward(CanonicalEvent::state(state)),
            Dispatch::Flush(done) => {
                let _ = done.send(());
            }
            Dispatch::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn forward(&self, event: CanonicalEvent) {
        if self.shared.subscriber.deliver(&event) == Delivery::Delivered {
            trace!(kind = event.kind(), "event delivered");
        }
    }
}
