//! Shared fake provider for the runtime contract tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use posbridge_core::provider::{
    same_listener, Credentials, HostContext, PositioningHandle, PositioningListener,
    PositioningProvider, ProviderError, ProviderFloor, ProviderLocation, ProviderState,
};
use posbridge_runtime::stream::{EventStream, StreamItem};
use posbridge_runtime::CanonicalEvent;

/// Everything the fake provider observed, shared with the test.
#[derive(Default)]
pub struct ProviderLog {
    pub creates: AtomicUsize,
    pub max_listeners: AtomicUsize,
    pub calls: Mutex<Vec<&'static str>>,
    defer_states: AtomicBool,
    pending_states: Mutex<Vec<ProviderState>>,
    live: Mutex<Vec<Arc<dyn PositioningListener>>>,
    removed: Mutex<Vec<Arc<dyn PositioningListener>>>,
}

impl ProviderLog {
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Invoke `f` on every currently registered listener.
    pub fn fire(&self, f: impl Fn(&dyn PositioningListener)) {
        let live = self.live.lock().unwrap().clone();
        for listener in &live {
            f(listener.as_ref());
        }
    }

    /// Invoke `f` on listeners that were registered once and removed since,
    /// the way a provider with in-flight callbacks would.
    pub fn fire_removed(&self, f: impl Fn(&dyn PositioningListener)) {
        let removed = self.removed.lock().unwrap().clone();
        for listener in &removed {
            f(listener.as_ref());
        }
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    /// Deliver state reports held back by a deferring provider, oldest first.
    pub fn release_states(&self) {
        let pending: Vec<ProviderState> = self.pending_states.lock().unwrap().drain(..).collect();
        for state in pending {
            self.fire(|listener| listener.on_state_change(state.clone()));
        }
    }

    fn echo(&self, state: ProviderState) {
        if self.defer_states.load(Ordering::SeqCst) {
            self.pending_states.lock().unwrap().push(state);
            return;
        }
        self.fire(|listener| listener.on_state_change(state.clone()));
    }
}

#[derive(Clone, Default)]
pub struct FakeProvider {
    pub log: Arc<ProviderLog>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that reports state changes later, from its own worker.
    pub fn deferring() -> Self {
        let provider = Self::default();
        provider.log.defer_states.store(true, Ordering::SeqCst);
        provider
    }
}

impl PositioningProvider for FakeProvider {
    type Handle = FakeHandle;

    fn create(
        &self,
        _context: &HostContext,
        credentials: &Credentials,
    ) -> Result<FakeHandle, ProviderError> {
        if credentials.secret == "rejected" {
            return Err(ProviderError::new(401, "credentials rejected"));
        }
        self.log.creates.fetch_add(1, Ordering::SeqCst);
        Ok(FakeHandle {
            log: Arc::clone(&self.log),
        })
    }
}

/// Handle that echoes every transition as a provider state callback.
pub struct FakeHandle {
    log: Arc<ProviderLog>,
}

impl PositioningHandle for FakeHandle {
    fn start(&mut self) -> Result<(), ProviderError> {
        self.log.record("start");
        self.log.echo(ProviderState::Running);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), ProviderError> {
        self.log.record("pause");
        self.log.echo(ProviderState::Paused);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), ProviderError> {
        self.log.record("resume");
        self.log.echo(ProviderState::Running);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ProviderError> {
        self.log.record("stop");
        self.log.echo(ProviderState::Stopped);
        Ok(())
    }

    fn add_listener(&mut self, listener: Arc<dyn PositioningListener>) {
        let mut live = self.log.live.lock().unwrap();
        live.push(listener);
        self.log
            .max_listeners
            .fetch_max(live.len(), Ordering::SeqCst);
    }

    fn remove_listener(&mut self, listener: &Arc<dyn PositioningListener>) {
        let mut live = self.log.live.lock().unwrap();
        if let Some(pos) = live.iter().position(|l| same_listener(l, listener)) {
            let removed = live.remove(pos);
            self.log.removed.lock().unwrap().push(removed);
        }
    }
}

pub fn fix(floor: Option<&str>) -> ProviderLocation {
    ProviderLocation {
        latitude: 1.3521,
        longitude: 103.8198,
        accuracy: 4.5,
        venue_id: Some("venue-a".into()),
        building_id: Some("tower-1".into()),
        floor: floor.map(|code| ProviderFloor { code: code.into() }),
    }
}

/// Everything currently sitting in the stream, events only.
pub fn drain_events(rx: &mut EventStream) -> Vec<CanonicalEvent> {
    drain(rx)
        .into_iter()
        .filter_map(|item| match item {
            StreamItem::Event { event } => Some(event),
            StreamItem::StreamError { .. } => None,
        })
        .collect()
}

pub fn drain(rx: &mut EventStream) -> Vec<StreamItem> {
    let mut out = Vec::new();
    while let Ok(item) = rx.try_recv() {
        out.push(item);
    }
    out
}
