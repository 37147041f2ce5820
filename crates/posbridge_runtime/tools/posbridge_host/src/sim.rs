//! Simulated positioning provider.
//!
//! Walks a fixed track while running: one location fix and one orientation
//! update per period. Every start/pause/resume/stop is echoed back as a
//! provider state callback.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use posbridge_core::provider::{
    same_listener, Credentials, HostContext, PositioningHandle, PositioningListener,
    PositioningProvider, ProviderError, ProviderFloor, ProviderLocation, ProviderState,
};

pub const ERR_CREDENTIALS: i32 = 1001;
pub const ERR_NO_RUNTIME: i32 = 1002;

const ORIGIN: (f64, f64) = (22.3027, 114.1772);
const STEP_DEGREES: f64 = 0.00001;

#[derive(Debug, Clone)]
pub struct SimProvider {
    period: Duration,
    floor: Option<String>,
}

impl SimProvider {
    pub fn new(period: Duration, floor: Option<String>) -> Self {
        Self { period, floor }
    }
}

impl PositioningProvider for SimProvider {
    type Handle = SimHandle;

    fn create(
        &self,
        context: &HostContext,
        credentials: &Credentials,
    ) -> Result<SimHandle, ProviderError> {
        if credentials.app_id.trim().is_empty() || credentials.secret.trim().is_empty() {
            return Err(ProviderError::new(ERR_CREDENTIALS, "credentials rejected"));
        }
        debug!(owner = %context.owner, app_id = %credentials.app_id, "simulated session created");
        Ok(SimHandle {
            track: Arc::new(Track {
                listeners: Mutex::new(Vec::new()),
                active: AtomicBool::new(false),
                ticks: AtomicU64::new(0),
                floor: self.floor.clone(),
            }),
            period: self.period,
            ticker: None,
        })
    }
}

/// State shared between a handle and its ticker task.
struct Track {
    listeners: Mutex<Vec<Arc<dyn PositioningListener>>>,
    active: AtomicBool,
    ticks: AtomicU64,
    floor: Option<String>,
}

impl Track {
    fn each_listener(&self, f: impl Fn(&dyn PositioningListener)) {
        let listeners = match self.listeners.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        for listener in &listeners {
            f(listener.as_ref());
        }
    }

    fn tick(&self) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }
        let n = self.ticks.fetch_add(1, Ordering::Relaxed) as f64;
        let location = ProviderLocation {
            latitude: ORIGIN.0 + n * STEP_DEGREES,
            longitude: ORIGIN.1 + n * STEP_DEGREES,
            accuracy: 3.0,
            venue_id: Some("sim-venue".to_string()),
            building_id: Some("sim-building".to_string()),
            floor: self.floor.clone().map(|code| ProviderFloor { code }),
        };
        let heading = ((n * 15.0) % 360.0) as f32;

        self.each_listener(|listener| {
            listener.on_location_change(location.clone());
            listener.on_orientation_change(heading, 3);
        });
    }
}

pub struct SimHandle {
    track: Arc<Track>,
    period: Duration,
    ticker: Option<JoinHandle<()>>,
}

impl SimHandle {
    fn announce(&self, state: ProviderState) {
        self.track
            .each_listener(|listener| listener.on_state_change(state.clone()));
    }

    fn spawn_ticker(&mut self) -> Result<(), ProviderError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| ProviderError::new(ERR_NO_RUNTIME, "simulator needs a tokio runtime"))?;
        let track = Arc::clone(&self.track);
        let period = self.period;
        self.ticker = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                track.tick();
            }
        }));
        Ok(())
    }

    fn halt_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl PositioningHandle for SimHandle {
    fn start(&mut self) -> Result<(), ProviderError> {
        self.halt_ticker();
        self.spawn_ticker()?;
        self.track.active.store(true, Ordering::Release);
        self.announce(ProviderState::Running);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), ProviderError> {
        self.track.active.store(false, Ordering::Release);
        self.announce(ProviderState::Paused);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), ProviderError> {
        self.track.active.store(true, Ordering::Release);
        self.announce(ProviderState::Running);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ProviderError> {
        self.track.active.store(false, Ordering::Release);
        self.halt_ticker();
        self.announce(ProviderState::Stopped);
        Ok(())
    }

    fn add_listener(&mut self, listener: Arc<dyn PositioningListener>) {
        if let Ok(mut listeners) = self.track.listeners.lock() {
            listeners.push(listener);
        }
    }

    fn remove_listener(&mut self, listener: &Arc<dyn PositioningListener>) {
        if let Ok(mut listeners) = self.track.listeners.lock() {
            listeners.retain(|l| !same_listener(l, listener));
        }
    }
}

impl Drop for SimHandle {
    fn drop(&mut self) {
        self.halt_ticker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counting {
        states: Mutex<Vec<ProviderState>>,
        fixes: AtomicUsize,
        floors: Mutex<Vec<Option<ProviderFloor>>>,
    }

    impl PositioningListener for Counting {
        fn on_state_change(&self, state: ProviderState) {
            self.states.lock().unwrap().push(state);
        }
        fn on_error(&self, _code: i32, _message: String) {}
        fn on_orientation_change(&self, _heading: f32, _accuracy: i32) {}
        fn on_location_change(&self, location: ProviderLocation) {
            self.fixes.fetch_add(1, Ordering::Relaxed);
            self.floors.lock().unwrap().push(location.floor);
        }
    }

    fn context() -> HostContext {
        HostContext::new("test")
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let provider = SimProvider::new(Duration::from_millis(10), None);
        let err = provider
            .create(&context(), &Credentials::new("app", " "))
            .err()
            .unwrap();
        assert_eq!(err.code, ERR_CREDENTIALS);
    }

    #[test]
    fn start_outside_runtime_fails() {
        let provider = SimProvider::new(Duration::from_millis(10), None);
        let mut handle = provider.create(&context(), &Credentials::new("a", "s")).unwrap();
        assert_eq!(handle.start().unwrap_err().code, ERR_NO_RUNTIME);
    }

    #[tokio::test]
    async fn ticks_only_while_running() {
        let provider = SimProvider::new(Duration::from_millis(10), Some("L3".into()));
        let mut handle = provider.create(&context(), &Credentials::new("a", "s")).unwrap();
        let counting = Arc::new(Counting::default());
        handle.add_listener(counting.clone());

        handle.start().unwrap();
        tokio::time::sleep(Duration::from_millis(45)).await;
        assert!(counting.fixes.load(Ordering::Relaxed) > 0);

        handle.pause().unwrap();
        tokio::time::sleep(Duration::from_millis(15)).await;
        let paused_at = counting.fixes.load(Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(35)).await;
        assert_eq!(counting.fixes.load(Ordering::Relaxed), paused_at);

        handle.stop().unwrap();
        assert_eq!(
            *counting.states.lock().unwrap(),
            vec![
                ProviderState::Running,
                ProviderState::Paused,
                ProviderState::Stopped
            ]
        );
        assert!(counting
            .floors
            .lock()
            .unwrap()
            .iter()
            .all(|floor| floor.as_ref().map(|f| f.code.as_str()) == Some("L3")));
    }

    #[test]
    fn removed_listener_hears_nothing() {
        let provider = SimProvider::new(Duration::from_millis(10), None);
        let mut handle = provider.create(&context(), &Credentials::new("a", "s")).unwrap();
        let counting = Arc::new(Counting::default());
        let listener: Arc<dyn PositioningListener> = counting.clone();

        handle.add_listener(Arc::clone(&listener));
        handle.remove_listener(&listener);
        handle.pause().unwrap();

        assert!(counting.states.lock().unwrap().is_empty());
    }
}
