use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::provider::{ProviderLocation, ProviderState};

use super::{BridgeState, CanonicalEvent};

/// One raw provider callback, flattened out of the four listener methods.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCallback {
    StateChange(ProviderState),
    Error { code: i32, message: String },
    Orientation { heading: f32, accuracy: i32 },
    Location(ProviderLocation),
}

/// Translate a provider callback into a canonical event.
///
/// `timestamp_millis` is stamped onto location events; the provider's own
/// time is never used. Returns `None` for provider states the bridge does not
/// know.
pub fn translate(callback: ProviderCallback, timestamp_millis: u64) -> Option<CanonicalEvent> {
    match callback {
        ProviderCallback::StateChange(state) => {
            let Some(state) = canonical_state(&state) else {
                debug!(?state, "dropping unrecognized provider state");
                return None;
            };
            Some(CanonicalEvent::StateChanged { state })
        }
        ProviderCallback::Error { code, message } => Some(CanonicalEvent::Error { code, message }),
        ProviderCallback::Orientation { heading, accuracy } => {
            Some(CanonicalEvent::OrientationUpdated { heading, accuracy })
        }
        ProviderCallback::Location(location) => Some(CanonicalEvent::LocationUpdated {
            latitude: location.latitude,
            longitude: location.longitude,
            accuracy: location.accuracy,
            venue_id: location.venue_id,
            building_id: location.building_id,
            floor: location.floor.map(|floor| floor.code),
            timestamp: timestamp_millis,
        }),
    }
}

/// Map the provider's state vocabulary onto canonical names.
///
/// `Waiting` (searching for a first fix) has no canonical counterpart.
pub fn canonical_state(state: &ProviderState) -> Option<BridgeState> {
    match state {
        ProviderState::Initialized => Some(BridgeState::Initialized),
        ProviderState::Running => Some(BridgeState::Running),
        ProviderState::Paused => Some(BridgeState::Paused),
        ProviderState::Stopped => Some(BridgeState::Stopped),
        ProviderState::Waiting | ProviderState::Other(_) => None,
    }
}

/// Wall-clock milliseconds that never go backwards.
///
/// Reads the system clock and clamps it to the last value handed out, so a
/// clock step back never produces out-of-order event timestamps.
#[derive(Debug, Default)]
pub struct DeliveryClock {
    last: AtomicU64,
}

impl DeliveryClock {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    pub fn now_millis(&self) -> u64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|dur| dur.as_millis() as u64)
            .unwrap_or(0);
        self.observe(wall)
    }

    fn observe(&self, wall: u64) -> u64 {
        let prev = self.last.fetch_max(wall, Ordering::AcqRel);
        prev.max(wall)
    }
}
