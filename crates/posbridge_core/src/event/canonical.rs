use serde::{Deserialize, Serialize};

/// Canonical state names pushed on the event stream.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeState {
    Initialized,
    Running,
    Paused,
    Stopped,
}

/// The bridge's own normalized event, independent of provider types.
///
/// Wire form is a JSON object tagged by `type`:
/// `state`, `location`, `orientation` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CanonicalEvent {
    #[serde(rename = "state")]
    StateChanged { state: BridgeState },

    #[serde(rename = "location", rename_all = "camelCase")]
    LocationUpdated {
        latitude: f64,
        longitude: f64,
        accuracy: f64,
        venue_id: Option<String>,
        building_id: Option<String>,
        /// `None` is the explicit "no floor" marker, serialized as `null`.
        floor: Option<String>,
        /// Epoch milliseconds, stamped by the bridge at translation time.
        timestamp: u64,
    },

    #[serde(rename = "orientation")]
    OrientationUpdated { heading: f32, accuracy: i32 },

    #[serde(rename = "error")]
    Error { code: i32, message: String },
}

impl CanonicalEvent {
    pub fn state(state: BridgeState) -> Self {
        CanonicalEvent::StateChanged { state }
    }

    /// Wire tag of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            CanonicalEvent::StateChanged { .. } => "state",
            CanonicalEvent::LocationUpdated { .. } => "location",
            CanonicalEvent::OrientationUpdated { .. } => "orientation",
            CanonicalEvent::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_event_wire_form() {
        let v = serde_json::to_value(CanonicalEvent::state(BridgeState::Paused)).unwrap();
        assert_eq!(v, json!({"type": "state", "state": "paused"}));
    }

    #[test]
    fn location_event_keeps_absent_floor_as_null() {
        let ev = CanonicalEvent::LocationUpdated {
            latitude: 22.3,
            longitude: 114.1,
            accuracy: 4.5,
            venue_id: Some("v1".into()),
            building_id: None,
            floor: None,
            timestamp: 1_700_000_000_000,
        };
        let v = serde_json::to_value(&ev).unwrap();

        assert_eq!(v["type"], "location");
        assert_eq!(v["venueId"], "v1");
        assert!(v.get("buildingId").is_some_and(|b| b.is_null()));
        assert!(v.get("floor").is_some_and(|f| f.is_null()));
        assert_eq!(v["timestamp"], 1_700_000_000_000u64);
    }

    #[test]
    fn empty_floor_code_stays_distinct_from_absent() {
        let with_empty = CanonicalEvent::LocationUpdated {
            latitude: 0.0,
            longitude: 0.0,
            accuracy: 1.0,
            venue_id: None,
            building_id: None,
            floor: Some(String::new()),
            timestamp: 0,
        };
        let v = serde_json::to_value(&with_empty).unwrap();
        assert_eq!(v["floor"], "");

        let back: CanonicalEvent = serde_json::from_value(v).unwrap();
        assert_eq!(back, with_empty);
    }
}
