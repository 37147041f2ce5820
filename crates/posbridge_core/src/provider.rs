//! Consumed interface of the external positioning engine.
//!
//! The bridge never looks inside the engine. It creates a handle from
//! credentials, drives it through start/pause/resume/stop, and registers one
//! listener per handle to receive the four callback categories.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Caller-supplied credentials for the provider factory.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    pub app_id: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(app_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            secret: secret.into(),
        }
    }
}

// Never print the secret.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Ambient hosting context handed to the provider factory
/// (the embedding application's identity).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HostContext {
    pub owner: String,
}

impl HostContext {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }
}

/// Provider-defined failure: construction, credential rejection or a
/// rejected start/pause/resume/stop.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i32,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// The provider's own state vocabulary.
///
/// Providers grow their vocabularies over time; anything the bridge does not
/// know arrives as `Other` and is dropped by the translator.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ProviderState {
    Initialized,
    Waiting,
    Running,
    Paused,
    Stopped,
    Other(String),
}

/// Floor the provider matched the fix to.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProviderFloor {
    pub code: String,
}

/// One location fix as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters.
    pub accuracy: f64,
    pub venue_id: Option<String>,
    pub building_id: Option<String>,
    pub floor: Option<ProviderFloor>,
}

/// Callback surface a handle invokes. May be called from any thread.
pub trait PositioningListener: Send + Sync {
    fn on_state_change(&self, state: ProviderState);
    fn on_error(&self, code: i32, message: String);
    fn on_orientation_change(&self, heading: f32, accuracy: i32);
    fn on_location_change(&self, location: ProviderLocation);
}

/// A live provider session. Owned exclusively by the coordinator.
pub trait PositioningHandle: Send {
    fn start(&mut self) -> Result<(), ProviderError>;
    fn pause(&mut self) -> Result<(), ProviderError>;
    fn resume(&mut self) -> Result<(), ProviderError>;
    fn stop(&mut self) -> Result<(), ProviderError>;

    fn add_listener(&mut self, listener: Arc<dyn PositioningListener>);

    /// Remove a listener previously added. Implementations identify it with
    /// [`same_listener`].
    fn remove_listener(&mut self, listener: &Arc<dyn PositioningListener>);
}

/// Factory for provider sessions.
pub trait PositioningProvider: Send + Sync {
    type Handle: PositioningHandle + 'static;

    fn create(
        &self,
        context: &HostContext,
        credentials: &Credentials,
    ) -> Result<Self::Handle, ProviderError>;
}

/// Identity comparison for listeners (data pointer only, vtables may differ
/// between codegen units).
pub fn same_listener(
    a: &Arc<dyn PositioningListener>,
    b: &Arc<dyn PositioningListener>,
) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl PositioningListener for Noop {
        fn on_state_change(&self, _state: ProviderState) {}
        fn on_error(&self, _code: i32, _message: String) {}
        fn on_orientation_change(&self, _heading: f32, _accuracy: i32) {}
        fn on_location_change(&self, _location: ProviderLocation) {}
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials::new("app", "hunter2");
        let shown = format!("{creds:?}");
        assert!(shown.contains("app"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn same_listener_is_identity_not_equality() {
        let a: Arc<dyn PositioningListener> = Arc::new(Noop);
        let b: Arc<dyn PositioningListener> = Arc::new(Noop);
        let a2 = Arc::clone(&a);

        assert!(same_listener(&a, &a2));
        assert!(!same_listener(&a, &b));
    }
}
