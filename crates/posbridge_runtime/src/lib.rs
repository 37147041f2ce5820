//! posbridge_runtime
//!
//! Runtime side of the positioning bridge: owns the provider session,
//! serializes provider callbacks into one outbound stream and exposes a
//! method-call command channel. Core semantics live in `posbridge_core`.

// Public modules
pub mod error;

pub mod channel;
pub mod lifecycle;
pub mod stream;

// Re-export core types that runtime users will commonly need
pub use posbridge_core::error::{CoreError, ErrorKind, Result};
pub use posbridge_core::event::{BridgeState, CanonicalEvent};
pub use posbridge_core::lifecycle::LifecycleState;
pub use posbridge_core::provider::{Credentials, HostContext};
