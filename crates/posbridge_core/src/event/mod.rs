//! posbridge_core::event
//!
//! Canonical event vocabulary and the pure translator from provider callbacks.
//! Delivery (who receives an event, and when) is the runtime's concern.

mod canonical;
mod translate;

pub use canonical::{BridgeState, CanonicalEvent};
pub use translate::{canonical_state, translate, DeliveryClock, ProviderCallback};
