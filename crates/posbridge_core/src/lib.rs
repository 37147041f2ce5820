//! posbridge_core: transport-agnostic core of the positioning bridge.
//!
//! Design goals:
//! - Pure, testable logic (no channel or runtime deps).
//! - Explicit types; no macro wizardry.
//! - Small, stable public API surface.

pub mod error;

/// Lifecycle decision table + introspection.
pub mod lifecycle;

/// Canonical events + provider callback translation.
pub mod event;

/// Consumed interface of the external positioning provider.
pub mod provider;
