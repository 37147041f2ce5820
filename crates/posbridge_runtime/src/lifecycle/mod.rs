//! posbridge_runtime::lifecycle
//!
//! The lifecycle coordinator and its command reply types.

// Listener registration on the provider handle.
mod binding;

// Command reply DTOs.
pub mod dtos;
pub use dtos::{CommandResponse, StateReport};

mod coordinator;
pub use coordinator::{CoordinatorConfig, LifecycleCoordinator};
