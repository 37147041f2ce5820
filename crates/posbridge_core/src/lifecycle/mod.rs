//! posbridge_core::lifecycle
//!
//! Pure (transport-agnostic) lifecycle semantics for the positioning bridge.
//! This module contains **no** provider or channel code.
//!
//! Key ideas:
//! - Four stable states, one authoritative value owned by the coordinator
//! - `decide()` splits every (state, command) pair into proceed, soft decline or hard error
//! - The coordinator performs provider work only after `decide()` says proceed

mod command;
mod engine;
mod graph;
mod state;

pub use command::{LifecycleCommand, ALL_COMMANDS};
pub use engine::{available_commands, decide, goal_state_for_command, Decision};
pub use graph::{transition_graph, TransitionEdge, TransitionGraph};
pub use state::{LifecycleState, ALL_STATES};
