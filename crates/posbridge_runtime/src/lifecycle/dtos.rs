//! Command reply DTOs.
//!
//! These are what the command channel serializes back to the caller.

use serde::Serialize;

use posbridge_core::error::{default_message, ErrorKind};
use posbridge_core::lifecycle::{available_commands, LifecycleCommand, LifecycleState};

pub const INIT_SUCCESS: &str = "positioning client initialized successfully";
pub const START_SUCCESS: &str = "positioning client started successfully";
pub const PAUSE_SUCCESS: &str = "positioning client paused successfully";
pub const RESUME_SUCCESS: &str = "positioning client resumed successfully";
pub const STOP_SUCCESS: &str = "positioning client stopped successfully";
pub const STOP_NOT_STARTED: &str = "positioning client has not started yet to be stopped";

/// Reply to a lifecycle command: `success` plus a human-readable message.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    pub message: String,
}

impl CommandResponse {
    pub fn ok(command: LifecycleCommand) -> Self {
        Self {
            success: true,
            message: success_message(command).to_string(),
        }
    }

    /// Soft decline: the command was a benign repeat and changed nothing.
    pub fn declined(command: LifecycleCommand, kind: ErrorKind) -> Self {
        let message = match (command, kind) {
            (LifecycleCommand::Stop, ErrorKind::NotStarted) => STOP_NOT_STARTED,
            _ => default_message(kind),
        };
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

const fn success_message(command: LifecycleCommand) -> &'static str {
    match command {
        LifecycleCommand::Initialize => INIT_SUCCESS,
        LifecycleCommand::Start => START_SUCCESS,
        LifecycleCommand::Pause => PAUSE_SUCCESS,
        LifecycleCommand::Resume => RESUME_SUCCESS,
        LifecycleCommand::Stop => STOP_SUCCESS,
    }
}

/// Introspection reply: current state and the commands that move it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateReport {
    pub state: &'static str,
    pub available_commands: Vec<&'static str>,
}

impl StateReport {
    pub fn for_state(state: LifecycleState) -> Self {
        Self {
            state: state.label(),
            available_commands: available_commands(state)
                .iter()
                .map(|command| command.method())
                .collect(),
        }
    }
}
