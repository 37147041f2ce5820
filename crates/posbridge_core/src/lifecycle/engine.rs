use crate::error::{CoreError, ErrorKind, Result};

use super::{LifecycleCommand, LifecycleState};

/// Outcome of checking a command against the current state.
///
/// - `Proceed(goal)`: legal; the caller performs the provider work and, if it
///   succeeds, moves to `goal`
/// - `Decline(kind)`: a benign repeat (soft). Reply `success=false` and keep
///   the state
///
/// Contract violations are not a `Decision`; `decide` returns them as `Err`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Decision {
    Proceed(LifecycleState),
    Decline(ErrorKind),
}

/// Decide what a command means in a given state.
///
/// This enforces:
/// - which commands move the lifecycle, and where to
/// - which repeats are tolerated as soft declines
/// - which calls are caller-contract violations (hard errors)
pub fn decide(current: LifecycleState, via: LifecycleCommand) -> Result<Decision> {
    use LifecycleCommand::*;
    use LifecycleState::*;

    let decision = match (current, via) {
        (Uninitialized, Initialize) => Decision::Proceed(Initialized),
        (_, Initialize) => Decision::Decline(ErrorKind::AlreadyInitialized),

        (Initialized, Start) => Decision::Proceed(Running),
        (Running | Paused, Start) => Decision::Decline(ErrorKind::AlreadyStarted),
        (Uninitialized, Start) => Decision::Decline(ErrorKind::NotInitialized),

        (Running, Pause) => Decision::Proceed(Paused),
        (_, Pause) => {
            return Err(CoreError::rejected_command(
                ErrorKind::NotStarted,
                current.id(),
                via.id(),
            ));
        }

        (Paused, Resume) => Decision::Proceed(Running),
        (_, Resume) => {
            return Err(CoreError::rejected_command(
                ErrorKind::NotPaused,
                current.id(),
                via.id(),
            ));
        }

        (Initialized | Running | Paused, Stop) => Decision::Proceed(Uninitialized),
        (Uninitialized, Stop) => Decision::Decline(ErrorKind::NotStarted),
    };

    Ok(decision)
}

/// Get the goal state for a command that is legal from `start`.
pub fn goal_state_for_command(
    start: LifecycleState,
    command: LifecycleCommand,
) -> Option<LifecycleState> {
    match decide(start, command) {
        Ok(Decision::Proceed(goal)) => Some(goal),
        _ => None,
    }
}

/// Commands that move the lifecycle from a given state.
///
/// Soft declines and hard errors are not listed.
pub fn available_commands(state: LifecycleState) -> &'static [LifecycleCommand] {
    use LifecycleCommand::*;
    use LifecycleState::*;

    match state {
        Uninitialized => &[Initialize],
        Initialized => &[Start, Stop],
        Running => &[Pause, Stop],
        Paused => &[Resume, Stop],
    }
}

/// Unit tests for the lifecycle decision table.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Domain, Payload};
    use crate::lifecycle::{ALL_COMMANDS, ALL_STATES};

    #[test]
    fn pause_outside_running_is_hard_error_with_payload() {
        let e = decide(LifecycleState::Initialized, LifecycleCommand::Pause).unwrap_err();
        assert_eq!(e.kind, ErrorKind::NotStarted);
        assert_eq!(e.domain, Domain::Lifecycle);

        match e.payload {
            Payload::LifecycleCommand {
                from_state,
                via_command,
            } => {
                assert_eq!(from_state, LifecycleState::Initialized.id());
                assert_eq!(via_command, LifecycleCommand::Pause.id());
            }
            _ => panic!("expected LifecycleCommand payload"),
        }
    }

    #[test]
    fn resume_outside_paused_is_hard_error() {
        for state in [
            LifecycleState::Uninitialized,
            LifecycleState::Initialized,
            LifecycleState::Running,
        ] {
            let e = decide(state, LifecycleCommand::Resume).unwrap_err();
            assert_eq!(e.kind, ErrorKind::NotPaused);
        }
    }

    #[test]
    fn repeats_are_soft_declines() {
        assert_eq!(
            decide(LifecycleState::Running, LifecycleCommand::Initialize).unwrap(),
            Decision::Decline(ErrorKind::AlreadyInitialized)
        );
        assert_eq!(
            decide(LifecycleState::Running, LifecycleCommand::Start).unwrap(),
            Decision::Decline(ErrorKind::AlreadyStarted)
        );
        assert_eq!(
            decide(LifecycleState::Uninitialized, LifecycleCommand::Start).unwrap(),
            Decision::Decline(ErrorKind::NotInitialized)
        );
        assert_eq!(
            decide(LifecycleState::Uninitialized, LifecycleCommand::Stop).unwrap(),
            Decision::Decline(ErrorKind::NotStarted)
        );
    }

    #[test]
    fn available_commands_agree_with_decide() {
        for state in ALL_STATES {
            for command in ALL_COMMANDS {
                let listed = available_commands(state).contains(&command);
                let proceeds = matches!(decide(state, command), Ok(Decision::Proceed(_)));
                assert_eq!(listed, proceeds, "{state:?} via {command:?}");
            }
        }
    }

    #[test]
    fn stop_from_every_handle_state_returns_to_uninitialized() {
        for state in ALL_STATES.into_iter().filter(|s| s.has_handle()) {
            assert_eq!(
                goal_state_for_command(state, LifecycleCommand::Stop),
                Some(LifecycleState::Uninitialized)
            );
        }
    }
}
