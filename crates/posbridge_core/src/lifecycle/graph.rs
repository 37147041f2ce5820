use super::{
    available_commands, goal_state_for_command, LifecycleCommand, LifecycleState, ALL_STATES,
};

/// Lifecycle transition graph derived from the decision table.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransitionGraph {
    pub states: Vec<LifecycleState>,
    pub transitions: Vec<TransitionEdge>,
}

/// Directed lifecycle transition edge.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransitionEdge {
    pub start: LifecycleState,
    pub command: LifecycleCommand,
    pub goal: LifecycleState,
}

/// Build the canonical lifecycle transition graph.
pub fn transition_graph() -> TransitionGraph {
    let mut transitions = Vec::new();

    for state in ALL_STATES {
        for command in available_commands(state) {
            if let Some(goal) = goal_state_for_command(state, *command) {
                transitions.push(TransitionEdge {
                    start: state,
                    command: *command,
                    goal,
                });
            }
        }
    }

    TransitionGraph {
        states: ALL_STATES.to_vec(),
        transitions,
    }
}
