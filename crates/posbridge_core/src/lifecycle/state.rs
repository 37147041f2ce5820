/// Bridge lifecycle states.
///
/// - Uninitialized: no provider handle
/// - Initialized: handle created, no listener bound, no updates
/// - Running: listener bound, provider producing updates
/// - Paused: listener bound, provider suspended
///
/// There is no resting "stopped" state: stopping releases the handle and
/// returns to `Uninitialized`. "stopped" only exists as an event name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LifecycleState {
    Uninitialized,
    Initialized,
    Running,
    Paused,
}

/// Internal, compact IDs used for error payloads.
impl LifecycleState {
    pub const fn id(self) -> u8 {
        match self {
            LifecycleState::Uninitialized => 0,
            LifecycleState::Initialized => 1,
            LifecycleState::Running => 2,
            LifecycleState::Paused => 3,
        }
    }

    /// True when a provider handle must exist in this state.
    pub const fn has_handle(self) -> bool {
        !matches!(self, LifecycleState::Uninitialized)
    }

    /// True when a listener binding must exist in this state.
    pub const fn has_binding(self) -> bool {
        matches!(self, LifecycleState::Running | LifecycleState::Paused)
    }

    /// Stable, human-readable label for caller-facing replies.
    pub const fn label(self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Running => "running",
            LifecycleState::Paused => "paused",
        }
    }
}

/// Canonical list of all lifecycle states.
pub const ALL_STATES: [LifecycleState; 4] = [
    LifecycleState::Uninitialized,
    LifecycleState::Initialized,
    LifecycleState::Running,
    LifecycleState::Paused,
];
