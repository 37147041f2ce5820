/// Lifecycle commands a remote caller can issue.
///
/// `Initialize` carries no credentials: the engine only decides legality,
/// the coordinator owns the arguments.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LifecycleCommand {
    Initialize,
    Start,
    Pause,
    Resume,
    Stop,
}

impl LifecycleCommand {
    /// Internal, compact IDs used for error payloads.
    pub const fn id(self) -> u8 {
        match self {
            LifecycleCommand::Initialize => 1,
            LifecycleCommand::Start => 2,
            LifecycleCommand::Pause => 3,
            LifecycleCommand::Resume => 4,
            LifecycleCommand::Stop => 5,
        }
    }

    /// Method name on the command channel.
    pub const fn method(self) -> &'static str {
        match self {
            LifecycleCommand::Initialize => "init",
            LifecycleCommand::Start => "start",
            LifecycleCommand::Pause => "pause",
            LifecycleCommand::Resume => "resume",
            LifecycleCommand::Stop => "stop",
        }
    }
}

pub const ALL_COMMANDS: [LifecycleCommand; 5] = [
    LifecycleCommand::Initialize,
    LifecycleCommand::Start,
    LifecycleCommand::Pause,
    LifecycleCommand::Resume,
    LifecycleCommand::Stop,
];
