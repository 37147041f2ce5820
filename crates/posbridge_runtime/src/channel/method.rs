use std::fmt;

use posbridge_core::lifecycle::LifecycleCommand;

/// Method names accepted on the command channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Method {
    Command(LifecycleCommand),
    IsInitialized,
    GetState,
}

impl Method {
    /// Resolve a wire method name. Unknown names map to `None` (not implemented).
    pub fn from_name(name: &str) -> Option<Self> {
        let method = match name {
            "init" => Method::Command(LifecycleCommand::Initialize),
            "start" => Method::Command(LifecycleCommand::Start),
            "pause" => Method::Command(LifecycleCommand::Pause),
            "resume" => Method::Command(LifecycleCommand::Resume),
            "stop" => Method::Command(LifecycleCommand::Stop),
            "isInitialized" => Method::IsInitialized,
            "getState" => Method::GetState,
            _ => return None,
        };
        Some(method)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Method::Command(command) => command.method(),
            Method::IsInitialized => "isInitialized",
            Method::GetState => "getState",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posbridge_core::lifecycle::ALL_COMMANDS;

    #[test]
    fn names_round_trip() {
        for command in ALL_COMMANDS {
            let method = Method::Command(command);
            assert_eq!(Method::from_name(method.name()), Some(method));
        }
        assert_eq!(Method::from_name("getState"), Some(Method::GetState));
        assert_eq!(Method::from_name("isInitialized"), Some(Method::IsInitialized));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(Method::from_name("Init"), None);
        assert_eq!(Method::from_name("getPosition"), None);
    }
}
