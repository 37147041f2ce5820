use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use posbridge_core::error::{CoreError, Domain, ErrorKind, Result};
use posbridge_core::lifecycle::LifecycleCommand;
use posbridge_core::provider::{Credentials, PositioningProvider};

use super::Method;
use crate::error::log_core_error;
use crate::lifecycle::LifecycleCoordinator;

/// One inbound method call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

/// Wire reply for one method call.
///
/// Soft declines are `Success` values with `success: false`; only contract
/// violations and provider failures become `Error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum Reply {
    Success(serde_json::Value),
    Error { code: String, message: String },
    NotImplemented,
}

impl Reply {
    pub fn from_error(err: &CoreError) -> Self {
        Reply::Error {
            code: err.code().to_string(),
            message: err.message.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Reply::Success(_))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitArgs {
    app_id: String,
    secret: String,
}

/// Command channel adapter.
///
/// Owns a shared coordinator and turns method calls into replies. Every
/// failure becomes a reply; nothing here panics or propagates.
pub struct CommandChannel<P: PositioningProvider> {
    coordinator: Arc<LifecycleCoordinator<P>>,
}

impl<P: PositioningProvider> CommandChannel<P> {
    pub fn new(coordinator: Arc<LifecycleCoordinator<P>>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &Arc<LifecycleCoordinator<P>> {
        &self.coordinator
    }

    /// Handle one call.
    pub fn handle(&self, call: &MethodCall) -> Reply {
        let Some(method) = Method::from_name(&call.method) else {
            debug!(method = %call.method, "method not implemented");
            return Reply::NotImplemented;
        };

        match self.dispatch(method, &call.args) {
            Ok(value) => Reply::Success(value),
            Err(err) => {
                log_core_error(&err);
                Reply::from_error(&err)
            }
        }
    }

    fn dispatch(&self, method: Method, args: &serde_json::Value) -> Result<serde_json::Value> {
        let coordinator = &self.coordinator;
        match method {
            Method::Command(LifecycleCommand::Initialize) => {
                to_value(coordinator.initialize_with(|| decode_credentials(args))?)
            }
            Method::Command(LifecycleCommand::Start) => to_value(coordinator.start()?),
            Method::Command(LifecycleCommand::Pause) => to_value(coordinator.pause()?),
            Method::Command(LifecycleCommand::Resume) => to_value(coordinator.resume()?),
            Method::Command(LifecycleCommand::Stop) => to_value(coordinator.stop()?),
            Method::IsInitialized => to_value(coordinator.is_initialized()?),
            Method::GetState => to_value(coordinator.state_report()?),
        }
    }
}

fn decode_credentials(args: &serde_json::Value) -> Result<Credentials> {
    let args = InitArgs::deserialize(args).map_err(|e| {
        CoreError::warn()
            .domain(Domain::Command)
            .kind(ErrorKind::InvalidArgument)
            .msgf(format_args!("init expects appId and secret: {e}"))
            .build()
    })?;
    Ok(Credentials::new(args.app_id, args.secret))
}

fn to_value<T: Serialize>(value: T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| {
        CoreError::error()
            .domain(Domain::Command)
            .kind(ErrorKind::Internal)
            .msgf(format_args!("failed to encode reply: {e}"))
            .build()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_wire_shape() {
        assert_eq!(
            serde_json::to_value(Reply::Success(json!(true))).unwrap(),
            json!({ "status": "success", "value": true })
        );
        assert_eq!(
            serde_json::to_value(Reply::NotImplemented).unwrap(),
            json!({ "status": "notImplemented" })
        );
        assert_eq!(
            serde_json::to_value(Reply::Error {
                code: "NOT_PAUSED".into(),
                message: "positioning client not paused yet to resume".into(),
            })
            .unwrap(),
            json!({
                "status": "error",
                "value": {
                    "code": "NOT_PAUSED",
                    "message": "positioning client not paused yet to resume"
                }
            })
        );
    }

    #[test]
    fn method_call_args_default_to_null() {
        let call: MethodCall = serde_json::from_str(r#"{"method":"start"}"#).unwrap();
        assert_eq!(call, MethodCall::new("start", serde_json::Value::Null));
    }

    #[test]
    fn missing_init_args_are_invalid_argument() {
        let err = decode_credentials(&json!({ "appId": "A" })).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(err.message.contains("secret"));

        let creds = decode_credentials(&json!({ "appId": "A", "secret": "S" })).unwrap();
        assert_eq!(creds, Credentials::new("A", "S"));
    }
}
