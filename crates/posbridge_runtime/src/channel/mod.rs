//! posbridge_runtime::channel
//!
//! Method-call command channel: resolves method names, decodes arguments and
//! maps coordinator results onto wire replies.

mod method;
pub use method::Method;

mod service;
pub use service::{CommandChannel, MethodCall, Reply};
