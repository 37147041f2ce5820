//! posbridge_host
//!
//! Stdin/stdout host for the positioning bridge, driven by a simulated
//! provider. Useful for exercising the command channel and event stream end
//! to end without a real positioning engine.

pub mod config;
pub mod host;
pub mod sim;
