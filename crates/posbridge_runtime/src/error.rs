use posbridge_core::error::{CoreError, Severity};

pub fn log_core_error(err: &CoreError) {
    match err.severity {
        Severity::Warn => tracing::warn!(code = err.code(), "{err}"),
        Severity::Error | Severity::Fatal => tracing::error!(code = err.code(), "{err}"),
    }
}
