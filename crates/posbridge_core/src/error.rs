use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Convenient result alias for posbridge_core.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Log/handling importance. Maps onto tracing levels in the runtime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    Warn,
    Error,
    Fatal,
}

/// Where an error came from (helps triage and routing).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Domain {
    Lifecycle,
    Provider,
    Delivery,
    Command,
    Config,
    Other,
}

/// Stable error "kind" for matching/branching.
///
/// Every kind has a wire code (see [`ErrorKind::code`]) that is what the
/// remote caller sees in a structured error reply.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    InitFailed,
    AlreadyInitialized,
    NotInitialized,
    AlreadyStarted,
    NotStarted,
    NotPaused,
    StartFailed,
    PauseFailed,
    ResumeFailed,
    StopFailed,
    ProviderError,
    DeliveryError,
    InvalidArgument,
    NotImplemented,
    Internal,
}

impl ErrorKind {
    /// Stable wire code.
    pub const fn code(self) -> &'static str {
        match self {
            ErrorKind::InitFailed => "INIT_FAILED",
            ErrorKind::AlreadyInitialized => "ALREADY_INITIALIZED",
            ErrorKind::NotInitialized => "NOT_INITIALIZED",
            ErrorKind::AlreadyStarted => "ALREADY_STARTED",
            ErrorKind::NotStarted => "NOT_STARTED",
            ErrorKind::NotPaused => "NOT_PAUSED",
            ErrorKind::StartFailed => "START_FAILED",
            ErrorKind::PauseFailed => "PAUSE_FAILED",
            ErrorKind::ResumeFailed => "RESUME_FAILED",
            ErrorKind::StopFailed => "STOP_FAILED",
            ErrorKind::ProviderError => "PROVIDER_ERROR",
            ErrorKind::DeliveryError => "DELIVERY_ERROR",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NotImplemented => "NOT_IMPLEMENTED",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Optional structured payload for rich context without forcing allocation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Payload {
    None,

    /// Generic key/value context (usually no heap alloc if using &str).
    Context {
        key: &'static str,
        value: Cow<'static, str>,
    },

    /// Lifecycle-specific context.
    LifecycleCommand { from_state: u8, via_command: u8 },

    /// Numeric detail, e.g. a provider error code.
    Code(i32),
}

/// The one error type that crosses module boundaries in posbridge.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("{severity:?}: {message}")]
pub struct CoreError {
    pub domain: Domain,
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: Cow<'static, str>,
    pub payload: Payload,
}

impl CoreError {
    // ---------------- Fluent entry points ----------------

    #[inline]
    pub fn warn() -> ErrB {
        ErrB::new(Severity::Warn)
    }
    #[inline]
    pub fn error() -> ErrB {
        ErrB::new(Severity::Error)
    }
    #[inline]
    pub fn fatal() -> ErrB {
        ErrB::new(Severity::Fatal)
    }

    /// Wire code of this error's kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Command rejected by the lifecycle table, with structured context.
    pub fn rejected_command(kind: ErrorKind, from_state: u8, via_command: u8) -> Self {
        CoreError::warn()
            .domain(Domain::Lifecycle)
            .kind(kind)
            .msg(default_message(kind))
            .payload(Payload::LifecycleCommand {
                from_state,
                via_command,
            })
            .build()
    }

    /// Mutex poisoned somewhere in the runtime.
    pub fn poisoned(what: &'static str) -> Self {
        CoreError::error()
            .domain(Domain::Other)
            .kind(ErrorKind::Internal)
            .msg("bridge mutex poisoned")
            .payload(Payload::Context {
                key: "where",
                value: what.into(),
            })
            .build()
    }
}

/// Caller-facing message for a kind when nothing more specific is known.
pub const fn default_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InitFailed => "error initializing positioning client",
        ErrorKind::AlreadyInitialized => "positioning client is already initialized",
        ErrorKind::NotInitialized => "positioning client is not initialized",
        ErrorKind::AlreadyStarted => "positioning client is already started",
        ErrorKind::NotStarted => "positioning client not started or not initialized",
        ErrorKind::NotPaused => "positioning client not paused yet to resume",
        ErrorKind::StartFailed => "error starting positioning client",
        ErrorKind::PauseFailed => "error pausing positioning client",
        ErrorKind::ResumeFailed => "error resuming positioning client",
        ErrorKind::StopFailed => "error stopping positioning client",
        ErrorKind::ProviderError => "positioning provider reported an error",
        ErrorKind::DeliveryError => "event stream rejected a payload",
        ErrorKind::InvalidArgument => "invalid argument",
        ErrorKind::NotImplemented => "not implemented",
        ErrorKind::Internal => "internal bridge error",
    }
}

/// Fluent builder that behaves like iterator chains (takes self, returns Self).
/// Defaults:
/// - domain = Other
/// - kind = Internal
/// - message = ""
/// - payload = None
#[derive(Debug, Clone)]
pub struct ErrB {
    domain: Domain,
    kind: ErrorKind,
    severity: Severity,
    message: Cow<'static, str>,
    payload: Payload,
}

impl ErrB {
    #[inline]
    fn new(severity: Severity) -> Self {
        Self {
            domain: Domain::Other,
            kind: ErrorKind::Internal,
            severity,
            message: Cow::Borrowed(""),
            payload: Payload::None,
        }
    }

    /// Set/override the domain (defaults to Domain::Other).
    #[inline]
    pub fn domain(mut self, d: Domain) -> Self {
        self.domain = d;
        self
    }

    /// Set/override the kind (defaults to ErrorKind::Internal).
    #[inline]
    pub fn kind(mut self, k: ErrorKind) -> Self {
        self.kind = k;
        self
    }

    /// Set/override the message (defaults to "").
    #[inline]
    pub fn msg(mut self, m: impl Into<Cow<'static, str>>) -> Self {
        self.message = m.into();
        self
    }

    /// Formatting-friendly message setter.
    #[inline]
    pub fn msgf(mut self, args: fmt::Arguments<'_>) -> Self {
        self.message = Cow::Owned(args.to_string());
        self
    }

    /// Only one payload: this replaces any previous payload (default is None).
    #[inline]
    pub fn payload(mut self, p: Payload) -> Self {
        self.payload = p;
        self
    }

    #[inline]
    pub fn build(self) -> CoreError {
        CoreError {
            domain: self.domain,
            kind: self.kind,
            severity: self.severity,
            message: self.message,
            payload: self.payload,
        }
    }
}

impl From<ErrB> for CoreError {
    fn from(b: ErrB) -> Self {
        b.build()
    }
}
