use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use posbridge_core::error::{CoreError, Domain, ErrorKind, Payload, Result};
use posbridge_core::event::BridgeState;
use posbridge_core::lifecycle::{decide, Decision, LifecycleCommand, LifecycleState};
use posbridge_core::provider::{
    Credentials, HostContext, PositioningHandle, PositioningProvider, ProviderError,
};

use super::binding::ListenerBinding;
use super::dtos::{CommandResponse, StateReport};
use crate::error::log_core_error;
use crate::stream::{Dispatch, Dispatcher, EventSink, StreamShared};

/// Construction-time settings for a [`LifecycleCoordinator`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CoordinatorConfig {
    /// Identity of the embedding application, handed to the provider factory.
    pub owner: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            owner: "posbridge".to_string(),
        }
    }
}

/// Everything a command reads and writes, guarded by one lock.
struct Session<H> {
    state: LifecycleState,
    handle: Option<H>,
    binding: Option<ListenerBinding>,
}

impl<H: PositioningHandle> Session<H> {
    fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            handle: None,
            binding: None,
        }
    }

    /// Retire the live binding, then unregister its listener from the handle.
    fn detach(&mut self, shared: &StreamShared) {
        let Some(binding) = self.binding.take() else {
            return;
        };
        shared.retire_binding(binding.id);
        if let Some(handle) = self.handle.as_mut() {
            handle.remove_listener(&binding.listener);
        }
        debug!(binding = binding.id, "listener binding detached");
    }
}

/// Owner of the provider session and the single authority over lifecycle state.
///
/// Responsibilities:
/// - Validate each command against the current state
/// - Drive the provider handle and keep exactly one listener binding on it
/// - Announce completed transitions on the event stream
/// - Release everything on teardown (also run on drop)
///
/// Commands are serialized by the session lock. Provider callbacks never take
/// that lock; they go through the dispatch queue.
pub struct LifecycleCoordinator<P: PositioningProvider> {
    provider: P,
    context: HostContext,
    session: Mutex<Session<P::Handle>>,
    shared: Arc<StreamShared>,
    queue: mpsc::UnboundedSender<Dispatch>,
    next_binding: AtomicU64,
}

/// Public API (command surface).
impl<P: PositioningProvider> LifecycleCoordinator<P> {
    /// Create a coordinator and start its event dispatcher.
    ///
    /// The dispatcher runs on the current tokio runtime when called from one,
    /// otherwise on a dedicated thread.
    pub fn new(provider: P, config: CoordinatorConfig) -> Result<Self> {
        if config.owner.is_empty() {
            return Err(CoreError::error()
                .domain(Domain::Config)
                .kind(ErrorKind::InvalidArgument)
                .msg("coordinator owner must not be empty")
                .build());
        }

        let (queue, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(StreamShared::new());
        Dispatcher::new(rx, Arc::clone(&shared)).spawn()?;

        Ok(Self {
            provider,
            context: HostContext::new(config.owner),
            session: Mutex::new(Session::new()),
            shared,
            queue,
            next_binding: AtomicU64::new(1),
        })
    }

    /// Create the provider handle from `credentials`.
    pub fn initialize(&self, credentials: &Credentials) -> Result<CommandResponse> {
        self.initialize_with(|| Ok(credentials.clone()))
    }

    /// Like [`initialize`](Self::initialize), but `credentials` is only
    /// called once the command is known to proceed. A repeat init is a soft
    /// decline whatever its arguments look like.
    pub fn initialize_with<F>(&self, credentials: F) -> Result<CommandResponse>
    where
        F: FnOnce() -> Result<Credentials>,
    {
        let via = LifecycleCommand::Initialize;
        let mut guard = self.lock_session()?;
        let session = &mut *guard;

        let goal = match decide(session.state, via)? {
            Decision::Proceed(goal) => goal,
            Decision::Decline(kind) => return Ok(decline(session.state, via, kind)),
        };

        let credentials = credentials()?;
        if credentials.app_id.is_empty() || credentials.secret.is_empty() {
            return Err(CoreError::warn()
                .domain(Domain::Command)
                .kind(ErrorKind::InvalidArgument)
                .msg("appId and secret must not be empty")
                .build());
        }

        let handle = self
            .provider
            .create(&self.context, &credentials)
            .map_err(|err| provider_failure(ErrorKind::InitFailed, err))?;
        session.handle = Some(handle);

        self.advance(session, via, goal);
        Ok(CommandResponse::ok(via))
    }

    /// Attach a fresh listener binding and start positioning.
    pub fn start(&self) -> Result<CommandResponse> {
        let via = LifecycleCommand::Start;
        let mut guard = self.lock_session()?;
        let session = &mut *guard;

        let goal = match decide(session.state, via)? {
            Decision::Proceed(goal) => goal,
            Decision::Decline(kind) => return Ok(decline(session.state, via, kind)),
        };

        // Detach before attach: never two listeners on one handle.
        session.detach(&self.shared);

        let Some(handle) = session.handle.as_mut() else {
            return Err(missing_handle(session.state, via));
        };

        let binding = ListenerBinding::new(
            self.next_binding.fetch_add(1, Ordering::Relaxed),
            self.queue.clone(),
        );
        self.shared.set_live_binding(binding.id);
        handle.add_listener(Arc::clone(&binding.listener));
        let started = handle.start();
        session.binding = Some(binding);

        if let Err(err) = started {
            session.detach(&self.shared);
            return Err(provider_failure(ErrorKind::StartFailed, err));
        }

        self.advance(session, via, goal);
        Ok(CommandResponse::ok(via))
    }

    /// Suspend updates. Handle and binding stay in place.
    pub fn pause(&self) -> Result<CommandResponse> {
        self.drive_handle(LifecycleCommand::Pause, ErrorKind::PauseFailed, |handle| {
            handle.pause()
        })
    }

    pub fn resume(&self) -> Result<CommandResponse> {
        self.drive_handle(LifecycleCommand::Resume, ErrorKind::ResumeFailed, |handle| {
            handle.resume()
        })
    }

    /// Stop the provider, detach the binding and release the handle.
    ///
    /// The release happens even when the provider's stop fails; the failure is
    /// still reported as `STOP_FAILED`.
    pub fn stop(&self) -> Result<CommandResponse> {
        let via = LifecycleCommand::Stop;
        let mut guard = self.lock_session()?;
        let session = &mut *guard;

        let goal = match decide(session.state, via)? {
            Decision::Proceed(goal) => goal,
            Decision::Decline(kind) => return Ok(decline(session.state, via, kind)),
        };

        let stopped = match session.handle.as_mut() {
            Some(handle) => handle.stop(),
            None => Ok(()),
        };
        session.detach(&self.shared);
        session.handle = None;

        self.advance(session, via, goal);
        stopped.map_err(|err| provider_failure(ErrorKind::StopFailed, err))?;
        Ok(CommandResponse::ok(via))
    }

    /// True iff a provider handle exists.
    pub fn is_initialized(&self) -> Result<bool> {
        Ok(self.lock_session()?.handle.is_some())
    }

    pub fn state(&self) -> Result<LifecycleState> {
        Ok(self.lock_session()?.state)
    }

    pub fn state_report(&self) -> Result<StateReport> {
        Ok(StateReport::for_state(self.state()?))
    }

    /// Install the event sink, replacing any previous one.
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) -> Result<()> {
        let replaced = self.shared.subscriber().set(sink)?;
        info!(replaced, "event stream subscriber attached");
        Ok(())
    }

    /// Clear the event sink. Never touches the provider.
    pub fn unsubscribe(&self) -> Result<()> {
        if self.shared.subscriber().clear()? {
            info!("event stream subscriber detached");
        }
        Ok(())
    }

    pub fn is_subscribed(&self) -> bool {
        self.shared.subscriber().is_set()
    }

    /// Release everything: binding, handle and subscriber. State goes back to
    /// `Uninitialized`.
    ///
    /// Idempotent. Works through a poisoned session lock.
    pub fn teardown(&self) {
        let mut guard = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let session = &mut *guard;

        if session.state.has_binding() {
            if let Some(handle) = session.handle.as_mut() {
                if let Err(err) = handle.stop() {
                    warn!(
                        code = err.code,
                        "provider stop failed during teardown: {}", err.message
                    );
                }
            }
        }
        session.detach(&self.shared);
        let released = session.handle.take().is_some();
        session.state = LifecycleState::Uninitialized;
        drop(guard);

        if let Err(err) = self.shared.subscriber().clear() {
            log_core_error(&err);
        }
        if released {
            info!("positioning session torn down");
        }
    }

    /// Wait until everything queued so far has been delivered or dropped.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.queue.send(Dispatch::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

/// Internal plumbing.
impl<P: PositioningProvider> LifecycleCoordinator<P> {
    fn lock_session(&self) -> Result<MutexGuard<'_, Session<P::Handle>>> {
        self.session
            .lock()
            .map_err(|_| CoreError::poisoned("session"))
    }

    /// Pause and resume share one shape: check, call the handle, advance.
    fn drive_handle<F>(
        &self,
        via: LifecycleCommand,
        failure: ErrorKind,
        call: F,
    ) -> Result<CommandResponse>
    where
        F: FnOnce(&mut P::Handle) -> std::result::Result<(), ProviderError>,
    {
        let mut guard = self.lock_session()?;
        let session = &mut *guard;

        let goal = match decide(session.state, via)? {
            Decision::Proceed(goal) => goal,
            Decision::Decline(kind) => return Ok(decline(session.state, via, kind)),
        };

        let Some(handle) = session.handle.as_mut() else {
            return Err(missing_handle(session.state, via));
        };
        call(handle).map_err(|err| provider_failure(failure, err))?;

        self.advance(session, via, goal);
        Ok(CommandResponse::ok(via))
    }

    fn advance(
        &self,
        session: &mut Session<P::Handle>,
        via: LifecycleCommand,
        goal: LifecycleState,
    ) {
        let from = session.state;
        session.state = goal;
        info!(
            command = via.method(),
            from = from.label(),
            to = goal.label(),
            "lifecycle transition"
        );
        self.enqueue(Dispatch::Lifecycle(announced_state(via)));
    }

    fn enqueue(&self, item: Dispatch) {
        if self.queue.send(item).is_err() {
            debug!("event dispatcher gone; dropping lifecycle event");
        }
    }
}

impl<P: PositioningProvider> Drop for LifecycleCoordinator<P> {
    fn drop(&mut self) {
        self.teardown();
        let _ = self.queue.send(Dispatch::Shutdown);
    }
}

/// Canonical state announced after a successful command.
const fn announced_state(via: LifecycleCommand) -> BridgeState {
    match via {
        LifecycleCommand::Initialize => BridgeState::Initialized,
        LifecycleCommand::Start | LifecycleCommand::Resume => BridgeState::Running,
        LifecycleCommand::Pause => BridgeState::Paused,
        LifecycleCommand::Stop => BridgeState::Stopped,
    }
}

fn decline(state: LifecycleState, via: LifecycleCommand, kind: ErrorKind) -> CommandResponse {
    debug!(
        command = via.method(),
        state = state.label(),
        code = kind.code(),
        "command declined"
    );
    CommandResponse::declined(via, kind)
}

fn provider_failure(kind: ErrorKind, err: ProviderError) -> CoreError {
    warn!(code = kind.code(), provider_code = err.code, "{}", err.message);
    CoreError::error()
        .domain(Domain::Provider)
        .kind(kind)
        .msg(err.message)
        .payload(Payload::Code(err.code))
        .build()
}

// Unreachable while the state invariants hold.
fn missing_handle(state: LifecycleState, via: LifecycleCommand) -> CoreError {
    CoreError::error()
        .domain(Domain::Lifecycle)
        .kind(ErrorKind::Internal)
        .msg("no provider handle in a state that requires one")
        .payload(Payload::LifecycleCommand {
            from_state: state.id(),
            via_command: via.id(),
        })
        .build()
}
