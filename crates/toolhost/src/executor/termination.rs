//! Host termination notification.
//!
//! The executor registers one termination hook per invocation. Its listener
//! blocks on a dedicated thread until the host requests termination, runs
//! the guarded shutdown, and then resumes the default behaviour for the
//! delivered signal so the hook never interferes with process exit. After a
//! normal completion the listener stays armed; being an ordinary thread it
//! cannot keep the process alive, so the registration is moot once the
//! embedding `main` returns.

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use signal_hook::low_level;
use tracing::warn;

use super::EXECUTOR_TARGET;
use super::errors::ExecutorError;

/// Signals treated as termination requests.
const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Registers a termination hook with the host process.
pub trait TerminationHook {
    /// The blocking listener produced by a successful installation.
    type Listener: TerminationListener;

    /// Registers the hook and returns its listener.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::TerminationHandler`] when the host refuses
    /// the registration.
    fn install(self) -> Result<Self::Listener, ExecutorError>;
}

/// Blocking side of a registered termination hook.
///
/// The shutdown run between [`wait`](TerminationListener::wait) and
/// [`resume`](TerminationListener::resume) has no timeout; a hanging
/// `shutdown()` can delay process exit indefinitely.
pub trait TerminationListener: Send + 'static {
    /// Blocks until the host delivers a termination request. Returns `None`
    /// when the source is exhausted without one.
    fn wait(&mut self) -> Option<i32>;

    /// Hands control back to the host's default termination behaviour for
    /// `signal` once the guarded shutdown has run.
    fn resume(self, signal: i32);
}

/// Production hook listening for [`TERMINATION_SIGNALS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTermination;

impl SystemTermination {
    /// Builds the production termination hook.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TerminationHook for SystemTermination {
    type Listener = SystemTerminationListener;

    fn install(self) -> Result<Self::Listener, ExecutorError> {
        let signals = Signals::new(TERMINATION_SIGNALS)
            .map_err(|source| ExecutorError::TerminationHandler { source })?;
        Ok(SystemTerminationListener { signals })
    }
}

/// Listener over the process signal stream.
#[derive(Debug)]
pub struct SystemTerminationListener {
    signals: Signals,
}

impl TerminationListener for SystemTerminationListener {
    fn wait(&mut self) -> Option<i32> {
        self.signals.forever().next()
    }

    fn resume(self, signal: i32) {
        // Re-raise the default disposition so the process still dies from
        // the signal the host sent.
        if let Err(resume_error) = low_level::emulate_default_handler(signal) {
            warn!(
                target: EXECUTOR_TARGET,
                signal,
                error = %resume_error,
                "could not resume default termination behaviour"
            );
        }
    }
}
