//! Exactly-once shutdown protocol.

use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::EXECUTOR_TARGET;
use super::report;
use crate::tool::Tool;

/// Wraps a tool instance together with its shutdown-completion flag.
///
/// Both shutdown triggers, the in-line failure path after `execute()` and
/// the termination listener, funnel through
/// [`run_shutdown`](ShutdownGuard::run_shutdown). The mutex makes the
/// check-and-set atomic, so whichever trigger wins the race performs the
/// shutdown and the other observes the flag and no-ops. No guarantee is made
/// about which trigger wins.
#[derive(Debug)]
pub(crate) struct ShutdownGuard<T> {
    tool: T,
    completed: Mutex<bool>,
}

impl<T: Tool> ShutdownGuard<T> {
    pub(crate) const fn new(tool: T) -> Self {
        Self {
            tool,
            completed: Mutex::new(false),
        }
    }

    pub(crate) const fn tool(&self) -> &T {
        &self.tool
    }

    /// Runs the tool's shutdown at most once across all triggers.
    ///
    /// A failure raised by `shutdown()` is reported and swallowed, and the
    /// flag is set whether or not the call succeeded, so a concurrent or
    /// subsequent trigger never re-invokes it.
    pub(crate) fn run_shutdown(&self) {
        let mut completed = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
        if *completed {
            debug!(
                target: EXECUTOR_TARGET,
                "tool has already been shut down, ignoring request"
            );
            return;
        }
        debug!(target: EXECUTOR_TARGET, "shutting down");
        if let Err(failure) = self.tool.shutdown() {
            report::failure(failure.as_ref());
        }
        *completed = true;
    }

    #[cfg(test)]
    pub(crate) fn completed(&self) -> bool {
        *self.completed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
