//! Failure reporting shared by the execute and shutdown paths.

use std::error::Error;

use tracing::{debug, error};

use super::EXECUTOR_TARGET;

/// Emits the human-readable summary of a failure raised by a tool, with the
/// full detail and cause chain routed to the debug sink.
pub(crate) fn failure(raised: &(dyn Error + Send + Sync)) {
    error!(target: EXECUTOR_TARGET, "{raised}");
    error!(
        target: EXECUTOR_TARGET,
        "Check the application log for more details."
    );
    debug!(target: EXECUTOR_TARGET, detail = ?raised, "full failure detail");
    let mut next = raised.source();
    while let Some(cause) = next {
        debug!(target: EXECUTOR_TARGET, cause = %cause, "caused by");
        next = cause.source();
    }
}
