//! Process exit collaborator for the executor's failure path.

use std::process;

/// Terminates the hosting process after an execution failure.
///
/// A seam rather than a direct `process::exit` call so the failure path can
/// be exercised in-process by tests.
pub trait ProcessExit {
    /// Requests process termination with `code`. The production
    /// implementation does not return.
    fn exit(&self, code: i32);
}

/// Production exit collaborator backed by [`process::exit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExit;

impl ProcessExit for SystemExit {
    fn exit(&self, code: i32) {
        process::exit(code);
    }
}
