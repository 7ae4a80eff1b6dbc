//! The capability contract every runnable tool implements.

use std::error::Error;

/// Error type surfaced by tool implementations.
///
/// Tools own their failure modes; the executor only reports them, so a boxed
/// trait object keeps the seam open without prescribing an error stack.
pub type ToolError = Box<dyn Error + Send + Sync>;

/// A runnable command-line tool or long-running service.
///
/// The executor drives each instance through a fixed lifecycle: construction
/// via the caller-supplied factory, at most one call to
/// [`execute`](Tool::execute), and at most one call to
/// [`shutdown`](Tool::shutdown) no matter how many shutdown triggers fire.
///
/// Methods take `&self` because `shutdown` may run on the termination
/// listener thread while `execute` is still blocking the invoking thread;
/// implementations keep mutable state behind interior mutability.
pub trait Tool: Send + Sync {
    /// The tool's main body.
    ///
    /// May return promptly (batch tools) or run indefinitely (services). Any
    /// unrecovered failure propagates to the executor, which reports it,
    /// drives the shutdown protocol, and terminates the process with status
    /// 1.
    fn execute(&self) -> Result<(), ToolError>;

    /// Releases resources held by the tool.
    ///
    /// Must be safe to call even when [`execute`](Tool::execute) never
    /// completed normally. Failures are reported and swallowed by the
    /// executor; they never change an exit status that has already been
    /// determined. No timeout is imposed, so a hanging implementation can
    /// delay process exit indefinitely under external termination.
    fn shutdown(&self) -> Result<(), ToolError> {
        Ok(())
    }
}
