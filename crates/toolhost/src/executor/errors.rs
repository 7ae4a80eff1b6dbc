//! Error surface of the lifecycle coordinator.

use std::io;

use thiserror::Error;

use crate::tool::ToolError;

/// Errors surfaced to the embedding entry point by the executor.
///
/// Execution and shutdown failures never appear here: they are fully
/// contained inside the executor, reported through the diagnostic sink, and
/// converted into process exit status.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Command-line arguments failed to parse for a reason other than a
    /// missing required argument.
    #[error("failed to parse command-line arguments: {source}")]
    ParseArguments {
        /// Underlying parser error.
        #[source]
        source: Box<clap::Error>,
    },
    /// The factory failed to construct the tool for the parsed command.
    #[error("could not create a new instance of tool '{tool}': {source}")]
    Construction {
        /// Type name of the tool that could not be constructed.
        tool: &'static str,
        /// Failure reported by the factory.
        #[source]
        source: ToolError,
    },
    /// Registering the termination handler with the host failed.
    #[error("failed to install termination handler: {source}")]
    TerminationHandler {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Spawning the termination listener thread failed.
    #[error("failed to start termination listener thread: {source}")]
    ListenerThread {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}
