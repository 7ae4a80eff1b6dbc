//! Lifecycle-coordinated runner for command-line tools and long-running
//! services.
//!
//! A tool implements [`Tool`] and describes its arguments with a
//! [`ToolCommand`] that embeds [`UniversalFlags`]. The executor parses the
//! argument vector, intercepts the universal `-h`/`--help` and
//! `-v`/`--version` flags before any tool-specific logic runs, constructs the
//! tool through a caller-supplied factory, installs a termination handler,
//! and invokes [`Tool::execute`]. Whether the invocation ends in normal
//! completion, an execution failure, or an external termination signal,
//! [`Tool::shutdown`] runs at most once.
//!
//! The executor is designed to be consumed by a thin entry point:
//!
//! ```no_run
//! use std::process::ExitCode;
//!
//! use clap::Parser;
//! use toolhost::{Tool, ToolCommand, ToolError, UniversalFlags};
//!
//! #[derive(Parser, Debug)]
//! struct EchoCommand {
//!     /// Message to repeat.
//!     #[arg(short = 'm', long = "message")]
//!     message: String,
//!     #[command(flatten)]
//!     flags: UniversalFlags,
//! }
//!
//! impl ToolCommand for EchoCommand {
//!     fn universal_flags(&self) -> UniversalFlags {
//!         self.flags
//!     }
//! }
//!
//! struct EchoTool {
//!     message: String,
//! }
//!
//! impl Tool for EchoTool {
//!     fn execute(&self) -> Result<(), ToolError> {
//!         tracing::info!("{}", self.message);
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> ExitCode {
//!     let factory = |command: EchoCommand| -> Result<EchoTool, ToolError> {
//!         Ok(EchoTool {
//!             message: command.message,
//!         })
//!     };
//!     match toolhost::run(factory, std::env::args_os()) {
//!         Ok(_) => ExitCode::SUCCESS,
//!         Err(error) => {
//!             tracing::error!("{error}");
//!             ExitCode::FAILURE
//!         }
//!     }
//! }
//! ```

pub mod command;
mod executor;
pub mod metadata;
pub mod telemetry;
pub mod tool;


pub use command::{ToolCommand, UniversalFlags};
pub use executor::{
    ExecutorError, ProcessExit, RunOutcome, SystemExit, SystemTermination, TerminationHook,
    TerminationListener, run,
};
pub use metadata::ToolMetadata;
pub use tool::{Tool, ToolError};
