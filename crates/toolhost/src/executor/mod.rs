//! The tool lifecycle coordinator.
//!
//! This module is split into focused submodules so each concern remains
//! small and testable:
//! - [`errors`] captures the error surface exposed to embedding entry points.
//! - [`exit`] abstracts process termination on the failure path.
//! - [`report`] formats and emits failure diagnostics.
//! - [`shutdown`] enforces the exactly-once shutdown protocol.
//! - [`termination`] registers the host termination hook.

mod errors;
mod exit;
mod report;
mod shutdown;
#[cfg(test)]
mod shutdown_tests;
mod termination;
#[cfg(test)]
mod tests;

use std::any;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use clap::error::ErrorKind;
use tracing::{debug, error, info};

use crate::command::{ToolCommand, UniversalFlags};
use crate::metadata;
use crate::tool::{Tool, ToolError};

pub use errors::ExecutorError;
pub use exit::{ProcessExit, SystemExit};
pub use termination::{SystemTermination, TerminationHook, TerminationListener};

use shutdown::ShutdownGuard;

pub(crate) const EXECUTOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::executor");

/// How a coordinated invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// `execute()` ran to normal completion; the process keeps running (the
    /// tool may be a long-lived service awaiting external termination).
    Completed,
    /// `-h`/`-v` were handled; the tool never ran.
    FlagsHandled,
    /// A required argument was missing; usage was shown and the tool never
    /// ran.
    UsageShown,
    /// `execute()` failed; the failure was reported, the shutdown protocol
    /// ran, and a non-zero process exit was requested. Observable only with
    /// a process collaborator that does not actually terminate (tests).
    Failed,
}

/// Collaborators injected into [`run_with`].
pub(crate) struct ExecutorPlan<H, P> {
    pub(crate) hook: H,
    pub(crate) process: P,
    pub(crate) descriptor_path: PathBuf,
}

/// Runs the tool produced by `factory` against `args` using the production
/// collaborators.
///
/// The factory maps exactly one command type to one tool type; it is invoked
/// only when the universal flags were not set and the arguments parsed
/// cleanly. On normal completion control returns to the caller without
/// forcing process exit. An execution failure is reported, drives the
/// shutdown protocol, and terminates the process with status 1.
///
/// # Errors
///
/// Returns [`ExecutorError`] for argument vectors that fail to parse for a
/// reason other than a missing required argument, for factory failures, and
/// for termination-handler installation failures. Execution and shutdown
/// failures never surface here; they are reported and converted into the
/// process exit status instead.
pub fn run<C, T, F, A, S>(factory: F, args: A) -> Result<RunOutcome, ExecutorError>
where
    C: ToolCommand,
    T: Tool + 'static,
    F: FnOnce(C) -> Result<T, ToolError>,
    A: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let plan = ExecutorPlan {
        hook: SystemTermination::new(),
        process: SystemExit,
        descriptor_path: PathBuf::from(metadata::DESCRIPTOR_PATH),
    };
    run_with(factory, args, plan)
}

/// Runs the tool with injected collaborators.
pub(crate) fn run_with<C, T, F, A, S, H, P>(
    factory: F,
    args: A,
    plan: ExecutorPlan<H, P>,
) -> Result<RunOutcome, ExecutorError>
where
    C: ToolCommand,
    T: Tool + 'static,
    F: FnOnce(C) -> Result<T, ToolError>,
    A: IntoIterator<Item = S>,
    S: Into<OsString>,
    H: TerminationHook,
    P: ProcessExit,
{
    let ExecutorPlan {
        hook,
        process,
        descriptor_path,
    } = plan;
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    // A lenient pre-scan so `-h`/`-v` short-circuit even when the command
    // declares required arguments the vector does not satisfy.
    if handle_universal_flags::<C>(scan_universal_flags::<C>(&args), &descriptor_path) {
        return Ok(RunOutcome::FlagsHandled);
    }

    let command = match parse_arguments::<C>(&args)? {
        ParseOutcome::UsageShown => return Ok(RunOutcome::UsageShown),
        ParseOutcome::Parsed(command) => command,
    };

    if handle_universal_flags::<C>(command.universal_flags(), &descriptor_path) {
        return Ok(RunOutcome::FlagsHandled);
    }

    let tool = factory(command).map_err(|source| ExecutorError::Construction {
        tool: any::type_name::<T>(),
        source,
    })?;
    let guard = Arc::new(ShutdownGuard::new(tool));

    let listener = hook.install()?;
    spawn_termination_listener(listener, Arc::clone(&guard))?;

    debug!(target: EXECUTOR_TARGET, "starting execution");
    match guard.tool().execute() {
        Ok(()) => Ok(RunOutcome::Completed),
        Err(failure) => {
            report::failure(failure.as_ref());
            guard.run_shutdown();
            process.exit(1);
            Ok(RunOutcome::Failed)
        }
    }
}

enum ParseOutcome<C> {
    Parsed(C),
    UsageShown,
}

fn parse_arguments<C: ToolCommand>(args: &[OsString]) -> Result<ParseOutcome<C>, ExecutorError> {
    match C::try_parse_from(args.iter().cloned()) {
        Ok(command) => Ok(ParseOutcome::Parsed(command)),
        Err(parse_error) if parse_error.kind() == ErrorKind::MissingRequiredArgument => {
            error!(target: EXECUTOR_TARGET, "{parse_error}");
            write_usage::<C>(&mut io::stderr().lock());
            Ok(ParseOutcome::UsageShown)
        }
        Err(parse_error) => Err(ExecutorError::ParseArguments {
            source: Box::new(parse_error),
        }),
    }
}

/// Reads the universal flags out of `args` without enforcing the command's
/// other constraints. A vector even the lenient parser cannot digest is left
/// to the strict parser for a proper diagnostic.
fn scan_universal_flags<C: ToolCommand>(args: &[OsString]) -> UniversalFlags {
    let lenient = C::command().ignore_errors(true);
    match lenient.try_get_matches_from(args.iter().cloned()) {
        Ok(matches) => UniversalFlags {
            help: matches.get_flag("help"),
            version: matches.get_flag("version"),
        },
        Err(_) => UniversalFlags::default(),
    }
}

/// Handles `-h`/`-v`. Returns `true` when either flag was set, in which case
/// the tool must not run. When both are set, both outputs are produced.
fn handle_universal_flags<C: ToolCommand>(flags: UniversalFlags, descriptor_path: &Path) -> bool {
    if !flags.any() {
        return false;
    }
    if flags.version {
        debug!(target: EXECUTOR_TARGET, "Version requested");
        let resolved = metadata::resolve_from(descriptor_path);
        info!(target: EXECUTOR_TARGET, "{}", resolved.banner());
    }
    if flags.help {
        debug!(target: EXECUTOR_TARGET, "Help requested");
        write_usage::<C>(&mut io::stdout().lock());
    }
    true
}

fn write_usage<C: ToolCommand>(sink: &mut dyn Write) {
    let usage = C::command().render_help();
    if let Err(write_error) = writeln!(sink, "{usage}") {
        error!(
            target: EXECUTOR_TARGET,
            error = %write_error,
            "could not write usage text"
        );
    }
}

fn spawn_termination_listener<L, T>(
    mut listener: L,
    guard: Arc<ShutdownGuard<T>>,
) -> Result<(), ExecutorError>
where
    L: TerminationListener,
    T: Tool + 'static,
{
    thread::Builder::new()
        .name("termination-listener".to_owned())
        .spawn(move || {
            if let Some(signal) = listener.wait() {
                debug!(
                    target: EXECUTOR_TARGET,
                    signal,
                    "termination signal received"
                );
                guard.run_shutdown();
                listener.resume(signal);
            }
        })
        .map(|_handle| ())
        .map_err(|source| ExecutorError::ListenerThread { source })
}
