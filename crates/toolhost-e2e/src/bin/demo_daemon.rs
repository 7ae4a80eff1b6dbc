//! Service fixture: `execute` blocks until `shutdown` releases it, the way
//! a long-running daemon awaits external termination. The ready marker
//! signals that execution started; the shutdown marker records each
//! shutdown invocation.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Condvar, Mutex};

use clap::Parser;
use toolhost::telemetry::{self, TelemetryOptions};
use toolhost::{Tool, ToolCommand, ToolError, UniversalFlags};
use toolhost_e2e::append_marker;

#[derive(Parser, Debug)]
#[command(name = "demo-daemon")]
struct DaemonCommand {
    /// File created once the service is running.
    #[arg(long = "ready-marker")]
    ready_marker: PathBuf,
    /// File recording each shutdown invocation.
    #[arg(long = "shutdown-marker")]
    shutdown_marker: PathBuf,
    #[command(flatten)]
    flags: UniversalFlags,
}

impl ToolCommand for DaemonCommand {
    fn universal_flags(&self) -> UniversalFlags {
        self.flags
    }
}

struct DaemonTool {
    ready_marker: PathBuf,
    shutdown_marker: PathBuf,
    gate: (Mutex<bool>, Condvar),
}

impl Tool for DaemonTool {
    fn execute(&self) -> Result<(), ToolError> {
        append_marker(&self.ready_marker, "ready")?;
        tracing::info!("service started, awaiting termination");
        let (released, condvar) = &self.gate;
        let mut released = released
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        while !*released {
            released = condvar
                .wait(released)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
        Ok(())
    }

    fn shutdown(&self) -> Result<(), ToolError> {
        append_marker(&self.shutdown_marker, "shutdown")?;
        let (released, condvar) = &self.gate;
        *released
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = true;
        condvar.notify_all();
        Ok(())
    }
}

fn main() -> ExitCode {
    if telemetry::initialise(&TelemetryOptions::from_env()).is_err() {
        return ExitCode::FAILURE;
    }
    let factory = |command: DaemonCommand| -> Result<DaemonTool, ToolError> {
        Ok(DaemonTool {
            ready_marker: command.ready_marker,
            shutdown_marker: command.shutdown_marker,
            gate: (Mutex::new(false), Condvar::new()),
        })
    };
    match toolhost::run(factory, std::env::args_os()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
