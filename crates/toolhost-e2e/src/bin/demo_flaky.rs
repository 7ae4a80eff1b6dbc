//! Failing fixture: `execute` always fails, and `shutdown` can be made to
//! fail as well. Every shutdown invocation is recorded in a marker file so
//! tests can assert the exactly-once protocol from outside the process.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use toolhost::telemetry::{self, TelemetryOptions};
use toolhost::{Tool, ToolCommand, ToolError, UniversalFlags};
use toolhost_e2e::append_marker;

#[derive(Parser, Debug)]
#[command(name = "demo-flaky")]
struct FlakyCommand {
    /// File recording each shutdown invocation.
    #[arg(long = "shutdown-marker")]
    shutdown_marker: PathBuf,
    /// Fail the shutdown hook as well.
    #[arg(long = "fail-shutdown")]
    fail_shutdown: bool,
    #[command(flatten)]
    flags: UniversalFlags,
}

impl ToolCommand for FlakyCommand {
    fn universal_flags(&self) -> UniversalFlags {
        self.flags
    }
}

struct FlakyTool {
    shutdown_marker: PathBuf,
    fail_shutdown: bool,
}

impl Tool for FlakyTool {
    fn execute(&self) -> Result<(), ToolError> {
        Err("deliberate execution failure".into())
    }

    fn shutdown(&self) -> Result<(), ToolError> {
        append_marker(&self.shutdown_marker, "shutdown")?;
        if self.fail_shutdown {
            Err("deliberate shutdown failure".into())
        } else {
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    if telemetry::initialise(&TelemetryOptions::from_env()).is_err() {
        return ExitCode::FAILURE;
    }
    let factory = |command: FlakyCommand| -> Result<FlakyTool, ToolError> {
        Ok(FlakyTool {
            shutdown_marker: command.shutdown_marker,
            fail_shutdown: command.fail_shutdown,
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
