//! Batch fixture: processes one work item and returns promptly.

use std::process::ExitCode;

use clap::Parser;
use toolhost::telemetry::{self, TelemetryOptions};
use toolhost::{Tool, ToolCommand, ToolError, UniversalFlags};

#[derive(Parser, Debug)]
#[command(name = "demo-batch")]
struct BatchCommand {
    /// Work item key.
    #[arg(short = 'k', long = "key")]
    key: i32,
    #[command(flatten)]
    flags: UniversalFlags,
}

impl ToolCommand for BatchCommand {
    fn universal_flags(&self) -> UniversalFlags {
        self.flags
    }
}

struct BatchTool {
    key: i32,
}

impl Tool for BatchTool {
    fn execute(&self) -> Result<(), ToolError> {
        tracing::info!(key = self.key, "processing work item");
        Ok(())
    }
}

fn main() -> ExitCode {
    if telemetry::initialise(&TelemetryOptions::from_env()).is_err() {
        return ExitCode::FAILURE;
    }
    let factory = |command: BatchCommand| -> Result<BatchTool, ToolError> {
        Ok(BatchTool { key: command.key })
    };
    match toolhost::run(factory, std::env::args_os()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
