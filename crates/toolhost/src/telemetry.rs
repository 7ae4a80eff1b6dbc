//! Structured telemetry initialisation for tool entry points.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the embedding entry point so tests and hosts can substitute
//! their own sinks.

use std::env;
use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Environment variable consulted for the default log filter.
pub const LOG_FILTER_ENV_VAR: &str = "TOOLHOST_LOG";

const DEFAULT_FILTER: &str = "info";

/// Output format for the diagnostic sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-oriented single-line output.
    #[default]
    Compact,
    /// Newline-delimited JSON events.
    Json,
}

/// Options controlling subscriber installation.
#[derive(Debug, Clone)]
pub struct TelemetryOptions {
    /// Filter expression, e.g. `info` or `toolhost=debug`.
    pub filter: String,
    /// Event output format.
    pub format: LogFormat,
}

impl Default for TelemetryOptions {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_owned(),
            format: LogFormat::Compact,
        }
    }
}

impl TelemetryOptions {
    /// Builds options from [`LOG_FILTER_ENV_VAR`], falling back to `info`.
    #[must_use]
    pub fn from_env() -> Self {
        let filter =
            env::var(LOG_FILTER_ENV_VAR).unwrap_or_else(|_| DEFAULT_FILTER.to_owned());
        Self {
            filter,
            format: LogFormat::Compact,
        }
    }
}

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: the first invocation installs the global
/// subscriber and subsequent invocations return a fresh [`TelemetryHandle`]
/// without touching the global state again.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter expression does not parse or
/// another subscriber was installed outside this module.
pub fn initialise(options: &TelemetryOptions) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(options))
        .map(|_| TelemetryHandle)
}

fn install_subscriber(options: &TelemetryOptions) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&options.filter)
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match options.format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}
