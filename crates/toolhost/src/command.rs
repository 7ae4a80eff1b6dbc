//! Command descriptor support shared by every tool.
//!
//! Commands are plain `clap` parsers; each embeds [`UniversalFlags`] through
//! `#[command(flatten)]`, so the universal flags travel by composition
//! rather than through an inheritance hierarchy. The executor only ever
//! reads the two universal flags; everything else on a command belongs to
//! the tool that declared it.

use clap::{Args, Parser};

/// Universal flags understood by every tool.
///
/// clap's built-in help and version handling is disabled so the executor can
/// intercept both flags itself before any tool-specific logic runs.
#[derive(Args, Debug, Clone, Copy, Default)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct UniversalFlags {
    /// Prints usage and exits.
    #[arg(short = 'h', long = "help")]
    pub help: bool,
    /// Prints version and exits.
    #[arg(short = 'v', long = "version")]
    pub version: bool,
}

impl UniversalFlags {
    /// True when either universal flag was supplied.
    #[must_use]
    pub const fn any(self) -> bool {
        self.help || self.version
    }
}

/// Parsed command-line arguments for a tool.
///
/// Implementations derive [`clap::Parser`] and flatten [`UniversalFlags`]:
///
/// ```
/// use clap::Parser;
/// use toolhost::{ToolCommand, UniversalFlags};
///
/// #[derive(Parser, Debug)]
/// struct GreetCommand {
///     /// Name to greet.
///     #[arg(short = 'n', long = "name")]
///     name: String,
///     #[command(flatten)]
///     flags: UniversalFlags,
/// }
///
/// impl ToolCommand for GreetCommand {
///     fn universal_flags(&self) -> UniversalFlags {
///         self.flags
///     }
/// }
/// ```
pub trait ToolCommand: Parser {
    /// The universal flags parsed from the argument vector.
    fn universal_flags(&self) -> UniversalFlags;
}
