//! Shared support for the end-to-end fixture tools.
//!
//! Fixture binaries record observable lifecycle events in marker files so
//! the process-level tests can assert on them after the fixture exited.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Appends one line to the marker file at `path`, creating it on first use.
///
/// # Errors
///
/// Returns the underlying IO error when the file cannot be opened or
/// written.
pub fn append_marker(path: &Path, event: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{event}")
}

/// Counts the lines recorded in the marker file at `path`; a missing file
/// counts as zero events.
#[must_use]
pub fn marker_lines(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|contents| contents.lines().count())
        .unwrap_or(0)
}
