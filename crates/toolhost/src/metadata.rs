//! Tool metadata resolution for the `--version` banner.
//!
//! Metadata lives in a small key/value descriptor next to the tool. The
//! resolver never fails: a missing or unreadable descriptor, a malformed
//! document, or an absent key each produce a warning and fall back to the
//! documented default for the affected fields.

use std::fs;
use std::io;
use std::path::Path;

use toml::Table;
use tracing::warn;

pub(crate) const METADATA_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::metadata");

/// Well-known descriptor file read from the working directory.
pub const DESCRIPTOR_PATH: &str = "tool.toml";
/// Default tool name when `tool.name` is absent.
pub const DEFAULT_NAME: &str = "QBiC toolset";
/// Default version when `tool.version` is absent.
pub const DEFAULT_VERSION: &str = "1.0.0-SNAPSHOT";
/// Default repository URL when `tool.repo.url` is absent.
pub const DEFAULT_REPOSITORY_URL: &str = "http://github.com/qbicsoftware";

const NAME_KEY: &str = "tool.name";
const VERSION_KEY: &str = "tool.version";
const REPOSITORY_KEY: &str = "tool.repo.url";

/// Name, version and repository URL describing the running tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolMetadata {
    /// Human-readable tool name.
    pub name: String,
    /// Version string rendered in the banner.
    pub version: String,
    /// URL of the tool's source repository.
    pub repository_url: String,
}

impl ToolMetadata {
    /// Renders the informational banner emitted for `--version`.
    #[must_use]
    pub fn banner(&self) -> String {
        format!(
            "{}, version {} ({})",
            self.name, self.version, self.repository_url
        )
    }
}

/// Resolves metadata from [`DESCRIPTOR_PATH`] in the working directory.
#[must_use]
pub fn resolve() -> ToolMetadata {
    resolve_from(Path::new(DESCRIPTOR_PATH))
}

/// Resolves metadata from the descriptor at `path`.
///
/// Each absent or blank key independently falls back to its default with one
/// warning naming the key and the default used; the resolved metadata is
/// always fully populated.
#[must_use]
pub fn resolve_from(path: &Path) -> ToolMetadata {
    let table = load_descriptor(path);
    ToolMetadata {
        name: extract_or_default(&table, NAME_KEY, DEFAULT_NAME),
        version: extract_or_default(&table, VERSION_KEY, DEFAULT_VERSION),
        repository_url: extract_or_default(&table, REPOSITORY_KEY, DEFAULT_REPOSITORY_URL),
    }
}

fn load_descriptor(path: &Path) -> Table {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            warn!(
                target: METADATA_TARGET,
                file = %path.display(),
                "missing tool descriptor file, using defaults for all fields"
            );
            return Table::new();
        }
        Err(error) => {
            warn!(
                target: METADATA_TARGET,
                file = %path.display(),
                error = %error,
                "could not read tool descriptor file, using defaults for all fields"
            );
            return Table::new();
        }
    };
    match text.parse::<Table>() {
        Ok(table) => table,
        Err(error) => {
            warn!(
                target: METADATA_TARGET,
                file = %path.display(),
                error = %error,
                "tool descriptor file is malformed, using defaults for all fields"
            );
            Table::new()
        }
    }
}

fn extract_or_default(table: &Table, key: &str, default: &str) -> String {
    if let Some(value) = lookup(table, key) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return trimmed.to_owned();
        }
    }
    warn!(
        target: METADATA_TARGET,
        key,
        default,
        "missing value in tool descriptor, using default"
    );
    default.to_owned()
}

fn lookup<'a>(table: &'a Table, key: &str) -> Option<&'a str> {
    let mut segments = key.split('.');
    let mut current = table.get(segments.next()?)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    current.as_str()
}
