//! Shell profile lines (`profile.toml`).
use serde::Deserialize;
use std::path::Path;

use super::toml_loader;
use crate::error::ConfigError;
use crate::platform::Os;

/// A line (or block) that should appear in a shell profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileLine {
    /// Profile file, `~` allowed.
    pub path: String,
    /// Text to append when absent.
    pub line: String,
    /// Restrict to one platform (`"linux"` or `"windows"`).
    #[serde(default)]
    pub platform: Option<String>,
}

impl ProfileLine {
    /// Whether the line applies on `os`.
    #[must_use]
    pub fn applies_to(&self, os: Os) -> bool {
        self.platform
            .as_deref()
            .is_none_or(|p| p.eq_ignore_ascii_case(&os.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    lines: Vec<ProfileLine>,
}

/// Load profile lines from `profile.toml`, preserving file order.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<Vec<ProfileLine>, ConfigError> {
    let file: ProfileFile = toml_loader::load_config(path)?;
    Ok(file.lines)
}
