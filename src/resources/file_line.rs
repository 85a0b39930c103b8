//! Append-if-absent text blocks in shell profiles and config files.
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::Setting;
use crate::error::ReconcileError;

/// Value reported when the block is in the file; the append target.
pub const PRESENT: &str = "present";
/// Value reported when the file exists but lacks the block.
pub const ABSENT: &str = "absent";

/// A line (or multi-line block) that must appear in a file.
///
/// A missing file is reported as not found; writing creates it along with
/// any missing parent directories.
#[derive(Debug, Clone)]
pub struct FileLineSetting {
    /// File that should contain the text.
    pub path: PathBuf,
    /// Text to look for and append.
    pub text: String,
}

impl FileLineSetting {
    /// Create a new file line setting.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    fn contained_in(&self, content: &str) -> bool {
        let needle = self.text.trim_end_matches('\n');
        if needle.contains('\n') {
            normalize(content).contains(&normalize(needle))
        } else {
            content.lines().any(|line| line.trim_end() == needle.trim_end())
        }
    }
}

fn normalize(s: &str) -> String {
    s.replace("\r\n", "\n")
}

impl Setting for FileLineSetting {
    fn description(&self) -> String {
        let first = self.text.lines().next().unwrap_or_default();
        format!("{}: {first}", self.path.display())
    }

    fn read(&self) -> Result<String, ReconcileError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if self.contained_in(&content) => Ok(PRESENT.to_string()),
            Ok(_) => Ok(ABSENT.to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(self.not_found()),
            Err(e) => Err(ReconcileError::read_failed(self.description(), e)),
        }
    }

    fn write(&self, _value: &str) -> Result<()> {
        super::ensure_parent_dir(&self.path)?;
        let mut content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };
        if !content.is_empty() && !content.ends_with('\n') {
            content.push('\n');
        }
        content.push_str(self.text.trim_end_matches('\n'));
        content.push('\n');
        std::fs::write(&self.path, content)
            .with_context(|| format!("write {}", self.path.display()))
    }
}
