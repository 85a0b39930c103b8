//! Tool list loading (`tools.toml`).
use serde::Deserialize;
use std::path::Path;

use super::toml_loader;
use crate::error::ConfigError;
use crate::resources::tool::PackageManager;

/// A tool to install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Tool {
    /// Display name (e.g., `"git"`).
    pub name: String,
    /// Executable whose presence on `PATH` means the tool is installed.
    #[serde(default)]
    pub command: Option<String>,
    /// Package id used by every package manager unless overridden.
    #[serde(default)]
    pub id: Option<String>,
    /// winget id override.
    #[serde(default)]
    pub winget: Option<String>,
    /// pacman package override.
    #[serde(default)]
    pub pacman: Option<String>,
    /// Halt the run if installing this tool fails.
    #[serde(default)]
    pub critical: bool,
}

impl Tool {
    /// Package id for `manager`, if the tool is available through it.
    #[must_use]
    pub fn id_for(&self, manager: PackageManager) -> Option<&str> {
        let specific = match manager {
            PackageManager::Winget => self.winget.as_deref(),
            PackageManager::Pacman => self.pacman.as_deref(),
        };
        specific.or(self.id.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ToolsFile {
    #[serde(default)]
    tools: Vec<Tool>,
}

/// Load tools from `tools.toml`, preserving file order.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<Vec<Tool>, ConfigError> {
    let file: ToolsFile = toml_loader::load_config(path)?;
    Ok(file.tools)
}
