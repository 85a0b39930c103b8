//! Repositories to clone (`repositories.toml`).
use serde::Deserialize;
use std::path::Path;

use super::toml_loader;
use crate::error::ConfigError;

/// A repository clone target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    /// Remote URL.
    pub url: String,
    /// Destination directory, `~` allowed.
    pub path: String,
}

#[derive(Debug, Default, Deserialize)]
struct RepositoriesFile {
    #[serde(default)]
    repositories: Vec<Repository>,
}

/// Load repositories from `repositories.toml`, preserving file order.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<Vec<Repository>, ConfigError> {
    let file: RepositoriesFile = toml_loader::load_config(path)?;
    Ok(file.repositories)
}
