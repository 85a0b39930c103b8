//! User environment variables (`environment.toml`).
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::toml_loader;
use crate::error::ConfigError;

#[derive(Debug, Default, Deserialize)]
struct EnvironmentFile {
    #[serde(default)]
    variables: BTreeMap<String, String>,
}

/// Load `[variables]` as `(name, value)` pairs in name order.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let file: EnvironmentFile = toml_loader::load_config(path)?;
    Ok(file.variables.into_iter().collect())
}
