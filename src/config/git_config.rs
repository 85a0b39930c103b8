//! Git configuration loading (`git-config.toml`).
use serde::Deserialize;
use std::path::Path;

use super::toml_loader;
use crate::error::ConfigError;
use crate::resources::git_config::GitScope;

/// A git config key-value pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitSetting {
    /// Config key (e.g. `"core.autocrlf"`).
    pub key: String,
    /// Desired value (e.g. `"false"`).
    pub value: String,
}

/// Author identity; unset fields are taken from git or asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GitIdentity {
    /// `user.name`.
    #[serde(default)]
    pub name: Option<String>,
    /// `user.email`.
    #[serde(default)]
    pub email: Option<String>,
}

/// Contents of `git-config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GitConfig {
    /// Configuration file scope for every key.
    #[serde(default)]
    pub scope: GitScope,
    /// Author identity.
    #[serde(default)]
    pub identity: GitIdentity,
    /// Plain key/value settings, applied in order.
    #[serde(default)]
    pub settings: Vec<GitSetting>,
}

/// Load git settings from `git-config.toml`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<GitConfig, ConfigError> {
    toml_loader::load_config(path)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::test_helpers::write_temp_toml;

    #[test]
    fn load_settings_and_identity() {
        let (_dir, path) = write_temp_toml(
            r#"scope = "global"
settings = [
  { key = "core.autocrlf", value = "false" },
  { key = "init.defaultBranch", value = "main" },
]

[identity]
name = "Ada Lovelace"
"#,
        );
        let config = load(&path).unwrap();
        assert_eq!(config.scope, GitScope::Global);
        assert_eq!(config.settings.len(), 2);
        assert_eq!(config.settings[1].key, "init.defaultBranch");
        assert_eq!(config.identity.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(config.identity.email, None);
    }

    #[test]
    fn scope_defaults_to_global() {
        let (_dir, path) = write_temp_toml("settings = []\n");
        assert_eq!(load(&path).unwrap().scope, GitScope::Global);
    }

    #[test]
    fn load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            load(&dir.path().join("git-config.toml")).unwrap(),
            GitConfig::default()
        );
    }
}
