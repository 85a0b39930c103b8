//! SSH key and host configuration (`ssh.toml`).
use serde::Deserialize;
use std::path::Path;

use super::toml_loader;
use crate::error::ConfigError;
use crate::resources::ssh_key::KeyAlgorithm;

/// Contents of `ssh.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SshConfig {
    /// Private key path; defaults to `~/.ssh/id_<algorithm>`.
    #[serde(default)]
    pub key: Option<String>,
    /// Key type; asked for when unset and no key exists yet.
    #[serde(default)]
    pub algorithm: Option<KeyAlgorithm>,
    /// Public key comment; defaults to the git email or `user@host`.
    #[serde(default)]
    pub comment: Option<String>,
    /// Hosts that should use the key in `~/.ssh/config`.
    #[serde(default)]
    pub hosts: Vec<String>,
}

impl SshConfig {
    /// Whether the file configured anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Load SSH settings from `ssh.toml`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<SshConfig, ConfigError> {
    toml_loader::load_config(path)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::test_helpers::write_temp_toml;

    #[test]
    fn load_full_config() {
        let (_dir, path) = write_temp_toml(
            r#"key = "~/.ssh/id_work"
algorithm = "ed25519"
comment = "ada@work"
hosts = ["github.com", "gitlab.com"]
"#,
        );
        let config = load(&path).unwrap();
        assert_eq!(config.key.as_deref(), Some("~/.ssh/id_work"));
        assert_eq!(config.algorithm, Some(KeyAlgorithm::Ed25519));
        assert_eq!(config.hosts, vec!["github.com", "gitlab.com"]);
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let (_dir, path) = write_temp_toml("algorithm = \"dsa\"\n");
        assert!(load(&path).is_err());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("ssh.toml")).unwrap().is_empty());
    }
}
