//! SSH key pair generation via `ssh-keygen`.
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::Deserialize;

use super::Setting;
use super::file_line::PRESENT;
use crate::error::ReconcileError;
use crate::exec::Executor;

/// Key types offered when generating a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    /// Ed25519 (preferred).
    #[default]
    Ed25519,
    /// ECDSA P-256.
    Ecdsa,
    /// RSA 4096.
    Rsa,
}

impl KeyAlgorithm {
    /// Every supported algorithm, in preference order.
    pub const ALL: [Self; 3] = [Self::Ed25519, Self::Ecdsa, Self::Rsa];

    /// The `ssh-keygen -t` argument.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
            Self::Ecdsa => "ecdsa",
            Self::Rsa => "rsa",
        }
    }

    /// Conventional private key file name (`id_<type>`).
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Ed25519 => "id_ed25519",
            Self::Ecdsa => "id_ecdsa",
            Self::Rsa => "id_rsa",
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A private key file that should exist.
#[derive(Debug)]
pub struct SshKeySetting<'a> {
    /// Private key path; the public key is written next to it.
    pub path: PathBuf,
    /// Key type to generate.
    pub algorithm: KeyAlgorithm,
    /// Comment embedded in the public key.
    pub comment: String,
    executor: &'a dyn Executor,
}

impl<'a> SshKeySetting<'a> {
    /// Create a new SSH key setting.
    #[must_use]
    pub const fn new(
        path: PathBuf,
        algorithm: KeyAlgorithm,
        comment: String,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            path,
            algorithm,
            comment,
            executor,
        }
    }
}

impl Setting for SshKeySetting<'_> {
    fn description(&self) -> String {
        format!("{} key {}", self.algorithm, self.path.display())
    }

    fn read(&self) -> Result<String, ReconcileError> {
        match self.path.try_exists() {
            Ok(true) => Ok(PRESENT.to_string()),
            Ok(false) => Err(self.not_found()),
            Err(e) => Err(ReconcileError::read_failed(self.description(), e)),
        }
    }

    fn write(&self, _value: &str) -> Result<()> {
        super::ensure_parent_dir(&self.path)?;
        let path = self.path.to_string_lossy();
        let bits: &[&str] = match self.algorithm {
            KeyAlgorithm::Rsa => &["-b", "4096"],
            KeyAlgorithm::Ecdsa => &["-b", "256"],
            KeyAlgorithm::Ed25519 => &[],
        };
        let mut args = vec!["-t", self.algorithm.as_str()];
        args.extend_from_slice(bits);
        args.extend_from_slice(&["-C", self.comment.as_str(), "-f", &*path, "-N", "", "-q"]);
        self.executor
            .run("ssh-keygen", &args)
            .with_context(|| format!("generate {}", self.description()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn existing_key_is_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id_ed25519");
        std::fs::write(&path, "PRIVATE").unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let setting =
            SshKeySetting::new(path, KeyAlgorithm::Ed25519, "ada@host".into(), &executor);
        assert_eq!(setting.read().unwrap(), PRESENT);
    }

    #[test]
    fn missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let setting = SshKeySetting::new(
            dir.path().join("id_ed25519"),
            KeyAlgorithm::Ed25519,
            "ada@host".into(),
            &executor,
        );
        assert!(setting.read().unwrap_err().is_not_found());
    }

    #[test]
    fn write_runs_ssh_keygen_and_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".ssh").join("id_rsa");
        let executor = MockExecutor::ok("");
        let setting =
            SshKeySetting::new(path.clone(), KeyAlgorithm::Rsa, "ada@host".into(), &executor);

        setting.write(PRESENT).unwrap();

        assert!(dir.path().join(".ssh").is_dir());
        assert_eq!(
            executor.calls(),
            vec![format!(
                "ssh-keygen -t rsa -b 4096 -C ada@host -f {} -N  -q",
                path.display()
            )]
        );
    }

    #[test]
    fn write_failure_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let executor = MockExecutor::fail();
        let setting = SshKeySetting::new(
            dir.path().join("id_ed25519"),
            KeyAlgorithm::Ed25519,
            String::new(),
            &executor,
        );
        assert!(setting.write(PRESENT).is_err());
    }

    #[test]
    fn file_names_follow_convention() {
        let names: Vec<&str> = KeyAlgorithm::ALL.iter().map(|a| a.file_name()).collect();
        assert_eq!(names, vec!["id_ed25519", "id_ecdsa", "id_rsa"]);
    }
}
