//! Git configuration entries read and written through the `git` CLI.
use std::fmt;

use anyhow::Result;
use serde::Deserialize;

use super::Setting;
use crate::error::ReconcileError;
use crate::exec::Executor;

/// Which git configuration file a setting lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitScope {
    /// `~/.gitconfig` (`--global`).
    #[default]
    Global,
    /// The installation-wide file (`--system`).
    System,
}

impl GitScope {
    /// The `git config` flag selecting this scope.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Global => "--global",
            Self::System => "--system",
        }
    }
}

impl fmt::Display for GitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag().trim_start_matches('-'))
    }
}

/// A single `git config` key.
#[derive(Debug)]
pub struct GitConfigSetting<'a> {
    /// Config key (e.g., "core.autocrlf").
    pub key: String,
    /// Configuration file scope.
    pub scope: GitScope,
    /// Executor for running git commands.
    executor: &'a dyn Executor,
}

impl<'a> GitConfigSetting<'a> {
    /// Create a new git config setting.
    #[must_use]
    pub fn new(key: impl Into<String>, scope: GitScope, executor: &'a dyn Executor) -> Self {
        Self {
            key: key.into(),
            scope,
            executor,
        }
    }
}

impl Setting for GitConfigSetting<'_> {
    fn description(&self) -> String {
        format!("git config {} {}", self.scope, self.key)
    }

    /// `git config --get` exits 1 when the key is unset; any other failure
    /// (unreadable or malformed config file) is a read failure.
    fn read(&self) -> Result<String, ReconcileError> {
        let result = self
            .executor
            .run_unchecked("git", &["config", self.scope.flag(), "--get", &self.key])
            .map_err(|e| ReconcileError::read_failed(self.description(), format!("{e:#}")))?;
        let current = result.stdout.trim();

        if result.success && !current.is_empty() {
            Ok(current.to_string())
        } else if result.success || result.code == Some(1) {
            Err(self.not_found())
        } else {
            Err(ReconcileError::read_failed(
                self.description(),
                result.stderr.trim(),
            ))
        }
    }

    fn write(&self, value: &str) -> Result<()> {
        self.executor
            .run("git", &["config", self.scope.flag(), &self.key, value])?;
        Ok(())
    }
}
