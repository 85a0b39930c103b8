//! Git repositories cloned to a local path.
//!
//! Inspection uses `git2` directly; cloning shells out to `git` so the
//! user's credential helpers and SSH configuration apply.
use std::path::PathBuf;

use anyhow::{Result, bail};

use super::Setting;
use crate::error::ReconcileError;
use crate::exec::Executor;

/// A repository that should be cloned at `path` from `url`.
///
/// The current value is the `origin` remote URL of the checkout.  An
/// existing checkout with a different origin is never re-cloned over:
/// the write refuses to touch a non-empty path.
#[derive(Debug)]
pub struct RepositorySetting<'a> {
    /// Remote URL to clone.
    pub url: String,
    /// Destination directory.
    pub path: PathBuf,
    executor: &'a dyn Executor,
}

impl<'a> RepositorySetting<'a> {
    /// Create a new repository setting.
    #[must_use]
    pub const fn new(url: String, path: PathBuf, executor: &'a dyn Executor) -> Self {
        Self {
            url,
            path,
            executor,
        }
    }
}

impl Setting for RepositorySetting<'_> {
    fn description(&self) -> String {
        format!("{} -> {}", self.url, self.path.display())
    }

    fn read(&self) -> Result<String, ReconcileError> {
        if !self.path.exists() {
            return Err(self.not_found());
        }
        let repo = git2::Repository::open(&self.path)
            .map_err(|e| ReconcileError::read_failed(self.description(), e.message()))?;
        match repo.find_remote("origin") {
            Ok(remote) => Ok(remote.url().unwrap_or_default().to_string()),
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                Err(ReconcileError::read_failed(self.description(), "no origin remote"))
            }
            Err(e) => Err(ReconcileError::read_failed(self.description(), e.message())),
        }
    }

    fn write(&self, _value: &str) -> Result<()> {
        if self.path.exists() {
            bail!(
                "{} already exists and is not a clone of {}",
                self.path.display(),
                self.url
            );
        }
        super::ensure_parent_dir(&self.path)?;
        let path = self.path.to_string_lossy();
        self.executor.run("git", &["clone", self.url.as_str(), &*path])?;
        Ok(())
    }
}
