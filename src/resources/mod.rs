//! Read/write adapters for each setting domain.
//!
//! Every adapter implements [`Setting`]: `read` reports the current value
//! (or [`ReconcileError::NotFound`] when absent) and `write` applies a target
//! value.  Comparison and the decision to write belong to the
//! [`Reconciler`](crate::reconcile::Reconciler), never to the adapter.
pub mod file_line;
pub mod git_config;
pub mod registry;
pub mod repository;
pub mod ssh_key;
pub mod tool;

use anyhow::{Context as _, Result};

use crate::error::ReconcileError;

/// Read/write capability for one setting.
pub trait Setting {
    /// Human-readable description of this setting.
    fn description(&self) -> String;

    /// Read the current value.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::NotFound`] when the setting is absent and
    /// [`ReconcileError::ReadFailed`] when its state cannot be determined.
    fn read(&self) -> Result<String, ReconcileError>;

    /// Apply `value`, creating parent keys, directories or files as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying tool, store or filesystem rejects
    /// the change.
    fn write(&self, value: &str) -> Result<()>;

    /// The `NotFound` error for this setting.
    fn not_found(&self) -> ReconcileError {
        ReconcileError::not_found(self.description())
    }
}

/// Expand a leading `~` to `home`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use devsetup_cli::resources::expand_home;
///
/// let home = Path::new("/home/ada");
/// assert_eq!(expand_home("~/.ssh/config", home), home.join(".ssh/config"));
/// assert_eq!(expand_home("/etc/hosts", home), Path::new("/etc/hosts"));
/// ```
#[must_use]
pub fn expand_home(path: &str, home: &std::path::Path) -> std::path::PathBuf {
    if path == "~" {
        return home.to_path_buf();
    }
    path.strip_prefix("~/")
        .or_else(|| path.strip_prefix("~\\"))
        .map_or_else(|| std::path::PathBuf::from(path), |rest| home.join(rest))
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}
