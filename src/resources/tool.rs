//! Tool installation through the platform package manager.
use anyhow::{Result, bail};

use super::Setting;
use crate::error::ReconcileError;
use crate::exec::Executor;
use crate::platform::Os;

/// Value reported for an installed tool; the install target.
pub const INSTALLED: &str = "installed";

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Arch Linux packages (pacman).
    Pacman,
    /// Windows packages (winget).
    Winget,
}

impl PackageManager {
    /// The package manager used on `os`.
    #[must_use]
    pub const fn for_os(os: Os) -> Self {
        match os {
            Os::Windows => Self::Winget,
            Os::Linux => Self::Pacman,
        }
    }

    /// The executable that must be on `PATH` to use this manager.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Winget => "winget",
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

/// A tool that should be installed.
///
/// Presence is detected first by looking for `command` on `PATH`, then by
/// asking the package manager about `id`.
#[derive(Debug)]
pub struct ToolSetting<'a> {
    /// Package name (or winget ID).
    pub id: String,
    /// Executable the package provides, if any.
    pub command: Option<String>,
    /// Package manager to use.
    pub manager: PackageManager,
    /// Executor for running package manager commands.
    executor: &'a dyn Executor,
}

impl<'a> ToolSetting<'a> {
    /// Create a new tool setting.
    #[must_use]
    pub const fn new(
        id: String,
        command: Option<String>,
        manager: PackageManager,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            id,
            command,
            manager,
            executor,
        }
    }

    fn query(&self) -> Result<bool> {
        match self.manager {
            PackageManager::Pacman => {
                let result = self.executor.run_unchecked("pacman", &["-Q", &self.id])?;
                Ok(result.success)
            }
            PackageManager::Winget => {
                let result = self.executor.run_unchecked(
                    "winget",
                    &[
                        "list",
                        "--id",
                        &self.id,
                        "--exact",
                        "--accept-source-agreements",
                        "--disable-interactivity",
                    ],
                )?;
                Ok(result.success && result.stdout.contains(&self.id))
            }
        }
    }
}

impl Setting for ToolSetting<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.id, self.manager)
    }

    fn read(&self) -> Result<String, ReconcileError> {
        if self
            .command
            .as_deref()
            .is_some_and(|cmd| self.executor.which(cmd))
        {
            return Ok(INSTALLED.to_string());
        }
        match self.query() {
            Ok(true) => Ok(INSTALLED.to_string()),
            Ok(false) => Err(self.not_found()),
            Err(e) => Err(ReconcileError::read_failed(
                self.description(),
                format!("{e:#}"),
            )),
        }
    }

    fn write(&self, _value: &str) -> Result<()> {
        match self.manager {
            PackageManager::Pacman => {
                self.executor.run(
                    "sudo",
                    &["pacman", "-S", "--needed", "--noconfirm", &self.id],
                )?;
            }
            PackageManager::Winget => {
                let result = self.executor.run_unchecked(
                    "winget",
                    &[
                        "install",
                        "--id",
                        &self.id,
                        "--exact",
                        "--source",
                        "winget",
                        "--accept-source-agreements",
                        "--accept-package-agreements",
                        "--disable-interactivity",
                    ],
                )?;
                if !result.success {
                    // winget writes most diagnostics to stdout.
                    let detail = if result.stderr.trim().is_empty() {
                        result.stdout.trim().to_string()
                    } else {
                        format!("{}\n{}", result.stdout.trim(), result.stderr.trim())
                    };
                    bail!("winget install failed: {detail}");
                }
            }
        }
        Ok(())
    }
}
