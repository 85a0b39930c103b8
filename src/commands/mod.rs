//! Top-level subcommand orchestration.
pub mod check;
pub mod install;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::Config;
use crate::error::ConfigError;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::prompt::{ConsolePrompt, NonInteractivePrompt, Prompt};
use crate::resources::registry::{self, SettingsStore};
use crate::tasks::{self, Context, Task};

/// Environment variable naming the configuration root.
pub const ROOT_ENV: &str = "DEVSETUP_ROOT";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, root resolution, and configuration
/// loading so that each command does not have to repeat the boilerplate.
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Platform,
    /// Loaded configuration.
    pub config: Config,
    /// Settings store for this platform.
    pub store: Arc<dyn SettingsStore + Send + Sync>,
}

impl std::fmt::Debug for CommandSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSetup")
            .field("platform", &self.platform)
            .field("config", &self.config)
            .field("store", &"<dyn SettingsStore>")
            .finish()
    }
}

impl CommandSetup {
    /// Detect the platform, resolve the root, and load all configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform version cannot be detected, the root
    /// directory cannot be determined, or any configuration file fails to
    /// parse.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self> {
        let store: Arc<dyn SettingsStore + Send + Sync> = Arc::from(registry::system_store());
        let platform = Platform::detect(&*store)?;
        log.info(&format!("platform: {platform}"));

        let root = resolve_root(global)?;
        log.debug(&format!("root: {}", root.display()));

        log.stage("Loading configuration");
        let config = Config::load(&root)?;

        log.debug(&format!("{} tools", config.tools.len()));
        log.debug(&format!("{} git settings", config.git.settings.len()));
        log.debug(&format!("{} registry entries", config.registry.len()));
        log.debug(&format!(
            "{} environment variables",
            config.environment.len()
        ));
        log.debug(&format!("{} profile lines", config.profile.len()));
        log.debug(&format!("{} repositories", config.repositories.len()));

        let warnings = config.validate(&platform);
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self {
            platform,
            config,
            store,
        })
    }

    /// Build the task context with production capabilities.
    ///
    /// `--yes` selects a prompt that never reads from the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn into_context(
        self,
        global: &GlobalOpts,
        log: Arc<dyn Log>,
        dry_run: bool,
    ) -> Result<Context> {
        let prompt: Arc<dyn Prompt> = if global.yes {
            Arc::new(NonInteractivePrompt)
        } else {
            Arc::new(ConsolePrompt::stdio())
        };
        Context::new(
            Arc::new(self.config),
            self.platform,
            log,
            dry_run,
            Arc::new(SystemExecutor),
            prompt,
            self.store,
        )
    }
}

/// Select tasks by `--only` (takes precedence) or `--skip`.
///
/// Names match case-insensitively by substring, so `--only git` selects
/// "Configure git".
#[must_use]
pub fn select_tasks(opts: &InstallOpts) -> Vec<Box<dyn Task>> {
    tasks::all_tasks()
        .into_iter()
        .filter(|t| {
            let name = t.name().to_lowercase();
            if !opts.only.is_empty() {
                return opts.only.iter().any(|o| name.contains(&o.to_lowercase()));
            }
            !opts.skip.iter().any(|s| name.contains(&s.to_lowercase()))
        })
        .collect()
}

/// Resolve the configuration root directory.
///
/// Checked in order: `--root`, `DEVSETUP_ROOT`, the binary's location
/// (`bin/..` or `target/<profile>/../..`), then the current directory.
///
/// # Errors
///
/// Returns [`ConfigError::RootNotFound`] if no candidate contains `conf/`.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf, ConfigError> {
    if let Some(root) = &global.root {
        return checked_root(root)
            .ok_or_else(|| ConfigError::RootNotFound(format!("{} has no conf/", root.display())));
    }

    if let Ok(root) = std::env::var(ROOT_ENV) {
        return checked_root(Path::new(&root)).ok_or_else(|| {
            ConfigError::RootNotFound(format!("{ROOT_ENV}={root} has no conf/"))
        });
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let candidates = [parent.to_path_buf(), parent.join(".."), parent.join("../..")];
        if let Some(root) = candidates.iter().find_map(|c| checked_root(c)) {
            return Ok(root);
        }
    }

    std::env::current_dir()
        .ok()
        .and_then(|cwd| checked_root(&cwd))
        .ok_or_else(|| {
            ConfigError::RootNotFound(format!("use --root or set {ROOT_ENV}"))
        })
}

/// Canonical form of `dir` if it contains `conf/`.
fn checked_root(dir: &Path) -> Option<PathBuf> {
    if dir.join("conf").is_dir() {
        dunce::canonicalize(dir).ok()
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_with_conf_is_canonicalized() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("conf")).unwrap();
        let global = GlobalOpts {
            root: Some(dir.path().join(".")),
            ..GlobalOpts::default()
        };

        let root = resolve_root(&global).unwrap();
        assert_eq!(root, dunce::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn explicit_root_without_conf_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            root: Some(dir.path().to_path_buf()),
            ..GlobalOpts::default()
        };

        let err = resolve_root(&global).unwrap_err();
        assert!(matches!(err, ConfigError::RootNotFound(_)));
        assert!(err.to_string().contains("has no conf/"));
    }

    #[test]
    fn only_takes_precedence_over_skip() {
        let opts = InstallOpts {
            only: vec!["GIT".into()],
            skip: vec!["git".into()],
        };
        let names: Vec<&str> = select_tasks(&opts).iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Configure git"]);
    }

    #[test]
    fn skip_removes_matching_tasks() {
        let opts = InstallOpts {
            skip: vec!["registry".into(), "ssh".into()],
            ..InstallOpts::default()
        };
        let names: Vec<&str> = select_tasks(&opts).iter().map(|t| t.name()).collect();
        assert!(!names.contains(&"Apply registry settings"));
        assert!(!names.contains(&"Configure SSH"));
        assert_eq!(names.len(), tasks::all_tasks().len() - 2);
    }
}
