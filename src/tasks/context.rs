//! Shared state handed to every task.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;
use crate::prompt::Prompt;
use crate::resources::expand_home;
use crate::resources::registry::SettingsStore;

/// Shared context for building setting specs.
pub struct Context {
    /// Configuration loaded from `conf/`.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Platform,
    /// Logger for output and summary recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// User's home directory path.
    pub home: PathBuf,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Source of answers to interactive questions.
    pub prompt: Arc<dyn Prompt>,
    /// Registry-like settings store.
    pub store: Arc<dyn SettingsStore + Send + Sync>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("home", &self.home)
            .field("executor", &self.executor)
            .field("prompt", &"<dyn Prompt>")
            .field("store", &"<dyn SettingsStore>")
            .finish()
    }
}

impl Context {
    /// Creates a new context.
    ///
    /// # Errors
    ///
    /// Returns an error if the HOME (or USERPROFILE on Windows) environment variable
    /// is not set.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<Config>,
        platform: Platform,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
        prompt: Arc<dyn Prompt>,
        store: Arc<dyn SettingsStore + Send + Sync>,
    ) -> Result<Self> {
        let home = if cfg!(target_os = "windows") {
            std::env::var("USERPROFILE")
                .or_else(|_| std::env::var("HOME"))
                .map_err(|_| {
                    anyhow::anyhow!("neither USERPROFILE nor HOME environment variable is set")
                })?
        } else {
            std::env::var("HOME")
                .map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?
        };

        Ok(Self {
            config,
            platform,
            log,
            dry_run,
            home: PathBuf::from(home),
            executor,
            prompt,
            store,
        })
    }

    /// Root directory containing `conf/`.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Expand a configured path, resolving a leading `~` to [`Self::home`].
    #[must_use]
    pub fn expand(&self, path: &str) -> PathBuf {
        expand_home(path, &self.home)
    }

    /// The executor as a borrowed trait object for adapters.
    #[must_use]
    pub fn executor(&self) -> &dyn Executor {
        &*self.executor
    }

    /// The settings store as a borrowed trait object for adapters.
    #[must_use]
    pub fn store(&self) -> &dyn SettingsStore {
        &*self.store
    }
}
