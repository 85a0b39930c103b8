//! TOML configuration under `<root>/conf/`.
pub mod environment;
pub mod git_config;
pub mod profile;
pub mod registry;
pub mod repositories;
pub mod ssh;
pub mod toml_loader;
pub mod tools;
pub mod validation;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::platform::Platform;

/// All loaded configuration.
#[derive(Debug, Default)]
pub struct Config {
    /// Root directory containing `conf/`.
    pub root: PathBuf,
    /// Tools to install.
    pub tools: Vec<tools::Tool>,
    /// Git scope, identity and settings.
    pub git: git_config::GitConfig,
    /// SSH key and host configuration.
    pub ssh: ssh::SshConfig,
    /// Registry values (applied on Windows only).
    pub registry: Vec<registry::RegistryEntry>,
    /// User environment variables.
    pub environment: Vec<(String, String)>,
    /// Shell profile lines.
    pub profile: Vec<profile::ProfileLine>,
    /// Repositories to clone.
    pub repositories: Vec<repositories::Repository>,
}

impl Config {
    /// Load every configuration file from `<root>/conf/`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the file that could not be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        let conf = root.join("conf");

        let tools = tools::load(&conf.join("tools.toml")).context("loading tools.toml")?;
        let git =
            git_config::load(&conf.join("git-config.toml")).context("loading git-config.toml")?;
        let ssh = ssh::load(&conf.join("ssh.toml")).context("loading ssh.toml")?;
        let registry =
            registry::load(&conf.join("registry.toml")).context("loading registry.toml")?;
        let environment = environment::load(&conf.join("environment.toml"))
            .context("loading environment.toml")?;
        let profile = profile::load(&conf.join("profile.toml")).context("loading profile.toml")?;
        let repositories = repositories::load(&conf.join("repositories.toml"))
            .context("loading repositories.toml")?;

        Ok(Self {
            root: root.to_path_buf(),
            tools,
            git,
            ssh,
            registry,
            environment,
            profile,
            repositories,
        })
    }

    /// Run every validator and return the collected warnings.
    #[must_use]
    pub fn validate(&self, platform: &Platform) -> Vec<validation::ValidationWarning> {
        validation::validate_all(self, platform)
    }
}
