//! Configuration warnings reported before anything is reconciled.
use std::collections::HashSet;
use std::path::Path;

use crate::platform::Platform;
use crate::reconcile::{ValueKind, parse_integer};
use crate::resources::registry::split_hive;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration source (e.g., "registry.toml").
    pub source: String,
    /// The specific item or section that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration validators.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self, platform: &Platform) -> Vec<ValidationWarning>;
}

/// Validator for `tools.toml`.
#[derive(Debug)]
pub struct ToolValidator<'a> {
    tools: &'a [super::tools::Tool],
}

impl<'a> ToolValidator<'a> {
    /// Create a validator over `tools`.
    #[must_use]
    pub const fn new(tools: &'a [super::tools::Tool]) -> Self {
        Self { tools }
    }
}

impl ConfigValidator for ToolValidator<'_> {
    fn validate(&self, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for tool in self.tools {
            let ids = [&tool.id, &tool.winget, &tool.pacman];
            if ids.iter().all(|id| id.is_none()) {
                warnings.push(ValidationWarning::new(
                    "tools.toml",
                    &tool.name,
                    "tool has no package id",
                ));
            }
            if ids
                .iter()
                .any(|id| id.as_deref().is_some_and(|s| s.trim().is_empty()))
            {
                warnings.push(ValidationWarning::new(
                    "tools.toml",
                    &tool.name,
                    "package id is empty",
                ));
            }
        }

        warnings
    }
}

/// Validator for `git-config.toml`.
#[derive(Debug)]
pub struct GitConfigValidator<'a> {
    config: &'a super::git_config::GitConfig,
}

impl<'a> GitConfigValidator<'a> {
    /// Create a validator over `config`.
    #[must_use]
    pub const fn new(config: &'a super::git_config::GitConfig) -> Self {
        Self { config }
    }
}

impl ConfigValidator for GitConfigValidator<'_> {
    fn validate(&self, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for setting in &self.config.settings {
            let key = setting.key.to_lowercase();
            if key == "user.name" || key == "user.email" {
                warnings.push(ValidationWarning::new(
                    "git-config.toml",
                    &setting.key,
                    "set the identity under [identity] instead",
                ));
            }
            if !seen.insert(key) {
                warnings.push(ValidationWarning::new(
                    "git-config.toml",
                    &setting.key,
                    "duplicate key; the last value wins",
                ));
            }
        }

        warnings
    }
}

/// Validator for `registry.toml`.
#[derive(Debug)]
pub struct RegistryValidator<'a> {
    entries: &'a [super::registry::RegistryEntry],
}

impl<'a> RegistryValidator<'a> {
    /// Create a validator over `entries`.
    #[must_use]
    pub const fn new(entries: &'a [super::registry::RegistryEntry]) -> Self {
        Self { entries }
    }
}

impl ConfigValidator for RegistryValidator<'_> {
    fn validate(&self, platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if !self.entries.is_empty() && !platform.is_windows() {
            warnings.push(ValidationWarning::new(
                "registry.toml",
                "registry entries",
                "registry entries defined but platform does not support registry",
            ));
        }

        for entry in self.entries {
            let item = format!("{}\\{}", entry.key_path, entry.value_name);
            if entry.value_name.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    "registry.toml",
                    &entry.section,
                    "registry value name is empty",
                ));
            }
            if let Err(e) = split_hive(&entry.key_path) {
                warnings.push(ValidationWarning::new("registry.toml", &item, e.to_string()));
            }
            if entry.kind == ValueKind::IntegerFlag
                && parse_integer(&entry.value_data).is_none_or(|n| u32::try_from(n).is_err())
            {
                warnings.push(ValidationWarning::new(
                    "registry.toml",
                    &item,
                    format!("'{}' is not a valid DWORD", entry.value_data),
                ));
            }
        }

        warnings
    }
}

/// Validator for `repositories.toml`.
#[derive(Debug)]
pub struct RepositoryValidator<'a> {
    repositories: &'a [super::repositories::Repository],
}

impl<'a> RepositoryValidator<'a> {
    /// Create a validator over `repositories`.
    #[must_use]
    pub const fn new(repositories: &'a [super::repositories::Repository]) -> Self {
        Self { repositories }
    }
}

impl ConfigValidator for RepositoryValidator<'_> {
    fn validate(&self, _platform: &Platform) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for repo in self.repositories {
            if !repo.path.starts_with('~') && !Path::new(&repo.path).is_absolute() {
                warnings.push(ValidationWarning::new(
                    "repositories.toml",
                    &repo.path,
                    "path should be absolute or start with ~",
                ));
            }
            if repo.url.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    "repositories.toml",
                    &repo.path,
                    "repository URL is empty",
                ));
            }
        }

        warnings
    }
}

/// Validate all configuration and return collected warnings.
#[must_use]
pub fn validate_all(config: &super::Config, platform: &Platform) -> Vec<ValidationWarning> {
    let validators: Vec<Box<dyn ConfigValidator>> = vec![
        Box::new(ToolValidator::new(&config.tools)),
        Box::new(GitConfigValidator::new(&config.git)),
        Box::new(RegistryValidator::new(&config.registry)),
        Box::new(RepositoryValidator::new(&config.repositories)),
    ];

    validators
        .iter()
        .flat_map(|v| v.validate(platform))
        .collect()
}
