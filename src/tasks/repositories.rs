//! Repository clones.
use anyhow::Result;

use super::{Context, Task};
use crate::reconcile::{SettingSpec, ValueKind};
use crate::resources::repository::RepositorySetting;

/// Clone configured repositories.
#[derive(Debug)]
pub struct CloneRepositories;

impl Task for CloneRepositories {
    fn name(&self) -> &'static str {
        "Clone repositories"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.repositories.is_empty()
    }

    fn specs<'a>(&self, ctx: &'a Context) -> Result<Vec<SettingSpec<'a>>> {
        Ok(ctx
            .config
            .repositories
            .iter()
            .map(|repo| {
                SettingSpec::new(
                    format!("repo:{}", repo.path),
                    RepositorySetting::new(
                        repo.url.clone(),
                        ctx.expand(&repo.path),
                        ctx.executor(),
                    ),
                    repo.url.as_str(),
                    ValueKind::String,
                )
                .requires("git")
            })
            .collect())
    }
}
