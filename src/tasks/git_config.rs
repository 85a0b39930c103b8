//! Git identity and configuration keys.
use anyhow::Result;

use super::{Context, Task};
use crate::reconcile::{SettingSpec, ValueKind};
use crate::resources::Setting;
use crate::resources::git_config::GitConfigSetting;

/// Identity keys and the question asked when neither the configuration nor
/// git provides a value.
const IDENTITY: [(&str, &str); 2] = [
    ("user.name", "Git user name"),
    ("user.email", "Git user email"),
];

/// Configure git identity and settings.
#[derive(Debug)]
pub struct ConfigureGit;

impl Task for ConfigureGit {
    fn name(&self) -> &'static str {
        "Configure git"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn specs<'a>(&self, ctx: &'a Context) -> Result<Vec<SettingSpec<'a>>> {
        let git = &ctx.config.git;
        let mut specs = Vec::new();

        for (key, question) in IDENTITY {
            let configured = match key {
                "user.name" => git.identity.name.as_deref(),
                _ => git.identity.email.as_deref(),
            };
            let target = match configured {
                Some(value) => value.to_string(),
                None => resolve_identity(ctx, key, question)?,
            };
            specs.push(
                SettingSpec::new(
                    format!("git:{key}"),
                    GitConfigSetting::new(key, git.scope, ctx.executor()),
                    target,
                    ValueKind::String,
                )
                .requires("git"),
            );
        }

        for setting in &git.settings {
            specs.push(
                SettingSpec::new(
                    format!("git:{}", setting.key),
                    GitConfigSetting::new(setting.key.as_str(), git.scope, ctx.executor()),
                    setting.value.as_str(),
                    ValueKind::String,
                )
                .requires("git"),
            );
        }

        Ok(specs)
    }
}

/// Keep an identity value git already has; otherwise ask for one.
///
/// Without git, or in dry-run mode, nothing is asked and the target is left
/// empty: the `git` precondition stops the spec before it is read, and a dry
/// run never writes.
fn resolve_identity(ctx: &Context, key: &str, question: &str) -> Result<String> {
    if !ctx.executor.which("git") {
        ctx.log.debug(&format!("git not found; not resolving {key}"));
        return Ok(String::new());
    }

    let setting = GitConfigSetting::new(key, ctx.config.git.scope, ctx.executor());
    match setting.read() {
        Ok(current) => return Ok(current),
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e.into()),
    }

    if ctx.dry_run {
        ctx.log.dry_run(&format!("would ask: {question}"));
        return Ok(String::new());
    }

    Ok(ctx.prompt.ask(question, None)?)
}
