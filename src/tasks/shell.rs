//! Shell profile lines appended when missing.
use anyhow::Result;

use super::{Context, Task};
use crate::reconcile::{SettingSpec, ValueKind};
use crate::resources::Setting as _;
use crate::resources::file_line::{FileLineSetting, PRESENT};

/// Append configured lines to shell profiles.
#[derive(Debug)]
pub struct ConfigureShellProfile;

impl Task for ConfigureShellProfile {
    fn name(&self) -> &'static str {
        "Configure shell profile"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config
            .profile
            .iter()
            .any(|line| line.applies_to(ctx.platform.os))
    }

    fn specs<'a>(&self, ctx: &'a Context) -> Result<Vec<SettingSpec<'a>>> {
        Ok(ctx
            .config
            .profile
            .iter()
            .filter(|line| line.applies_to(ctx.platform.os))
            .map(|line| {
                let setting = FileLineSetting::new(ctx.expand(&line.path), line.line.as_str());
                SettingSpec::new(
                    format!("profile:{}", setting.description()),
                    setting,
                    PRESENT,
                    ValueKind::String,
                )
            })
            .collect())
    }
}
