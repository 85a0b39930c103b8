//! Tool installation through the platform package manager.
use anyhow::Result;

use super::{Context, Task};
use crate::reconcile::{SettingSpec, ValueKind};
use crate::resources::tool::{INSTALLED, PackageManager, ToolSetting};

/// Install configured tools with the platform package manager.
#[derive(Debug)]
pub struct InstallTools;

impl Task for InstallTools {
    fn name(&self) -> &'static str {
        "Install tools"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.tools.is_empty()
    }

    fn specs<'a>(&self, ctx: &'a Context) -> Result<Vec<SettingSpec<'a>>> {
        let manager = PackageManager::for_os(ctx.platform.os);
        let mut specs = Vec::new();

        for tool in &ctx.config.tools {
            let Some(id) = tool.id_for(manager) else {
                ctx.log
                    .debug(&format!("no {manager} package for {}", tool.name));
                continue;
            };
            let setting = ToolSetting::new(
                id.to_string(),
                tool.command.clone(),
                manager,
                ctx.executor(),
            );
            specs.push(
                SettingSpec::new(
                    format!("tool:{}", tool.name),
                    setting,
                    INSTALLED,
                    ValueKind::String,
                )
                .requires(manager.program())
                .critical(tool.critical),
            );
        }

        Ok(specs)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::config::tools::Tool;
    use crate::tasks::test_helpers::{empty_config, linux_context, windows_context};

    fn config() -> Config {
        Config {
            tools: vec![
                Tool {
                    name: "git".into(),
                    command: Some("git".into()),
                    winget: Some("Git.Git".into()),
                    pacman: Some("git".into()),
                    critical: true,
                    ..Tool::default()
                },
                Tool {
                    name: "powertoys".into(),
                    winget: Some("Microsoft.PowerToys".into()),
                    ..Tool::default()
                },
            ],
            ..empty_config()
        }
    }

    #[test]
    fn should_run_only_with_tools() {
        assert!(!InstallTools.should_run(&linux_context(empty_config())));
        assert!(InstallTools.should_run(&linux_context(config())));
    }

    #[test]
    fn tools_without_a_package_are_omitted() {
        let ctx = linux_context(config());
        let specs = InstallTools.specs(&ctx).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "tool:git");
        assert_eq!(specs[0].requires.as_deref(), Some("pacman"));
        assert!(specs[0].critical);
    }

    #[test]
    fn windows_uses_winget_ids() {
        let ctx = windows_context(config());
        let specs = InstallTools.specs(&ctx).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1].setting.description(), "Microsoft.PowerToys (winget)");
        assert_eq!(specs[1].requires.as_deref(), Some("winget"));
        assert!(!specs[1].critical);
    }
}
