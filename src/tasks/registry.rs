//! Windows registry values, gated on the Windows build.
use anyhow::Result;

use super::{Context, Task};
use crate::reconcile::{PlatformVersion, SettingSpec, VersionGate};
use crate::resources::registry::RegistrySetting;

/// Apply Windows registry settings.
#[derive(Debug)]
pub struct ApplyRegistry;

impl Task for ApplyRegistry {
    fn name(&self) -> &'static str {
        "Apply registry settings"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.is_windows() && !ctx.config.registry.is_empty()
    }

    fn specs<'a>(&self, ctx: &'a Context) -> Result<Vec<SettingSpec<'a>>> {
        Ok(ctx
            .config
            .registry
            .iter()
            .map(|entry| {
                let setting = RegistrySetting::new(
                    entry.key_path.as_str(),
                    entry.value_name.as_str(),
                    entry.kind,
                    ctx.store(),
                );
                let spec = SettingSpec::new(
                    format!("registry:{}:{}", entry.section, entry.value_name),
                    setting,
                    entry.value_data.as_str(),
                    entry.kind,
                );
                match entry.min_build {
                    Some(build) => spec.gated(VersionGate::new(
                        PlatformVersion::windows_build(build),
                        ctx.platform.version,
                    )),
                    None => spec,
                }
            })
            .collect())
    }
}
