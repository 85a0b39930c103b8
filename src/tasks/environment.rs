//! User-scope environment variables.
use anyhow::Result;

use super::{Context, Task};
use crate::reconcile::{SettingSpec, ValueKind};
use crate::resources::file_line::{FileLineSetting, PRESENT};
use crate::resources::registry::RegistrySetting;

/// Set user environment variables.
///
/// On Windows the variables live in `HKCU\Environment`; elsewhere they are
/// exported from `~/.profile`.
#[derive(Debug)]
pub struct SetEnvironment;

impl Task for SetEnvironment {
    fn name(&self) -> &'static str {
        "Set environment variables"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.environment.is_empty()
    }

    fn specs<'a>(&self, ctx: &'a Context) -> Result<Vec<SettingSpec<'a>>> {
        let profile = ctx.home.join(".profile");

        Ok(ctx
            .config
            .environment
            .iter()
            .map(|(name, value)| {
                let spec_name = format!("env:{name}");
                if ctx.platform.is_windows() {
                    SettingSpec::new(
                        spec_name,
                        RegistrySetting::environment(name.as_str(), ctx.store()),
                        value.as_str(),
                        ValueKind::String,
                    )
                } else {
                    SettingSpec::new(
                        spec_name,
                        FileLineSetting::new(&profile, export_line(name, value)),
                        PRESENT,
                        ValueKind::String,
                    )
                }
            })
            .collect())
    }
}

/// POSIX shell `export` statement with the value double-quoted.
fn export_line(name: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("export {name}=\"{escaped}\"")
}
