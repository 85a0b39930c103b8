//! Command: apply every configured setting.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, select_tasks};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::{Log, Logger};
use crate::tasks;

/// Run the install command.
///
/// # Errors
///
/// Returns an error if setup fails or any setting (or task) failed.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("devsetup {}", crate::version()));
    if global.dry_run {
        log.info("dry run: no changes will be made");
    }

    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.into_context(global, Arc::clone(log) as Arc<dyn Log>, global.dry_run)?;

    tasks::execute(&select_tasks(opts), &ctx);
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} setting(s) failed");
    }
    Ok(())
}
