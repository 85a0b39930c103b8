//! Command: report drift without changing anything.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{CommandSetup, select_tasks};
use crate::cli::{CheckOpts, GlobalOpts};
use crate::logging::{Log, Logger};
use crate::reconcile::{Action, ReconcileResult};
use crate::tasks;

/// Run the check command.
///
/// Every setting is reconciled in dry-run mode.  Pending changes are not an
/// error; a setting whose state cannot be read is.
///
/// # Errors
///
/// Returns an error if setup fails or any setting (or task) failed.
pub fn run(global: &GlobalOpts, opts: &CheckOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let ctx = setup.into_context(global, Arc::clone(log) as Arc<dyn Log>, true)?;

    let results = tasks::execute(&select_tasks(&opts.tasks), &ctx);

    if opts.json {
        let mut stdout = std::io::stdout().lock();
        write_json(&mut stdout, &results)?;
    } else {
        log.print_summary();
    }

    let count = results
        .iter()
        .filter(|r| r.action == Action::Failed)
        .count();
    if count > 0 {
        anyhow::bail!("{count} setting(s) failed");
    }
    Ok(())
}

/// Write `results` as a pretty-printed JSON array followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json(out: &mut impl std::io::Write, results: &[ReconcileResult]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, results).context("serializing results")?;
    writeln!(out).context("writing results")?;
    Ok(())
}
