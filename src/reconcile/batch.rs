//! Sequential batch execution with critical-spec halting.

use super::{Action, ReconcileResult, Reconciler, SettingSpec};

impl Reconciler<'_> {
    /// Reconcile every spec in order and collect one result per spec.
    ///
    /// Failures do not stop the batch unless the failing spec is critical.
    /// A critical spec that fails, or whose precondition is missing, halts
    /// the run; every remaining spec reports `NotApplicable` without being
    /// read or written.
    pub fn run_all(&self, specs: &[SettingSpec<'_>]) -> Vec<ReconcileResult> {
        self.run_continuing(specs, &mut None)
    }

    /// Like [`Self::run_all`], carrying the halt across consecutive batches.
    ///
    /// `halted_by` names the critical spec that stopped an earlier batch.
    /// When set on entry, nothing in `specs` is attempted; when a critical
    /// spec in `specs` halts, it is set for the next batch.
    pub fn run_continuing(
        &self,
        specs: &[SettingSpec<'_>],
        halted_by: &mut Option<String>,
    ) -> Vec<ReconcileResult> {
        let mut results = Vec::with_capacity(specs.len());

        for spec in specs {
            if let Some(blocker) = halted_by.as_deref() {
                results.push(ReconcileResult::not_applicable(
                    &spec.name,
                    format!("not attempted: {blocker} failed"),
                ));
                continue;
            }

            let result = self.reconcile(spec);
            if spec.critical && halts(&result) {
                self.log.error(&format!(
                    "{} is critical; halting remaining settings",
                    spec.name
                ));
                *halted_by = Some(spec.name.clone());
            }
            results.push(result);
        }

        results
    }
}

/// Whether a critical spec's result stops the batch.
const fn halts(result: &ReconcileResult) -> bool {
    matches!(result.action, Action::Failed) || result.is_precondition_missing()
}
