//! Core logging types: summary entries and the [`Log`] trait.
use crate::reconcile::{Action, ReconcileResult};

/// One line of the run summary.
#[derive(Debug, Clone)]
pub struct SummaryEntry {
    /// Setting or task name.
    pub name: String,
    /// Terminal action.
    pub action: Action,
    /// Optional detail (error text or not-applicable reason).
    pub message: Option<String>,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) is the production implementation;
/// reconciler and task code log through `&dyn Log` so tests can supply an
/// isolated logger.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record an outcome for the summary.
    fn record(&self, name: &str, action: Action, message: Option<&str>);

    /// Record a reconcile result for the summary.
    fn record_result(&self, result: &ReconcileResult) {
        self.record(&result.name, result.action, result.message().as_deref());
    }
}
