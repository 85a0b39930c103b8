//! The check-and-apply engine shared by every setting domain.
//!
//! A [`SettingSpec`] names a target value and carries a
//! [`Setting`](crate::resources::Setting) adapter that can read and write
//! it.  [`Reconciler::reconcile`] compares the two and writes only when they
//! differ; [`Reconciler::run_all`] drives an ordered batch.
//!
//! - [`gate`]: platform versions and the [`VersionGate`] evaluator
//! - [`batch`]: sequential batch runner with critical-spec halting

mod batch;
pub mod gate;

pub use gate::{PlatformVersion, VersionGate};

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::ReconcileError;
use crate::exec::Executor;
use crate::logging::Log;
use crate::resources::Setting;

/// How current and target values are compared.
///
/// # Examples
///
/// ```
/// use devsetup_cli::reconcile::ValueKind;
///
/// assert!(ValueKind::IntegerFlag.matches("14", "0x0E"));
/// assert!(ValueKind::Boolean.matches("1", "true"));
/// assert!(!ValueKind::String.matches("Main", "main"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    /// Exact string match.
    String,
    /// Numeric equality (decimal or `0x` hex).
    IntegerFlag,
    /// Normalized true/false.
    Boolean,
}

impl ValueKind {
    /// Compare `current` against `target` using this kind's equality.
    ///
    /// Strings compare byte for byte, surrounding whitespace included.  The
    /// numeric and boolean kinds ignore surrounding whitespace; values that
    /// cannot be interpreted as the kind fall back to an exact comparison.
    #[must_use]
    pub fn matches(self, current: &str, target: &str) -> bool {
        let (trimmed_current, trimmed_target) = (current.trim(), target.trim());
        match self {
            Self::String => current == target,
            Self::IntegerFlag => match (parse_integer(trimmed_current), parse_integer(trimmed_target)) {
                (Some(a), Some(b)) => a == b,
                _ => current == target,
            },
            Self::Boolean => match (parse_bool(trimmed_current), parse_bool(trimmed_target)) {
                (Some(a), Some(b)) => a == b,
                _ => current == target,
            },
        }
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal integer.
#[must_use]
pub fn parse_integer(s: &str) -> Option<i64> {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .map_or_else(|| s.parse().ok(), |hex| i64::from_str_radix(hex, 16).ok())
}

/// Normalize common spellings of a boolean flag.
#[must_use]
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A named target value plus the adapter that reads and writes it.
pub struct SettingSpec<'a> {
    /// Identifier shown in logs and the summary.
    pub name: String,
    /// Read/write capability for the setting.
    pub setting: Box<dyn Setting + 'a>,
    /// Desired value.
    pub target: String,
    /// Equality used to compare current and target.
    pub kind: ValueKind,
    /// Optional platform-version precondition.
    pub gate: Option<VersionGate>,
    /// Program that must be on `PATH` before the setting is attempted.
    pub requires: Option<String>,
    /// Halt the batch when this spec fails.
    pub critical: bool,
}

impl fmt::Debug for SettingSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingSpec")
            .field("name", &self.name)
            .field("setting", &self.setting.description())
            .field("target", &self.target)
            .field("kind", &self.kind)
            .field("gate", &self.gate)
            .field("requires", &self.requires)
            .field("critical", &self.critical)
            .finish()
    }
}

impl<'a> SettingSpec<'a> {
    /// Create a non-critical, ungated spec.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        setting: impl Setting + 'a,
        target: impl Into<String>,
        kind: ValueKind,
    ) -> Self {
        Self {
            name: name.into(),
            setting: Box::new(setting),
            target: target.into(),
            kind,
            gate: None,
            requires: None,
            critical: false,
        }
    }

    /// Attach a version gate.
    #[must_use]
    pub fn gated(mut self, gate: VersionGate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Require `program` on `PATH` before attempting the spec.
    #[must_use]
    pub fn requires(mut self, program: impl Into<String>) -> Self {
        self.requires = Some(program.into());
        self
    }

    /// Mark the spec as critical (or not).
    #[must_use]
    pub fn critical(mut self, critical: bool) -> Self {
        self.critical = critical;
        self
    }
}

/// Terminal outcome of reconciling one spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Current value already matched the target; nothing written.
    Skipped,
    /// The target value was written.
    Applied,
    /// Reading or writing failed.
    Failed,
    /// The spec was not attempted (gate closed, precondition missing, batch halted).
    NotApplicable,
    /// The value differs but dry-run mode suppressed the write.
    DryRun,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Skipped => "skipped",
            Self::Applied => "applied",
            Self::Failed => "failed",
            Self::NotApplicable => "not applicable",
            Self::DryRun => "dry run",
        };
        f.write_str(s)
    }
}

/// Outcome of [`Reconciler::reconcile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    /// Spec name.
    pub name: String,
    /// Terminal action.
    pub action: Action,
    /// Value observed before any write (absent when the setting did not exist).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Failure detail for `Failed` and precondition-driven `NotApplicable`.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<ReconcileError>,
    /// Human-readable explanation for non-applied outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[allow(clippy::ref_option)] // signature dictated by serde's serialize_with
fn serialize_error<S: Serializer>(
    error: &Option<ReconcileError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    error
        .as_ref()
        .map(ToString::to_string)
        .serialize(serializer)
}

impl ReconcileResult {
    fn new(name: &str, action: Action) -> Self {
        Self {
            name: name.to_string(),
            action,
            previous: None,
            error: None,
            reason: None,
        }
    }

    /// A `NotApplicable` result with the given reason.
    #[must_use]
    pub fn not_applicable(name: &str, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::new(name, Action::NotApplicable)
        }
    }

    /// A `Failed` result for work that never produced a spec.
    #[must_use]
    pub fn failed(name: &str, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::new(name, Action::Failed)
        }
    }

    /// Message suitable for the run summary (error text, else reason).
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| self.reason.clone())
    }

    /// Whether this outcome is a precondition failure.
    #[must_use]
    pub const fn is_precondition_missing(&self) -> bool {
        matches!(self.error, Some(ReconcileError::PreconditionMissing { .. }))
    }
}

/// Runs specs against the system, one check-and-apply at a time.
#[derive(Clone, Copy)]
pub struct Reconciler<'a> {
    executor: &'a dyn Executor,
    log: &'a dyn Log,
    dry_run: bool,
}

impl fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("executor", &self.executor)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler.
    ///
    /// `executor` answers precondition (`which`) checks; `dry_run`
    /// suppresses every write.
    #[must_use]
    pub const fn new(executor: &'a dyn Executor, log: &'a dyn Log, dry_run: bool) -> Self {
        Self {
            executor,
            log,
            dry_run,
        }
    }

    /// Reconcile one spec, writing at most once.
    pub fn reconcile(&self, spec: &SettingSpec<'_>) -> ReconcileResult {
        let desc = spec.setting.description();

        if let Some(gate) = spec.gate.filter(|g| !g.applicable()) {
            self.log
                .debug(&format!("not applicable: {desc} ({})", gate.reason()));
            return ReconcileResult::not_applicable(&spec.name, gate.reason());
        }

        if let Some(program) = spec
            .requires
            .as_deref()
            .filter(|p| !self.executor.which(p))
        {
            let error = ReconcileError::PreconditionMissing {
                program: program.to_string(),
            };
            self.log.debug(&format!("not applicable: {desc} ({error})"));
            return ReconcileResult {
                error: Some(error),
                ..ReconcileResult::new(&spec.name, Action::NotApplicable)
            };
        }

        let current = match spec.setting.read() {
            Ok(value) => Some(value),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                self.log.warn(&format!("{}: {e}", spec.name));
                return ReconcileResult {
                    error: Some(e),
                    ..ReconcileResult::new(&spec.name, Action::Failed)
                };
            }
        };

        if let Some(current) = current
            .as_deref()
            .filter(|c| spec.kind.matches(c, &spec.target))
        {
            self.log.debug(&format!("ok: {desc}"));
            return ReconcileResult {
                previous: Some(current.to_string()),
                ..ReconcileResult::new(&spec.name, Action::Skipped)
            };
        }

        if self.dry_run {
            let msg = current.as_deref().map_or_else(
                || format!("would set {desc}"),
                |c| format!("would set {desc} (currently {c})"),
            );
            self.log.dry_run(&msg);
            return ReconcileResult {
                previous: current,
                ..ReconcileResult::new(&spec.name, Action::DryRun)
            };
        }

        match spec.setting.write(&spec.target) {
            Ok(()) => {
                self.log.info(&format!("set {desc}"));
                ReconcileResult {
                    previous: current,
                    ..ReconcileResult::new(&spec.name, Action::Applied)
                }
            }
            Err(e) => {
                let error = ReconcileError::WriteFailed {
                    setting: desc,
                    reason: format!("{e:#}"),
                };
                self.log.warn(&error.to_string());
                ReconcileResult {
                    previous: current,
                    error: Some(error),
                    ..ReconcileResult::new(&spec.name, Action::Failed)
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use crate::resources::test_helpers::{FakeSetting, MockExecutor};

    #[test]
    fn string_kind_is_exact() {
        assert!(ValueKind::String.matches("yyyy-MM-dd", "yyyy-MM-dd"));
        assert!(!ValueKind::String.matches("yyyy-MM-dd", "dd/MM/yyyy"));
    }

    #[test]
    fn string_kind_counts_surrounding_whitespace() {
        assert!(!ValueKind::String.matches("HH:mm ", "HH:mm"));
        assert!(!ValueKind::String.matches("HH:mm", " HH:mm"));
        assert!(!ValueKind::String.matches("nvim\n", "nvim"));
    }

    #[test]
    fn numeric_kinds_ignore_surrounding_whitespace() {
        assert!(ValueKind::IntegerFlag.matches(" 14\n", "0x0E"));
        assert!(ValueKind::Boolean.matches("true ", "1"));
    }

    #[test]
    fn integer_kind_compares_numerically() {
        assert!(ValueKind::IntegerFlag.matches("0", "0x0"));
        assert!(ValueKind::IntegerFlag.matches("014", "14"));
        assert!(!ValueKind::IntegerFlag.matches("1", "2"));
    }

    #[test]
    fn integer_kind_falls_back_to_string() {
        assert!(ValueKind::IntegerFlag.matches("abc", "abc"));
        assert!(!ValueKind::IntegerFlag.matches("abc", "1"));
    }

    #[test]
    fn boolean_kind_normalizes() {
        assert!(ValueKind::Boolean.matches("TRUE", "1"));
        assert!(ValueKind::Boolean.matches("off", "0"));
        assert!(!ValueKind::Boolean.matches("0", "1"));
    }

    #[test]
    fn missing_value_is_applied_without_previous() {
        let (log, _tmp, _guard) = isolated_logger();
        let exec = MockExecutor::with_responses(vec![]);
        let setting = FakeSetting::absent();
        let writes = setting.writes();
        let spec = SettingSpec::new("editor", setting, "vim", ValueKind::String);

        let result = Reconciler::new(&exec, &log, false).reconcile(&spec);

        assert_eq!(result.action, Action::Applied);
        assert_eq!(result.previous, None);
        assert_eq!(*writes.borrow(), vec!["vim".to_string()]);
    }

    #[test]
    fn matching_value_never_writes() {
        let (log, _tmp, _guard) = isolated_logger();
        let exec = MockExecutor::with_responses(vec![]);
        let setting = FakeSetting::with_value("false");
        let writes = setting.writes();
        let spec = SettingSpec::new("core.autocrlf", setting, "false", ValueKind::String);

        let result = Reconciler::new(&exec, &log, false).reconcile(&spec);

        assert_eq!(result.action, Action::Skipped);
        assert_eq!(result.previous.as_deref(), Some("false"));
        assert!(writes.borrow().is_empty());
    }

    #[test]
    fn second_reconcile_is_skipped() {
        let (log, _tmp, _guard) = isolated_logger();
        let exec = MockExecutor::with_responses(vec![]);
        let setting = FakeSetting::with_value("0");
        let writes = setting.writes();
        let spec = SettingSpec::new("flag", setting, "1", ValueKind::Boolean);
        let reconciler = Reconciler::new(&exec, &log, false);

        let first = reconciler.reconcile(&spec);
        let second = reconciler.reconcile(&spec);

        assert_eq!(first.action, Action::Applied);
        assert_eq!(first.previous.as_deref(), Some("0"));
        assert_eq!(second.action, Action::Skipped);
        assert_eq!(writes.borrow().len(), 1);
    }

    #[test]
    fn write_failure_is_reported() {
        let (log, _tmp, _guard) = isolated_logger();
        let exec = MockExecutor::with_responses(vec![]);
        let spec = SettingSpec::new(
            "broken",
            FakeSetting::absent().failing_writes(),
            "x",
            ValueKind::String,
        );

        let result = Reconciler::new(&exec, &log, false).reconcile(&spec);

        assert_eq!(result.action, Action::Failed);
        assert!(matches!(
            result.error,
            Some(ReconcileError::WriteFailed { .. })
        ));
    }

    #[test]
    fn read_failure_is_failed_without_write() {
        let (log, _tmp, _guard) = isolated_logger();
        let exec = MockExecutor::with_responses(vec![]);
        let setting = FakeSetting::unreadable();
        let writes = setting.writes();
        let spec = SettingSpec::new("repo", setting, "x", ValueKind::String);

        let result = Reconciler::new(&exec, &log, false).reconcile(&spec);

        assert_eq!(result.action, Action::Failed);
        assert!(matches!(
            result.error,
            Some(ReconcileError::ReadFailed { .. })
        ));
        assert!(writes.borrow().is_empty());
    }

    #[test]
    fn closed_gate_is_not_applicable_and_not_read() {
        let (log, _tmp, _guard) = isolated_logger();
        let exec = MockExecutor::with_responses(vec![]);
        let setting = FakeSetting::unreadable();
        let writes = setting.writes();
        let gate = VersionGate::new(
            PlatformVersion::windows_build(22621),
            PlatformVersion::windows_build(22000),
        );
        let spec = SettingSpec::new("clock seconds", setting, "1", ValueKind::Boolean).gated(gate);

        let result = Reconciler::new(&exec, &log, false).reconcile(&spec);

        assert_eq!(result.action, Action::NotApplicable);
        assert!(result.error.is_none(), "a closed gate is not an error");
        assert!(result.reason.unwrap().contains("22621"));
        assert!(writes.borrow().is_empty());
    }

    #[test]
    fn missing_program_is_precondition_failure() {
        let (log, _tmp, _guard) = isolated_logger();
        let exec = MockExecutor::with_responses(vec![]).with_which(false);
        let spec = SettingSpec::new(
            "user.name",
            FakeSetting::absent(),
            "Ada",
            ValueKind::String,
        )
        .requires("git");

        let result = Reconciler::new(&exec, &log, false).reconcile(&spec);

        assert_eq!(result.action, Action::NotApplicable);
        assert!(result.is_precondition_missing());
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let (log, _tmp, _guard) = isolated_logger();
        let exec = MockExecutor::with_responses(vec![]);
        let setting = FakeSetting::with_value("dd/MM/yyyy");
        let writes = setting.writes();
        let spec = SettingSpec::new("sShortDate", setting, "yyyy-MM-dd", ValueKind::String);

        let result = Reconciler::new(&exec, &log, true).reconcile(&spec);

        assert_eq!(result.action, Action::DryRun);
        assert_eq!(result.previous.as_deref(), Some("dd/MM/yyyy"));
        assert!(writes.borrow().is_empty());
    }

    #[test]
    fn result_serializes_action_and_error_text() {
        let result = ReconcileResult {
            error: Some(ReconcileError::PreconditionMissing {
                program: "git".to_string(),
            }),
            ..ReconcileResult::new("clone", Action::NotApplicable)
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["action"], "not-applicable");
        assert_eq!(json["error"], "required program 'git' not found on PATH");
        assert!(json.get("previous").is_none());
    }

    #[test]
    fn message_prefers_error_over_reason() {
        let result = ReconcileResult::not_applicable("x", "requires version >= 1.0.0");
        assert_eq!(result.message().as_deref(), Some("requires version >= 1.0.0"));
    }
}
