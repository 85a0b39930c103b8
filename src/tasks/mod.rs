//! Named groups of setting specs, one per setting domain.
//!
//! A task decides whether it applies and turns its slice of the
//! configuration into [`SettingSpec`]s, asking the user for anything the
//! configuration leaves open.  [`execute`] plans and reconciles one task at
//! a time, so a task sees the effects of the tasks before it (a tool is
//! installed before its configuration is read).
pub mod context;
pub mod environment;
pub mod git_config;
pub mod registry;
pub mod repositories;
pub mod shell;
pub mod ssh;
pub mod tools;

pub use context::Context;

use anyhow::Result;

use crate::error::ReconcileError;
use crate::reconcile::{ReconcileResult, Reconciler, SettingSpec};

/// A named unit of configuration work.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &'static str;

    /// Whether this task has anything to do on the current platform.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Build the specs this task wants reconciled.
    ///
    /// # Errors
    ///
    /// Returns an error if a target cannot be determined, such as when the
    /// user aborts a prompt or an existing value cannot be read.
    fn specs<'a>(&self, ctx: &'a Context) -> Result<Vec<SettingSpec<'a>>>;
}

/// The complete set of tasks, in execution order.
#[must_use]
pub fn all_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(tools::InstallTools),
        Box::new(git_config::ConfigureGit),
        Box::new(ssh::ConfigureSsh),
        Box::new(registry::ApplyRegistry),
        Box::new(environment::SetEnvironment),
        Box::new(shell::ConfigureShellProfile),
        Box::new(repositories::CloneRepositories),
    ]
}

/// What one task contributes to a run.
#[derive(Debug)]
pub enum TaskPlan<'a> {
    /// Specs to reconcile, in order.
    Specs(Vec<SettingSpec<'a>>),
    /// The task produced no specs (not applicable or failed).
    Outcome(ReconcileResult),
}

/// Ask `task` for its specs.
///
/// A task that does not apply, or that fails to build its specs, is
/// reported as a single outcome under the task's name.
pub fn plan_task<'a>(task: &dyn Task, ctx: &'a Context) -> TaskPlan<'a> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        return TaskPlan::Outcome(ReconcileResult::not_applicable(
            task.name(),
            "nothing configured for this platform",
        ));
    }

    ctx.log.stage(task.name());
    match task.specs(ctx) {
        Ok(specs) => {
            ctx.log.debug(&format!("{} setting(s)", specs.len()));
            TaskPlan::Specs(specs)
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            TaskPlan::Outcome(ReconcileResult {
                error: e.downcast_ref::<ReconcileError>().cloned(),
                ..ReconcileResult::failed(task.name(), format!("{e:#}"))
            })
        }
    }
}

/// Plan and reconcile `tasks` in order, recording every outcome in the
/// logger.
///
/// Each task is planned only after the previous task's specs have been
/// reconciled.  Once a critical spec halts, the rest of its task reports
/// `NotApplicable` and later tasks are neither planned nor attempted.
pub fn execute(tasks: &[Box<dyn Task>], ctx: &Context) -> Vec<ReconcileResult> {
    let reconciler = Reconciler::new(ctx.executor(), &*ctx.log, ctx.dry_run);
    let mut halted_by: Option<String> = None;
    let mut outcomes = Vec::new();

    for task in tasks {
        let results = if let Some(blocker) = halted_by.as_deref() {
            vec![ReconcileResult::not_applicable(
                task.name(),
                format!("not attempted: {blocker} failed"),
            )]
        } else {
            match plan_task(task.as_ref(), ctx) {
                TaskPlan::Specs(specs) => reconciler.run_continuing(&specs, &mut halted_by),
                TaskPlan::Outcome(outcome) => vec![outcome],
            }
        };

        for result in &results {
            ctx.log.record_result(result);
        }
        outcomes.extend(results);
    }

    outcomes
}

/// Shared helpers for task unit tests.
#[cfg(test)]
pub mod test_helpers {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::Context;
    use crate::config::Config;
    use crate::exec::Executor;
    use crate::logging::Logger;
    use crate::platform::{Os, Platform};
    use crate::prompt::{NonInteractivePrompt, Prompt};
    use crate::reconcile::PlatformVersion;
    use crate::resources::registry::SettingsStore;
    use crate::resources::test_helpers::{MemoryStore, MockExecutor};

    /// A [`Config`] with every list empty and root `/devsetup`.
    #[must_use]
    pub fn empty_config() -> Config {
        Config {
            root: PathBuf::from("/devsetup"),
            ..Config::default()
        }
    }

    /// Windows 11 23H2 on Windows, a 6.8 kernel elsewhere.
    #[must_use]
    pub const fn platform(os: Os) -> Platform {
        match os {
            Os::Windows => Platform::new(os, PlatformVersion::windows_build(22631)),
            Os::Linux => Platform::new(os, PlatformVersion::new(6, 8, 0)),
        }
    }

    /// Build a [`Context`] with home `/home/test` from explicit capabilities.
    pub fn make_context(
        config: Config,
        os: Os,
        executor: Arc<dyn Executor>,
        prompt: Arc<dyn Prompt>,
        store: Arc<dyn SettingsStore + Send + Sync>,
    ) -> Context {
        Context {
            config: Arc::new(config),
            platform: platform(os),
            log: Arc::new(Logger::new("test")),
            dry_run: false,
            home: PathBuf::from("/home/test"),
            executor,
            prompt,
            store,
        }
    }

    fn default_context(config: Config, os: Os) -> Context {
        make_context(
            config,
            os,
            Arc::new(MockExecutor::with_responses(vec![])),
            Arc::new(NonInteractivePrompt),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Linux context whose executor reports every program as missing.
    #[must_use]
    pub fn linux_context(config: Config) -> Context {
        default_context(config, Os::Linux)
    }

    /// Windows context whose executor reports every program as missing.
    #[must_use]
    pub fn windows_context(config: Config) -> Context {
        default_context(config, Os::Windows)
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::Config;
    use crate::config::tools::Tool;
    use crate::exec::{ExecResult, Executor};
    use crate::logging::Log;
    use crate::platform::Os;
    use crate::prompt::ScriptedPrompt;
    use crate::reconcile::{Action, ValueKind};
    use crate::resources::test_helpers::{FakeSetting, MemoryStore, MockExecutor};
    use test_helpers::{empty_config, linux_context, make_context};

    /// A task with canned behaviour.
    struct MockTask {
        name: &'static str,
        should_run: bool,
        fail: bool,
    }

    impl Task for MockTask {
        fn name(&self) -> &'static str {
            self.name
        }

        fn should_run(&self, _ctx: &Context) -> bool {
            self.should_run
        }

        fn specs<'a>(&self, _ctx: &'a Context) -> Result<Vec<SettingSpec<'a>>> {
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(vec![SettingSpec::new(
                format!("{}:value", self.name),
                FakeSetting::absent(),
                "on",
                ValueKind::String,
            )])
        }
    }

    fn task(name: &'static str, should_run: bool, fail: bool) -> Box<dyn Task> {
        Box::new(MockTask {
            name,
            should_run,
            fail,
        })
    }

    #[test]
    fn all_tasks_have_unique_names() {
        let tasks = all_tasks();
        let names: Vec<&str> = tasks.iter().map(|t| t.name()).collect();
        let unique: std::collections::HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
    }

    #[test]
    fn plan_task_reports_inapplicable_and_failed_tasks() {
        let ctx = linux_context(empty_config());

        let TaskPlan::Outcome(off) = plan_task(task("off", false, false).as_ref(), &ctx) else {
            panic!("expected an outcome for an inapplicable task");
        };
        assert_eq!(off.action, Action::NotApplicable);

        let TaskPlan::Outcome(broken) = plan_task(task("broken", true, true).as_ref(), &ctx)
        else {
            panic!("expected an outcome for a failing task");
        };
        assert_eq!(broken.action, Action::Failed);
        assert_eq!(broken.message().as_deref(), Some("boom"));

        let TaskPlan::Specs(specs) = plan_task(task("on", true, false).as_ref(), &ctx) else {
            panic!("expected specs");
        };
        assert_eq!(specs[0].name, "on:value");
    }

    #[test]
    fn aborted_prompt_fails_only_the_asking_task() {
        let executor = Arc::new(
            MockExecutor::with_responses(vec![(false, String::new())]).with_which(true),
        );
        let ctx = make_context(
            empty_config(),
            Os::Linux,
            executor,
            Arc::new(ScriptedPrompt::new(&[])),
            Arc::new(MemoryStore::new()),
        );
        let tasks = vec![
            Box::new(git_config::ConfigureGit) as Box<dyn Task>,
            task("after", true, false),
        ];

        let results = execute(&tasks, &ctx);

        assert_eq!(results[0].name, "Configure git");
        assert!(matches!(
            results[0].error,
            Some(ReconcileError::UserAborted { .. })
        ));
        assert_eq!(results[1].name, "after:value");
        assert_eq!(results[1].action, Action::Applied);
    }

    /// An Arch machine with pacman but no git until `pacman -S git` runs.
    ///
    /// `git config` reads and writes go to an in-memory global config.
    #[derive(Debug, Default)]
    struct FreshMachine {
        git_installed: AtomicBool,
        git_config: Mutex<HashMap<String, String>>,
        calls: Mutex<Vec<String>>,
    }

    impl FreshMachine {
        fn respond(&self, program: &str, args: &[&str]) -> ExecResult {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{program} {}", args.join(" ")));
            let installed = self.git_installed.load(Ordering::SeqCst);
            let (success, stdout) = match (program, args) {
                ("sudo", [.., "git"]) => {
                    self.git_installed.store(true, Ordering::SeqCst);
                    (true, String::new())
                }
                ("pacman", ["-Q", "git"]) => (installed, String::new()),
                ("git", ["config", "--global", "--get", key]) if installed => {
                    let config = self.git_config.lock().unwrap();
                    config
                        .get(*key)
                        .map_or((false, String::new()), |v| (true, format!("{v}\n")))
                }
                ("git", ["config", "--global", key, value]) if installed => {
                    self.git_config
                        .lock()
                        .unwrap()
                        .insert((*key).to_string(), (*value).to_string());
                    (true, String::new())
                }
                _ => (false, String::new()),
            };
            ExecResult {
                stdout,
                stderr: String::new(),
                success,
                code: Some(i32::from(!success)),
            }
        }
    }

    impl Executor for FreshMachine {
        fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
            let result = self.respond(program, args);
            if !result.success {
                anyhow::bail!("{program} failed");
            }
            Ok(result)
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
            Ok(self.respond(program, args))
        }

        fn which(&self, program: &str) -> bool {
            program == "pacman" || (program == "git" && self.git_installed.load(Ordering::SeqCst))
        }
    }

    #[test]
    fn identity_is_set_after_git_is_installed_in_the_same_run() {
        let machine = Arc::new(FreshMachine::default());
        let prompt = Arc::new(ScriptedPrompt::new(&["Ada", "ada@example.com"]));
        let config = Config {
            tools: vec![Tool {
                name: "git".into(),
                command: Some("git".into()),
                pacman: Some("git".into()),
                critical: true,
                ..Tool::default()
            }],
            ..empty_config()
        };
        let ctx = make_context(
            config,
            Os::Linux,
            Arc::clone(&machine) as _,
            Arc::clone(&prompt) as _,
            Arc::new(MemoryStore::new()),
        );

        let results = execute(&all_tasks(), &ctx);

        let action = |name: &str| {
            results
                .iter()
                .find(|r| r.name == name)
                .map(|r| r.action)
                .unwrap_or_else(|| panic!("no result for {name}"))
        };
        assert_eq!(action("tool:git"), Action::Applied);
        assert_eq!(action("git:user.name"), Action::Applied);
        assert_eq!(action("git:user.email"), Action::Applied);
        assert_eq!(prompt.asked(), vec!["Git user name", "Git user email"]);
        let config = machine.git_config.lock().unwrap();
        assert_eq!(config.get("user.name").map(String::as_str), Some("Ada"));
        assert_eq!(
            config.get("user.email").map(String::as_str),
            Some("ada@example.com")
        );
    }

    #[test]
    fn critical_halt_stops_later_tasks() {
        let machine = Arc::new(FreshMachine::default());
        let prompt = Arc::new(ScriptedPrompt::new(&[]));
        let config = Config {
            tools: vec![Tool {
                name: "git".into(),
                command: Some("git".into()),
                winget: Some("Git.Git".into()),
                critical: true,
                ..Tool::default()
            }],
            ..empty_config()
        };
        // Windows: winget is missing, so the critical tool cannot be installed.
        let ctx = make_context(
            config,
            Os::Windows,
            Arc::clone(&machine) as _,
            Arc::clone(&prompt) as _,
            Arc::new(MemoryStore::new()),
        );

        let results = execute(&all_tasks(), &ctx);

        assert!(results[0].is_precondition_missing());
        assert_eq!(results.len(), all_tasks().len());
        assert!(results[1..].iter().all(|r| {
            r.action == Action::NotApplicable
                && r.reason.as_deref() == Some("not attempted: tool:git failed")
        }));
        assert!(prompt.asked().is_empty());
        assert!(machine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn execute_records_every_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let profile = dir.path().join(".profile");
        let mut ctx = linux_context(Config {
            environment: vec![("EDITOR".into(), "nvim".into())],
            ..empty_config()
        });
        ctx.home = dir.path().to_path_buf();
        let logger = Arc::new(crate::logging::Logger::new("test"));
        ctx.log = Arc::clone(&logger) as Arc<dyn Log>;

        let results = execute(&[Box::new(environment::SetEnvironment) as Box<dyn Task>], &ctx);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].action, Action::Applied);
        assert!(
            std::fs::read_to_string(&profile)
                .unwrap()
                .contains("export EDITOR=\"nvim\"")
        );
        assert_eq!(logger.entries().len(), 1);

        let again = execute(&[Box::new(environment::SetEnvironment) as Box<dyn Task>], &ctx);
        assert_eq!(again[0].action, Action::Skipped);
    }

    #[test]
    fn dry_run_execute_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = linux_context(Config {
            environment: vec![("EDITOR".into(), "nvim".into())],
            ..empty_config()
        });
        ctx.home = dir.path().to_path_buf();
        ctx.dry_run = true;

        let results = execute(&[Box::new(environment::SetEnvironment) as Box<dyn Task>], &ctx);

        assert_eq!(results[0].action, Action::DryRun);
        assert!(!dir.path().join(".profile").exists());
    }
}
