// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed configuration root, a fluent
// builder, and in-process fakes for the external capabilities so each
// integration test runs without touching the real system.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use devsetup_cli::config::Config;
use devsetup_cli::exec::{ExecResult, Executor};
use devsetup_cli::logging::{Log, Logger};
use devsetup_cli::platform::{Os, Platform};
use devsetup_cli::prompt::NonInteractivePrompt;
use devsetup_cli::reconcile::PlatformVersion;
use devsetup_cli::resources::registry::{RegistryValue, SettingsStore};
use devsetup_cli::tasks::Context;

/// Every configuration file the engine reads.
pub const CONFIG_FILES: [&str; 7] = [
    "tools.toml",
    "git-config.toml",
    "ssh.toml",
    "registry.toml",
    "environment.toml",
    "profile.toml",
    "repositories.toml",
];

/// Write an empty file for every configuration file into `root/conf`.
pub fn setup_minimal_root(root: &Path) {
    let conf = root.join("conf");
    std::fs::create_dir_all(&conf).expect("create conf dir");
    for file in CONFIG_FILES {
        std::fs::write(conf.join(file), "").expect("write config file");
    }
}

/// Windows 11 22H2 or a Linux 6.8 kernel.
pub fn platform(os: Os) -> Platform {
    match os {
        Os::Windows => Platform::new(os, PlatformVersion::windows_build(22621)),
        Os::Linux => Platform::new(os, PlatformVersion::new(6, 8, 0)),
    }
}

/// Executor that runs nothing; `which` answers from a fixed set.
#[derive(Debug, Default)]
pub struct OfflineExecutor {
    /// Programs reported as present on `PATH`.
    pub programs: Vec<String>,
    /// Command lines that were attempted.
    pub calls: Mutex<Vec<String>>,
}

impl Executor for OfflineExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        anyhow::bail!("{program} is not available in tests (exit {:?})", result.code)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{program} {}", args.join(" ")));
        }
        Ok(ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: false,
            code: Some(1),
        })
    }

    fn which(&self, program: &str) -> bool {
        self.programs.iter().any(|p| p == program)
    }
}

/// In-memory registry keyed by `path\name`.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    values: Mutex<HashMap<String, RegistryValue>>,
    writes: Mutex<usize>,
}

impl MemoryRegistry {
    /// Pre-populate a value.
    pub fn with(self, path: &str, name: &str, value: RegistryValue) -> Self {
        self.values
            .lock()
            .expect("registry lock")
            .insert(format!("{path}\\{name}"), value);
        self
    }

    /// Return a stored value.
    pub fn get(&self, path: &str, name: &str) -> Option<RegistryValue> {
        self.values
            .lock()
            .expect("registry lock")
            .get(&format!("{path}\\{name}"))
            .cloned()
    }

    /// Number of writes performed.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().expect("writes lock")
    }
}

impl SettingsStore for MemoryRegistry {
    fn read_value(&self, path: &str, name: &str) -> anyhow::Result<Option<RegistryValue>> {
        Ok(self.get(path, name))
    }

    fn write_value(&self, path: &str, name: &str, value: &RegistryValue) -> anyhow::Result<()> {
        *self.writes.lock().expect("writes lock") += 1;
        self.values
            .lock()
            .expect("registry lock")
            .insert(format!("{path}\\{name}"), value.clone());
        Ok(())
    }
}

/// An isolated configuration root and home directory.
///
/// Both directories are deleted when the context is dropped.
pub struct IntegrationTestContext {
    /// Configuration root containing `conf/`.
    pub root: tempfile::TempDir,
    /// Home directory used for `~` expansion.
    pub home: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a context with an empty but complete `conf/`.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create root dir");
        setup_minimal_root(root.path());
        let home = tempfile::tempdir().expect("create home dir");
        Self { root, home }
    }

    /// Path to the configuration root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Path to the home directory.
    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    /// Load configuration from the root.
    pub fn load_config(&self) -> Config {
        Config::load(self.root.path()).expect("load config")
    }

    /// Build a task context for `os` with the given capabilities.
    pub fn task_context(
        &self,
        os: Os,
        executor: Arc<dyn Executor>,
        store: Arc<dyn SettingsStore + Send + Sync>,
        dry_run: bool,
    ) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::new("test"));
        let ctx = Context {
            config: Arc::new(self.load_config()),
            platform: platform(os),
            log: Arc::clone(&log) as Arc<dyn Log>,
            dry_run,
            home: PathBuf::from(self.home.path()),
            executor,
            prompt: Arc::new(NonInteractivePrompt),
            store,
        };
        (ctx, log)
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context backed by an empty `conf/`.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `content` to `conf/<filename>`, overwriting the empty default.
    pub fn with_config_file(self, filename: &str, content: &str) -> Self {
        let path = self.ctx.root.path().join("conf").join(filename);
        std::fs::write(path, content).expect("write config file");
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}
