//! Process execution behind an injectable [`Executor`] trait.
use anyhow::{Context, Result, bail};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code, if the process was not terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over running external programs.
///
/// Adapters for git, package managers and `ssh-keygen` take a
/// `&dyn Executor` so unit tests can script responses without spawning
/// processes.  The production implementation is [`SystemExecutor`].
pub trait Executor: std::fmt::Debug {
    /// Run a command and return its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command, allowing failure (returns result without bailing).
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be started.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        if !result.success {
            bail!(
                "{program} failed (exit {}): {}",
                result.code.unwrap_or(-1),
                result.stderr.trim()
            );
        }
        Ok(result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut command = Command::new(program);
        if let Some(path) = search_path() {
            command.env("PATH", path);
        }
        let output = command
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> bool {
        let cwd = std::env::current_dir().unwrap_or_default();
        which::which_in(program, search_path(), cwd).is_ok()
    }
}

/// The `PATH` used to find and start programs.
///
/// On Windows the machine and user `Path` registry values are read on every
/// call and placed ahead of the inherited `PATH`, so a program installed
/// earlier in the run (by winget, for example) is found without restarting.
fn search_path() -> Option<OsString> {
    merge_paths(&registry_path(), std::env::var_os("PATH").as_deref())
}

/// Machine then user `Path` values, with `%VAR%` references expanded.
#[cfg(windows)]
fn registry_path() -> Vec<String> {
    use winreg::RegKey;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

    [
        (
            HKEY_LOCAL_MACHINE,
            r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment",
        ),
        (HKEY_CURRENT_USER, "Environment"),
    ]
    .into_iter()
    .filter_map(|(hive, key)| {
        RegKey::predef(hive)
            .open_subkey(key)
            .ok()?
            .get_value::<String, _>("Path")
            .ok()
    })
    .map(|value| expand_percent_vars(&value, |name| std::env::var(name).ok()))
    .collect()
}

#[cfg(not(windows))]
const fn registry_path() -> Vec<String> {
    Vec::new()
}

/// Join `fresh` entries and then `inherited` ones, dropping duplicates and
/// empty entries.
fn merge_paths(fresh: &[String], inherited: Option<&OsStr>) -> Option<OsString> {
    let mut seen: Vec<PathBuf> = Vec::new();
    let entries = fresh
        .iter()
        .flat_map(std::env::split_paths)
        .chain(inherited.into_iter().flat_map(std::env::split_paths));
    for entry in entries {
        if !entry.as_os_str().is_empty() && !seen.contains(&entry) {
            seen.push(entry);
        }
    }
    if seen.is_empty() {
        return None;
    }
    std::env::join_paths(seen).ok()
}

/// Replace `%NAME%` references with `lookup(NAME)`; unknown names are kept.
#[cfg(any(windows, test))]
fn expand_percent_vars(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some((head, tail)) = rest.split_once('%') {
        out.push_str(head);
        match tail.split_once('%') {
            Some((name, after)) if !name.is_empty() && !name.contains(';') => {
                match lookup(name) {
                    Some(expanded) => out.push_str(&expanded),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = after;
            }
            _ => {
                out.push('%');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
