//! Idempotent workstation setup engine.
//!
//! Brings a developer machine to a declared state: tools installed through
//! the platform package manager, git identity and settings, an SSH key,
//! Windows registry values, user environment variables, shell profile lines
//! and cloned repositories.  Every setting is read first and written only
//! when it differs from its target, so repeated runs converge.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: parse and validate the TOML files in `conf/`
//! - **[`resources`]**: read/write adapters for each setting domain
//! - **[`reconcile`]**: the check-and-apply engine, version gates and batches
//! - **[`tasks`]**: named groups of specs built from the configuration
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `check`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod prompt;
pub mod reconcile;
pub mod resources;
pub mod tasks;

/// Build version: `DEVSETUP_VERSION` captured by `build.rs`, else
/// `dev-<crate version>`.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DEVSETUP_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")))
}
