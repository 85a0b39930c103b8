//! SSH key generation and `~/.ssh/config` host entries.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{Context, Task};
use crate::reconcile::{SettingSpec, ValueKind};
use crate::resources::file_line::{FileLineSetting, PRESENT};
use crate::resources::ssh_key::{KeyAlgorithm, SshKeySetting};

/// Generate an SSH key and point configured hosts at it.
#[derive(Debug)]
pub struct ConfigureSsh;

impl Task for ConfigureSsh {
    fn name(&self) -> &'static str {
        "Configure SSH"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.ssh.is_empty()
    }

    fn specs<'a>(&self, ctx: &'a Context) -> Result<Vec<SettingSpec<'a>>> {
        let ssh = &ctx.config.ssh;
        let ssh_dir = ctx.home.join(".ssh");

        let (algorithm, path) = match ssh.key.as_deref() {
            Some(key) => (ssh.algorithm.unwrap_or_default(), ctx.expand(key)),
            None => match existing_key(&ssh_dir) {
                Some(found) => found,
                None => {
                    let algorithm = match ssh.algorithm {
                        Some(algorithm) => algorithm,
                        None => choose_algorithm(ctx)?,
                    };
                    (algorithm, ssh_dir.join(algorithm.file_name()))
                }
            },
        };

        let comment = ssh
            .comment
            .clone()
            .or_else(|| ctx.config.git.identity.email.clone())
            .unwrap_or_else(default_comment);

        let mut specs = vec![
            SettingSpec::new(
                "ssh:key",
                SshKeySetting::new(path.clone(), algorithm, comment, ctx.executor()),
                PRESENT,
                ValueKind::String,
            )
            .requires("ssh-keygen"),
        ];

        let config_file = ssh_dir.join("config");
        for host in &ssh.hosts {
            specs.push(SettingSpec::new(
                format!("ssh:host:{host}"),
                FileLineSetting::new(&config_file, host_block(host, &path)),
                PRESENT,
                ValueKind::String,
            ));
        }

        Ok(specs)
    }
}

/// The first default-named key already present in `ssh_dir`.
fn existing_key(ssh_dir: &Path) -> Option<(KeyAlgorithm, PathBuf)> {
    KeyAlgorithm::ALL
        .into_iter()
        .map(|algorithm| (algorithm, ssh_dir.join(algorithm.file_name())))
        .find(|(_, path)| path.exists())
}

fn choose_algorithm(ctx: &Context) -> Result<KeyAlgorithm> {
    if ctx.dry_run {
        ctx.log.dry_run("would ask: SSH key type");
        return Ok(KeyAlgorithm::default());
    }
    let options = KeyAlgorithm::ALL.map(KeyAlgorithm::as_str);
    let index = ctx.prompt.choose("SSH key type", &options, 0)?;
    Ok(KeyAlgorithm::ALL.get(index).copied().unwrap_or_default())
}

fn default_comment() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "user".to_string());
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string());
    format!("{user}@{host}")
}

/// `~/.ssh/config` block routing `host` to `key`.
fn host_block(host: &str, key: &Path) -> String {
    format!(
        "Host {host}\n    IdentityFile {}\n    IdentitiesOnly yes",
        key.display()
    )
}
