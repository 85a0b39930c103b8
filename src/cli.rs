//! Command-line interface definition.
use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the workstation setup tool.
#[derive(Parser, Debug)]
#[command(
    name = "devsetup",
    about = "Idempotent workstation setup: tools, git, SSH, registry and shell profile",
    version = crate::version()
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the directory containing conf/
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,

    /// Never prompt; take defaults and fail questions without one
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply every configured setting
    Install(InstallOpts),
    /// Report what install would change without changing anything
    Check(CheckOpts),
    /// Print a shell completion script
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Check(_) => "check",
            Self::Completions { .. } => "completions",
            Self::Version => "version",
        }
    }
}

/// Task selection shared by `install` and `check`.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip specific tasks
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific tasks
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

/// Options for the `check` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct CheckOpts {
    /// Task selection
    #[command(flatten)]
    pub tasks: InstallOpts,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_dry_run() {
        let cli = Cli::parse_from(["devsetup", "--dry-run", "install"]);
        assert!(cli.global.dry_run);
        assert!(matches!(cli.command, Command::Install(_)));
    }

    #[test]
    fn parse_install_dry_run_short() {
        let cli = Cli::parse_from(["devsetup", "-d", "install"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_install_skip_tasks() {
        let cli = Cli::parse_from(["devsetup", "install", "--skip", "tools,ssh"]);
        assert!(matches!(&cli.command, Command::Install(_)));
        if let Command::Install(opts) = cli.command {
            assert_eq!(opts.skip, vec!["tools", "ssh"]);
        }
    }

    #[test]
    fn parse_install_only_tasks() {
        let cli = Cli::parse_from(["devsetup", "install", "--only", "registry"]);
        assert!(matches!(&cli.command, Command::Install(_)));
        if let Command::Install(opts) = cli.command {
            assert_eq!(opts.only, vec!["registry"]);
        }
    }

    #[test]
    fn parse_check_json_with_selection() {
        let cli = Cli::parse_from(["devsetup", "check", "--json", "--only", "git"]);
        assert!(matches!(&cli.command, Command::Check(_)));
        if let Command::Check(opts) = cli.command {
            assert!(opts.json);
            assert_eq!(opts.tasks.only, vec!["git"]);
        }
    }

    #[test]
    fn parse_yes_after_subcommand() {
        let cli = Cli::parse_from(["devsetup", "install", "--yes"]);
        assert!(cli.global.yes);
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["devsetup", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Command::Completions {
                shell: clap_complete::Shell::Bash
            }
        ));
        assert_eq!(cli.command.name(), "completions");
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["devsetup", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["devsetup", "-v", "install"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::parse_from(["devsetup", "--root", "/tmp/setup", "install"]);
        assert_eq!(cli.global.root, Some(std::path::PathBuf::from("/tmp/setup")));
    }
}
