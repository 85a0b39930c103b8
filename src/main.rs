//! `devsetup` command-line entry point.

use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory as _, Parser as _};

use devsetup_cli::cli::{Cli, Command};
use devsetup_cli::commands;
use devsetup_cli::logging::{self, Logger};

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match &args.command {
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut std::io::stdout());
            return Ok(());
        }
        Command::Version => {
            println!("devsetup {}", devsetup_cli::version());
            return Ok(());
        }
        Command::Install(_) | Command::Check(_) => {}
    }

    let json = matches!(&args.command, Command::Check(opts) if opts.json);
    logging::init_subscriber(args.verbose, json, args.command.name());
    let log = Arc::new(Logger::new(args.command.name()));

    match &args.command {
        Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        Command::Check(opts) => commands::check::run(&args.global, opts, &log),
        Command::Completions { .. } | Command::Version => Ok(()),
    }
}
