//! nanok: a minimal OCI-compatible Linux container runtime.
//!
//! The binary's job is argument dispatch, logging setup, and state-directory
//! resolution; all lifecycle logic lives in `libcontainer`.
mod commands;
mod logger;
mod rootpath;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use liboci_cli::Command as CoreCommand;

#[derive(Parser, Debug)]
#[command(name = "nanok", version, about = "A minimal OCI-compatible container runtime")]
pub struct Cli {
    /// Enable verbose (debug-level) logging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// Annotate log output with explanatory commentary
    #[arg(short = 'E', long, global = true)]
    pub educational: bool,

    /// Override the state directory for this invocation
    #[arg(long, global = true)]
    pub state_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(flatten)]
    Core(CoreCommand),
    /// Generate a shell completion script
    Completion(commands::completion::Completion),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = logger::init(cli.verbose) {
        eprintln!("log init failed: {e:?}");
    }
    if cli.educational {
        std::env::set_var("NK_LOG_EDUCATIONAL", "1");
    }

    log::debug!(
        "started by uid {} with {:?}",
        nix::unistd::geteuid(),
        std::env::args_os()
    );

    if let Command::Completion(args) = cli.command {
        commands::completion::completion(args)?;
        return Ok(ExitCode::SUCCESS);
    }

    let state_dir = rootpath::determine(cli.state_dir)?;

    let code = match cli.command {
        Command::Core(CoreCommand::Create(args)) => {
            commands::create::create(args, state_dir)?;
            0
        }
        Command::Core(CoreCommand::Start(args)) => {
            commands::start::start(args, state_dir)?.unwrap_or(0)
        }
        Command::Core(CoreCommand::Run(args)) => {
            commands::run::run(args, state_dir)?.unwrap_or(0)
        }
        Command::Core(CoreCommand::Exec(args)) => commands::exec::exec(args, state_dir)?,
        Command::Core(CoreCommand::Delete(args)) => {
            commands::delete::delete(args, state_dir)?;
            0
        }
        Command::Core(CoreCommand::State(args)) => commands::state::state(args, state_dir)?,
        Command::Completion(_) => unreachable!("handled above"),
    };

    Ok(ExitCode::from(code as u8))
}
