use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};

use crate::Cli;

/// Generates a shell completion script for the `nanok` binary (SPEC_FULL.md
/// §4 "supplemented features").
#[derive(Debug, Parser)]
pub struct Completion {
    #[arg(long = "shell", short = 's', value_enum)]
    pub shell: Shell,
}

pub fn completion(args: Completion) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
