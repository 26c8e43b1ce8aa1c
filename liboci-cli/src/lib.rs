//! Command-line argument definitions for the nanok container runtime
//! (spec.md §6 "Command-line surface"). Parsing is all this crate does:
//! turning `std::env::args` into typed structs is an external collaborator
//! to the lifecycle engine, not part of it.

mod create;
mod delete;
mod exec;
mod run;
mod start;
mod state;

pub use create::Create;
pub use delete::Delete;
pub use exec::Exec;
pub use run::Run;
pub use start::Start;
pub use state::State;

use clap::{Parser, Subcommand, ValueEnum};

/// The `-r/--runtime` backend selector (spec.md §4.6, §8): `vm` parses fine
/// but every operation against it fails with `RuntimeUnsupported`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeKind {
    Container,
    Vm,
}

#[derive(Parser, Debug)]
#[command(name = "nanok", version, about = "A minimal OCI-compatible container runtime")]
pub struct Cli {
    /// Enable verbose (debug-level) logging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// Annotate log output with explanatory commentary
    #[arg(short = 'E', long, global = true)]
    pub educational: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Create(Create),
    Start(Start),
    Run(Run),
    /// Enter a running container's namespaces and run a command
    #[command(alias = "resume")]
    Exec(Exec),
    Delete(Delete),
    State(State),
}
