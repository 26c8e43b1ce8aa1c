//! Thin command handlers: each wires a `liboci-cli` argument struct to a
//! `libcontainer::container::Controller` operation and renders its result.

pub mod completion;
pub mod create;
pub mod delete;
pub mod exec;
pub mod run;
pub mod start;
pub mod state;

use std::path::Path;

use libcontainer::container::Mode;
use liboci_cli::RuntimeKind;

fn runtime_mode(kind: RuntimeKind) -> Mode {
    match kind {
        RuntimeKind::Container => Mode::Container,
        RuntimeKind::Vm => Mode::Vm,
    }
}

/// Writes the decimal pid to the requested pid file, if any (spec.md §6
/// `--pid-file`).
fn write_pid_file(pid_file: Option<&Path>, pid: i32) -> anyhow::Result<()> {
    if let Some(path) = pid_file {
        libcontainer::utils::write_file(path, format!("{pid}\n"))?;
    }
    Ok(())
}
