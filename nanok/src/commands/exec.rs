use std::path::PathBuf;

use anyhow::{Context, Result};

use libcontainer::container::Controller;
use liboci_cli::Exec;

/// Returns the exit code to propagate to the process (spec.md §6 "Exit
/// codes"). The command line, if any, is handed to `Controller::exec`
/// verbatim: it runs through a login shell (`/bin/sh -lc <command>`), so it
/// is not split into argv tokens here.
pub fn exec(args: Exec, state_dir: PathBuf) -> Result<i32> {
    Controller::new(state_dir)
        .exec(&args.container_id, args.exec)
        .with_context(|| format!("failed to exec into container {}", args.container_id))
}
