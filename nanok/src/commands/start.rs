use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use libcontainer::container::Controller;
use liboci_cli::Start;

use super::write_pid_file;
use crate::logger::educational;

/// Returns the child's exit code when run attached, `None` when detached.
pub fn start(args: Start, state_dir: PathBuf) -> Result<Option<i32>> {
    if args.attach && args.detach {
        bail!("--attach and --detach are mutually exclusive");
    }
    // spec.md §6 "Defaults": start is detached unless --attach is given.
    let attach = args.attach;

    educational(
        "Container start clones an isolated process with the requested namespaces; \
         the parent waits for a one-byte readiness signal before recording the \
         container as running.",
    );

    let controller = Controller::new(state_dir);
    let code = controller
        .start(&args.container_id, attach)
        .with_context(|| format!("failed to start container {}", args.container_id))?;

    if !attach {
        if let Some(pid) = controller.pid(&args.container_id) {
            write_pid_file(args.pid_file.as_deref(), pid)?;
        }
    }

    Ok(code)
}
