use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use libcontainer::container::{Controller, RunOpts};
use liboci_cli::Run;

use super::{runtime_mode, write_pid_file};
use crate::logger::educational;

/// Returns the child's exit code when run attached, `None` when detached.
pub fn run(args: Run, state_dir: PathBuf) -> Result<Option<i32>> {
    if args.attach && args.detach {
        bail!("--attach and --detach are mutually exclusive");
    }
    if args.rm && args.detach {
        bail!("--rm requires attached mode");
    }
    // spec.md §6 "Defaults": run is attached unless --detach is given.
    let attach = !args.detach;

    educational(
        "'run' is 'create' followed by 'start': the bundle spec is validated and \
         metadata persisted, then an isolated process is cloned with the requested \
         namespaces before exec.",
    );

    let controller = Controller::new(state_dir);
    let id = args.container_id.clone();
    let code = controller
        .run(RunOpts {
            id: id.clone(),
            bundle: args.bundle,
            mode: runtime_mode(args.runtime),
            attach,
            rm: args.rm,
        })
        .with_context(|| format!("failed to run container {id}"))?;

    if !attach {
        if let Some(pid) = controller.pid(&id) {
            write_pid_file(args.pid_file.as_deref(), pid)?;
        }
    }

    Ok(code)
}
