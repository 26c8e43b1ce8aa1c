use std::path::PathBuf;

use anyhow::{Context, Result};

use libcontainer::container::Controller;
use liboci_cli::Delete;

use crate::logger::educational;

pub fn delete(args: Delete, state_dir: PathBuf) -> Result<()> {
    educational(
        "Deleting a running container sends SIGTERM, waits briefly for a graceful \
         exit, escalates to SIGKILL if still alive, then tears down its cgroup \
         subtree and state record.",
    );

    Controller::new(state_dir)
        .delete(&args.container_id)
        .with_context(|| format!("failed to delete container {}", args.container_id))
}
