use std::path::PathBuf;

use anyhow::{Context, Result};

use libcontainer::container::{Controller, CreateOpts};
use liboci_cli::Create;

use super::runtime_mode;
use crate::logger::educational;

pub fn create(args: Create, state_dir: PathBuf) -> Result<()> {
    educational(
        "Container creation validates the bundle spec and persists metadata; \
         the actual isolation happens during 'start' via clone() and namespaces.",
    );

    let controller = Controller::new(state_dir);
    controller
        .create(CreateOpts {
            id: args.container_id.clone(),
            bundle: args.bundle,
            mode: runtime_mode(args.runtime),
        })
        .with_context(|| format!("failed to create container {}", args.container_id))
}
