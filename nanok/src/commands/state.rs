use std::path::PathBuf;

use anyhow::Result;

use libcontainer::container::Controller;
use liboci_cli::State;

/// Prints the container's state name and returns the process exit code
/// (spec.md §4.6, §6: a missing record prints `unknown` with a non-zero
/// exit).
pub fn state(args: State, state_dir: PathBuf) -> Result<i32> {
    let controller = Controller::new(state_dir);
    match controller.state(&args.container_id) {
        Some(state) => {
            println!("{}", state_name(state));
            Ok(0)
        }
        None => {
            println!("unknown");
            Ok(1)
        }
    }
}

fn state_name(state: libcontainer::container::state::ContainerState) -> &'static str {
    use libcontainer::container::state::ContainerState::*;
    match state {
        Created => "created",
        Running => "running",
        Stopped => "stopped",
        Paused => "paused",
    }
}
