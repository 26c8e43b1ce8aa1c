use std::path::PathBuf;

use clap::Parser;

/// Start a previously created container
///
/// Defaults to detached mode (spec.md §6 "Defaults": `start` is detached).
#[derive(Parser, Debug)]
#[command(group(clap::ArgGroup::new("mode").args(["attach", "detach"])))]
pub struct Start {
    /// Block until the container's init process exits and mirror its exit code
    #[arg(short, long)]
    pub attach: bool,

    /// Return immediately after the container reaches the running state
    #[arg(short, long)]
    pub detach: bool,

    /// File to write the container's init pid to
    #[arg(short, long)]
    pub pid_file: Option<PathBuf>,

    /// Identifier of the container to start
    #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new(), required = true)]
    pub container_id: String,
}
