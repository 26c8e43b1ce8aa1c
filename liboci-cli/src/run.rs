use std::path::PathBuf;

use clap::Parser;

use crate::RuntimeKind;

/// Create a container and immediately start it
///
/// Defaults to attached mode (spec.md §6 "Defaults": `run` is attached).
#[derive(Parser, Debug)]
#[command(group(clap::ArgGroup::new("mode").args(["attach", "detach"])))]
pub struct Run {
    /// Path to the bundle directory, containing config.json and the root filesystem
    #[arg(short, long, default_value = ".")]
    pub bundle: PathBuf,

    /// Execution backend: the container namespace/cgroup path, or the unimplemented VM stub
    #[arg(short, long, value_enum, default_value = "container")]
    pub runtime: RuntimeKind,

    /// File to write the container's init pid to
    #[arg(short, long)]
    pub pid_file: Option<PathBuf>,

    /// Block until the container's init process exits and mirror its exit code
    #[arg(short, long)]
    pub attach: bool,

    /// Return immediately after the container reaches the running state
    #[arg(short, long)]
    pub detach: bool,

    /// Delete the container after an attached run finishes. Requires attached mode.
    #[arg(long)]
    pub rm: bool,

    /// Name of the container instance to run
    #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new(), required = true)]
    pub container_id: String,
}
