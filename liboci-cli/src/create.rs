use std::path::PathBuf;

use clap::Parser;

use crate::RuntimeKind;

/// Create a container
#[derive(Parser, Debug)]
pub struct Create {
    /// Path to the bundle directory, containing config.json and the root filesystem
    #[arg(short, long, default_value = ".")]
    pub bundle: PathBuf,

    /// Execution backend: the container namespace/cgroup path, or the unimplemented VM stub
    #[arg(short, long, value_enum, default_value = "container")]
    pub runtime: RuntimeKind,

    /// Name of the container instance to create
    #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new(), required = true)]
    pub container_id: String,
}
