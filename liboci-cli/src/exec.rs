use clap::Parser;

/// Enter the namespaces of a running container and run a command
///
/// Also reachable via the deprecated `resume` alias. With no `--exec`, an
/// interactive shell is launched instead (spec.md §4.6 `exec`).
#[derive(Parser, Debug)]
pub struct Exec {
    /// Command line to run inside the container's namespaces
    #[arg(short = 'x', long = "exec")]
    pub exec: Option<String>,

    /// Identifier of the running container
    #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new(), required = true)]
    pub container_id: String,
}
