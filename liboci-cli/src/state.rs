use clap::Parser;

/// Print a container's state
#[derive(Parser, Debug)]
pub struct State {
    /// Identifier of the container to inspect
    #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new(), required = true)]
    pub container_id: String,
}
