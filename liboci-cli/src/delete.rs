use clap::Parser;

/// Delete a container's state and tear down its resources
#[derive(Parser, Debug)]
pub struct Delete {
    /// Identifier of the container to delete
    #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new(), required = true)]
    pub container_id: String,
}
