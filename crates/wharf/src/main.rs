//! Wharf CLI entry point.

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::{fmt, prelude::*};

use wharf::cli::Cli;

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let filter = cli.log_filter();
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli.execute()
}
