//! Command implementations

mod classify;
mod config;
mod zones;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match &cli.command {
        Commands::Classify(args) => classify::execute(&cli, args, &output),
        Commands::Zones(args) => zones::execute(&cli, args, &output),
        Commands::Config => config::execute(&cli, &output),
    }
}
