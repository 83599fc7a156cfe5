//! Project Summary Generator CLI.
//!
//! Reads a project table (spreadsheet, CSV or tab-delimited text) and writes
//! plain-language summary documents, one per project plus a combined file.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
