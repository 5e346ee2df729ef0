//! SmartLinks CLI — resolve loose links across a generated site.
//!
//! Reads a corpus manifest, points every relative link at the document it
//! most likely means, and writes the result back.

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
