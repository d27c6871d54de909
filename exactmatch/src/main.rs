// exactmatch/src/main.rs
//! exactmatch entry point.
//!
//! Parses the command line, sets up logging and dispatches to the commands.

use anyhow::Result;
use clap::Parser;
use std::io;

use exactmatch::cli::{Cli, Commands};
use exactmatch::commands::{extract, inspect, rules};
use exactmatch::logger;

fn main() -> Result<()> {
    let args = Cli::parse();
    logger::init_logger(logger::level_from_flags(args.quiet, args.debug));

    match &args.command {
        Commands::Extract(cmd) => {
            extract::run_extract(cmd, args.quiet)?;
        }
        Commands::Inspect(cmd) => inspect::run_inspect(cmd, &mut io::stdout().lock())?,
        Commands::Rules(cmd) => rules::run_rules(cmd, &mut io::stdout().lock())?,
    }
    Ok(())
}
