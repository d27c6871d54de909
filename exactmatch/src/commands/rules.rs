// exactmatch/src/commands/rules.rs
//! The `rules` command: list the rewrite chain.

use anyhow::Result;
use std::io::Write;

use exactmatch_core::PatternExtractor;

use crate::cli::RulesCommand;
use crate::commands::load_config;

pub fn run_rules<W: Write>(cmd: &RulesCommand, writer: &mut W) -> Result<()> {
    let config = load_config(cmd.config.as_deref(), None, &[])?;
    let extractor = PatternExtractor::new(&config.pattern)?;
    for (idx, rule) in extractor.chain().rules().iter().enumerate() {
        writeln!(writer, "{:>2}  {:<24} {}", idx + 1, rule.name(), rule.pattern())?;
    }
    Ok(())
}
