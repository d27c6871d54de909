// exactmatch/src/commands/extract.rs
//! The `extract` command: process a whole rule file and write the result files.

use anyhow::{Context, Result};
use chrono::Local;
use log::{info, warn};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use exactmatch_core::report::{fragment_records, latin1_view, signature_records};
use exactmatch_core::{Extractor, RunOutput};

use crate::cli::ExtractCommand;
use crate::commands::load_config;
use crate::output::{self, SummaryInput};

/// Reads a rule file as ISO-8859-1: every byte becomes the char of the same
/// value, so the decoders see exactly the bytes the file holds.
fn read_rules(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read rule file: {}", path.display()))?;
    Ok(latin1_view(&bytes))
}

/// Runs extraction over `cmd.rules` and writes the outputs into `cmd.out_dir`.
/// Returns the run output for callers that want to inspect it.
pub fn run_extract(cmd: &ExtractCommand, quiet: bool) -> Result<RunOutput> {
    let started = Instant::now();
    info!("Started parsing {} at {}.", cmd.rules.display(), Local::now().format("%Y-%m-%d %H:%M:%S"));

    let config = load_config(cmd.config.as_deref(), cmd.threshold, &cmd.disable_rule)?;
    let minimal_fragment_length = config.threshold.minimal_fragment_length;
    let extractor = Extractor::new(config).context("Failed to set up the extractor")?;

    let text = read_rules(&cmd.rules)?;
    let run = extractor.run(text.lines());

    let uncovered = run.uncovered_rules();
    if uncovered.is_empty() {
        info!("Every rule is represented by at least one exact match.");
    } else {
        let ids: Vec<String> = uncovered.iter().map(|id| id.to_string()).collect();
        warn!("{} rule(s) have no exact match: {}", uncovered.len(), ids.join(", "));
    }

    fs::create_dir_all(&cmd.out_dir)
        .with_context(|| format!("Failed to create output directory: {}", cmd.out_dir.display()))?;
    let mut written = output::write_histograms(&cmd.out_dir, &run.stats.histogram)?;
    if cmd.json {
        written.push(output::write_json_lines(
            &cmd.out_dir,
            output::SIGNATURES_FILE,
            &signature_records(&run.registry),
        )?);
        written.push(output::write_json_lines(
            &cmd.out_dir,
            output::FRAGMENTS_FILE,
            &fragment_records(&run.registry),
        )?);
    }

    if !quiet {
        for diagnostic in &run.diagnostics {
            output::warn_msg(diagnostic.to_string());
        }
        for error in &run.scan_errors {
            output::warn_msg(error.to_string());
        }
        let summary = SummaryInput {
            stats: &run.stats,
            minimal_fragment_length,
            uncovered_rules: uncovered.len(),
            elapsed: started.elapsed(),
        };
        output::print_summary(&summary, &mut io::stderr())?;
        for path in &written {
            output::info_msg(format!("Wrote {}", path.display()));
        }
    }

    info!("Finished parsing after {:.3}s.", started.elapsed().as_secs_f64());
    Ok(run)
}
