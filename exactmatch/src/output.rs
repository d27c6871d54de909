// exactmatch/src/output.rs
//! Result files and the run summary.
//!
//! File names and CSV headers are stable: downstream tooling reads
//! `length_histogram.csv` (`String Length,Count`) and `threshold_histogram.csv`
//! (`Threshold Size,Count`).

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use is_terminal::IsTerminal;
use log::info;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use exactmatch_core::report::{histogram_rows, to_json_lines};
use exactmatch_core::{LengthHistogram, RunStats};

pub const LENGTH_HISTOGRAM_FILE: &str = "length_histogram.csv";
pub const THRESHOLD_HISTOGRAM_FILE: &str = "threshold_histogram.csv";
pub const SIGNATURES_FILE: &str = "signatures_hist.json";
pub const FRAGMENTS_FILE: &str = "exact_matches_hex.json";

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>) {
    let mut stderr = io::stderr();
    let _ = if stderr.is_terminal() {
        writeln!(stderr, "{}", msg.as_ref().cyan())
    } else {
        writeln!(stderr, "{}", msg.as_ref())
    };
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>) {
    let mut stderr = io::stderr();
    let _ = if stderr.is_terminal() {
        writeln!(stderr, "{} {}", "Warning:".yellow().bold(), msg.as_ref())
    } else {
        writeln!(stderr, "Warning: {}", msg.as_ref())
    };
}

/// Renders the length histogram as CSV.
pub fn length_histogram_csv(histogram: &LengthHistogram) -> String {
    let mut out = String::from("String Length,Count\n");
    for row in histogram_rows(histogram) {
        out.push_str(&format!("{},{}\n", row.length, row.count));
    }
    out
}

/// Renders the cumulative threshold bins as CSV.
pub fn threshold_histogram_csv(histogram: &LengthHistogram) -> String {
    let mut out = String::from("Threshold Size,Count\n");
    for bin in histogram.threshold_bins() {
        out.push_str(&format!("{},{}\n", bin.label, bin.count));
    }
    out
}

fn write_file(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("Failed to write output file: {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Writes both histogram CSV files into `dir`.
pub fn write_histograms(dir: &Path, histogram: &LengthHistogram) -> Result<Vec<PathBuf>> {
    Ok(vec![
        write_file(dir, LENGTH_HISTOGRAM_FILE, &length_histogram_csv(histogram))?,
        write_file(dir, THRESHOLD_HISTOGRAM_FILE, &threshold_histogram_csv(histogram))?,
    ])
}

/// Writes `records` as JSON lines into `dir/name`.
pub fn write_json_lines<T: Serialize>(dir: &Path, name: &str, records: &[T]) -> Result<PathBuf> {
    let text = to_json_lines(records).with_context(|| format!("Failed to serialize records for {}", name))?;
    write_file(dir, name, &text)
}

fn percent(part: impl Into<u64>, whole: impl Into<u64>) -> String {
    let (part, whole) = (part.into(), whole.into());
    if whole == 0 {
        "-".to_string()
    } else {
        format!("{:.2}%", part as f64 * 100.0 / whole as f64)
    }
}

/// Everything the summary table shows.
pub struct SummaryInput<'a> {
    pub stats: &'a RunStats,
    pub minimal_fragment_length: usize,
    pub uncovered_rules: usize,
    pub elapsed: Duration,
}

/// Builds the run summary table.
pub fn summary_table(input: &SummaryInput<'_>) -> Table {
    let stats = input.stats;
    let signatures = stats.unique_signatures() as u64;
    let covered = (stats.content_with_fragments + stats.pattern_with_fragments) as u64;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![Cell::new("Metric"), Cell::new("Value"), Cell::new("Share")]);

    let rows: Vec<(&str, String, String)> = vec![
        ("Elapsed", format!("{:.3}s", input.elapsed.as_secs_f64()), String::new()),
        ("Minimal fragment length", input.minimal_fragment_length.to_string(), String::new()),
        ("Rules scanned", stats.rules_scanned.to_string(), String::new()),
        ("Rules without sid", stats.rules_without_id.to_string(), String::new()),
        (
            "Rules without exact match",
            input.uncovered_rules.to_string(),
            percent(input.uncovered_rules as u64, stats.rules_scanned as u64),
        ),
        ("Content signatures", stats.content_signatures.to_string(), String::new()),
        ("Pcre signatures", stats.pattern_signatures.to_string(), String::new()),
        ("Signatures kept", covered.to_string(), percent(covered, signatures)),
        (
            "Content signatures kept",
            stats.content_with_fragments.to_string(),
            percent(stats.content_with_fragments as u64, stats.content_signatures as u64),
        ),
        (
            "Pcre signatures kept",
            stats.pattern_with_fragments.to_string(),
            percent(stats.pattern_with_fragments as u64, stats.pattern_signatures as u64),
        ),
        ("Duplicate signatures", stats.duplicate_registrations.to_string(), String::new()),
        ("Discarded signatures", stats.discarded_signatures.to_string(), String::new()),
        ("Exact matches", stats.fragments_produced.to_string(), String::new()),
        (
            "Exact matches kept",
            stats.fragments_retained.to_string(),
            percent(stats.fragments_retained, stats.fragments_produced),
        ),
    ];
    for (metric, value, share) in rows {
        table.add_row(vec![Cell::new(metric), Cell::new(value), Cell::new(share)]);
    }
    table
}

/// Prints the summary table to `writer`.
pub fn print_summary<W: Write>(input: &SummaryInput<'_>, writer: &mut W) -> Result<()> {
    writeln!(writer, "{}", summary_table(input)).context("Failed to print run summary")?;
    Ok(())
}
