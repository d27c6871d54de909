// exactmatch/src/cli.rs
//! This file defines the command-line interface (CLI) for the exactmatch application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Threshold used when neither the command line nor a config file sets one.
pub const DEFAULT_MINIMAL_FRAGMENT_LENGTH: usize = 2;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "exactmatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Extract guaranteed exact-match fragments from Snort rule signatures",
    long_about = "exactmatch reads a Snort rule file, decodes every content signature and extracts the literal spans of every pcre signature that are guaranteed to appear in any matching input. The fragments, their length histogram and per-signature records are written out for use by a multi-pattern search pre-filter.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `exactmatch` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extracts exact matches from a rule file and writes the result files.
    #[command(about = "Extract exact matches from a rule file and write histograms and records.")]
    Extract(ExtractCommand),

    /// Prints the fragments of a single signature.
    #[command(about = "Print the exact-match fragments of a single content or pcre signature.")]
    Inspect(InspectCommand),

    /// Lists the rewrite rules in evaluation order.
    #[command(about = "List the pattern rewrite rules in evaluation order.")]
    Rules(RulesCommand),
}

/// Arguments for the `extract` command.
#[derive(Parser, Debug)]
pub struct ExtractCommand {
    /// The Snort rule file to process.
    #[arg(value_name = "RULES", help = "Path to the Snort rule file.")]
    pub rules: PathBuf,

    /// Directory for the output files.
    #[arg(long = "out-dir", short = 'o', value_name = "DIR", default_value = ".", help = "Directory where the output files are written.")]
    pub out_dir: PathBuf,

    /// Minimal fragment length (exclusive).
    #[arg(long, short = 't', value_name = "N", help = "Fragments of N bytes or fewer are counted but not kept.")]
    pub threshold: Option<usize>,

    /// Path to a custom extractor configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", help = "Path to a custom extractor configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Rewrite rules to disable (comma-separated).
    #[arg(long = "disable-rule", short = 'x', value_delimiter = ',', value_name = "NAME", help = "Disable these rewrite rules (comma-separated).")]
    pub disable_rule: Vec<String>,

    /// Also write the JSON-lines record files.
    #[arg(long, short = 'j', help = "Also write signatures_hist.json and exact_matches_hex.json.")]
    pub json: bool,
}

/// Arguments for the `inspect` command.
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("signature").required(true).args(["content", "pcre"])))]
pub struct InspectCommand {
    /// A content signature, e.g. `GET |2f|admin`.
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    pub content: Option<String>,

    /// A pcre signature, e.g. `/user=\w+/i`.
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    pub pcre: Option<String>,

    /// Minimal fragment length (exclusive).
    #[arg(long, short = 't', value_name = "N", help = "Mark fragments of N bytes or fewer as dropped.")]
    pub threshold: Option<usize>,

    /// Path to a custom extractor configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", help = "Path to a custom extractor configuration file (YAML).")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `rules` command.
#[derive(Parser, Debug)]
pub struct RulesCommand {
    /// Path to a custom extractor configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", help = "Show the chain as configured by this file.")]
    pub config: Option<PathBuf>,
}
