// exactmatch-core/src/lib.rs
//! # exactmatch Core Library
//!
//! `exactmatch-core` turns intrusion-detection rule signatures into exact-match
//! fragments: byte strings guaranteed to occur verbatim in any input the
//! signature matches. Such fragments can feed a multi-pattern search structure
//! as a pre-filter in front of full signature evaluation.
//!
//! The library performs no I/O. A run takes rule lines and a configuration and
//! returns a [`RunOutput`] holding the signature registry, the run statistics
//! and the diagnostics of every discarded signature.
//!
//! ## Modules
//!
//! * `content`: Decodes `content:"…"` text with `|hex|` spans into bytes.
//! * `pattern`: Extracts literal spans from `pcre:"…"` patterns through an
//!   ordered, declarative rewrite chain.
//! * `aggregator` / `histogram`: Thresholding, run counters and the length histogram.
//! * `registry`: Deduplicates signatures and tracks the rules referencing them.
//! * `scanner`: Finds signatures and the `sid` in a rule line.
//! * `pipeline`: Ties everything together in [`Extractor`].
//! * `report`: Serializable records for JSON and CSV output.
//! * `config`: Threshold and pattern settings, loadable from YAML.
//!
//! ## Usage Example
//!
//! ```rust
//! use exactmatch_core::{Extractor, ExtractorConfig, ThresholdConfig};
//!
//! let config = ExtractorConfig::new(ThresholdConfig::new(2));
//! let extractor = Extractor::new(config).expect("standard rules compile");
//!
//! let rules = [
//!     r#"alert tcp any any -> any 80 (content:"GET |2f|admin"; sid:1;)"#,
//!     r#"alert tcp any any -> any 80 (pcre:"/^login\s+user=/i"; sid:2;)"#,
//! ];
//! let output = extractor.run(rules);
//!
//! // "get /admin", "login" and "user="
//! assert_eq!(output.stats.fragments_retained, 3);
//! assert!(output.uncovered_rules().is_empty());
//! ```
//!
//! ## Error Handling
//!
//! Signature-local failures ([`ExtractError`]) discard one signature and are
//! reported as [`SignatureDiagnostic`]s; a run never aborts because of them.
//! Setup failures (bad configuration, a rewrite rule that does not compile)
//! are [`ExactmatchError`]s.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod aggregator;
pub mod config;
pub mod content;
pub mod errors;
pub mod histogram;
pub mod pattern;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod scanner;
pub mod signature;

/// Re-exports the configuration types and loaders.
pub use config::{merge_config, ConfigFile, ExtractorConfig, PatternConfig, ThresholdConfig};

/// Re-exports the error types.
pub use errors::{ExactmatchError, ExtractError, ScanError};

/// Re-exports the data model.
pub use signature::{
    ExactMatchFragment, Rule, RuleId, Signature, SignatureDiagnostic, SignatureId, SignatureKind, SignatureOutcome,
};

pub use aggregator::{apply_threshold, RunStats};
pub use content::{content_fragments, decode_content, encode_content};
pub use histogram::{LengthHistogram, ThresholdBin};
pub use pattern::rewrite::{RewriteAction, RewriteChain, RewriteRule};
pub use pattern::PatternExtractor;
pub use pipeline::{Extractor, RunOutput};
pub use registry::{FragmentEntry, SignatureRegistry};
pub use report::{FragmentRecord, HistogramRow, SignatureRecord};
