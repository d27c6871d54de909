// exactmatch-core/src/pipeline.rs
//! The extraction pipeline.
//!
//! `Extractor::run` is a pure function of its input lines and configuration:
//! scan each line, register every signature, process new signatures once,
//! threshold the fragments and hand back everything in a `RunOutput`.
//!
//! License: MIT OR APACHE 2.0

use log::{debug, info, warn};
use std::collections::HashSet;

use crate::aggregator::{apply_threshold, RunStats};
use crate::config::{ExtractorConfig, ThresholdConfig};
use crate::content::content_fragments;
use crate::errors::{ExactmatchError, ExtractError, ScanError};
use crate::pattern::PatternExtractor;
use crate::registry::SignatureRegistry;
use crate::scanner::scan_line;
use crate::signature::{Rule, RuleId, SignatureDiagnostic, SignatureKind, SignatureOutcome};

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub registry: SignatureRegistry,
    pub stats: RunStats,
    pub diagnostics: Vec<SignatureDiagnostic>,
    pub scan_errors: Vec<ScanError>,
    /// Rules in scan order.
    pub rules: Vec<Rule>,
}

impl RunOutput {
    /// Rule ids, in scan order, that no retained fragment represents.
    pub fn uncovered_rules(&self) -> Vec<RuleId> {
        let covered: HashSet<RuleId> = self
            .registry
            .iter()
            .filter(|sig| sig.has_fragments())
            .flat_map(|sig| sig.referencing_rules.iter().copied())
            .collect();

        let mut seen = HashSet::new();
        self.rules
            .iter()
            .map(|rule| rule.id)
            .filter(|id| !covered.contains(id) && seen.insert(*id))
            .collect()
    }
}

/// A configured extraction engine. The rewrite chain is compiled once here and
/// reused for every run.
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractorConfig,
    patterns: PatternExtractor,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Result<Self, ExactmatchError> {
        let patterns = PatternExtractor::new(&config.pattern)?;
        Ok(Self { config, patterns })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn threshold(&self) -> &ThresholdConfig {
        &self.config.threshold
    }

    pub fn patterns(&self) -> &PatternExtractor {
        &self.patterns
    }

    /// All fragments of one signature, before thresholding.
    ///
    /// Content text is ASCII lower-cased before decoding; pattern fragments
    /// are case folded by the extractor itself.
    pub fn extract_signature(&self, kind: SignatureKind, text: &str) -> Result<Vec<Vec<u8>>, ExtractError> {
        match kind {
            SignatureKind::Content => content_fragments(&text.to_ascii_lowercase()),
            SignatureKind::Pattern => self.patterns.extract(text),
        }
    }

    /// Runs the whole pipeline over `lines`.
    pub fn run<I, S>(&self, lines: I) -> RunOutput
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = SignatureRegistry::new();
        let mut stats = RunStats::new();
        let mut diagnostics = Vec::new();
        let mut scan_errors = Vec::new();
        let mut rules = Vec::new();

        info!(
            "Starting extraction run (minimal fragment length {}).",
            self.config.threshold.minimal_fragment_length
        );

        for (idx, line) in lines.into_iter().enumerate() {
            let scanned = match scan_line(idx + 1, line.as_ref()) {
                Ok(Some(scanned)) => scanned,
                Ok(None) => continue,
                Err(e) => {
                    warn!("{}", e);
                    stats.rules_without_id += 1;
                    scan_errors.push(e);
                    continue;
                }
            };
            stats.rules_scanned += 1;

            for signature in scanned.signatures {
                let (is_new, id) = registry.register(&signature.text, signature.kind, scanned.rule.id);
                if !is_new {
                    stats.duplicate_registrations += 1;
                    continue;
                }
                stats.record_signature(signature.kind);

                match self.extract_signature(signature.kind, &signature.text) {
                    Ok(fragments) => {
                        let produced = fragments.len();
                        let retained = apply_threshold(fragments, id, &self.config.threshold, &mut stats);
                        debug!(
                            "{} signature #{} produced {} fragment(s), kept {}.",
                            signature.kind,
                            id.0,
                            produced,
                            retained.len()
                        );
                        if !retained.is_empty() {
                            stats.record_covered_signature(signature.kind);
                        }
                        registry.record_outcome(id, SignatureOutcome::Extracted { produced }, retained);
                    }
                    Err(error) => {
                        let diagnostic = SignatureDiagnostic {
                            signature_text: signature.text.clone(),
                            kind: signature.kind,
                            rule_id: scanned.rule.id,
                            error: error.clone(),
                        };
                        warn!("{}", diagnostic);
                        stats.discarded_signatures += 1;
                        diagnostics.push(diagnostic);
                        registry.record_outcome(id, SignatureOutcome::Discarded(error), Vec::new());
                    }
                }
            }
            rules.push(scanned.rule);
        }

        info!(
            "Extraction finished: {} rule(s), {} unique signature(s), {} of {} fragment(s) retained.",
            stats.rules_scanned,
            stats.unique_signatures(),
            stats.fragments_retained,
            stats.fragments_produced
        );

        RunOutput {
            registry,
            stats,
            diagnostics,
            scan_errors,
            rules,
        }
    }
}
