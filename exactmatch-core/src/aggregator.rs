// exactmatch-core/src/aggregator.rs
//! Run statistics and the retention threshold.
//!
//! `RunStats` is created when a run starts and handed back when it ends; no
//! counter lives outside it.

use log::trace;
use serde::Serialize;

use crate::config::ThresholdConfig;
use crate::histogram::LengthHistogram;
use crate::signature::{ExactMatchFragment, SignatureId, SignatureKind};

/// Counters of a single extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub rules_scanned: usize,
    pub rules_without_id: usize,
    pub content_signatures: usize,
    pub pattern_signatures: usize,
    /// Content signatures with at least one retained fragment.
    pub content_with_fragments: usize,
    /// Pattern signatures with at least one retained fragment.
    pub pattern_with_fragments: usize,
    /// Registrations of a signature text that was already known.
    pub duplicate_registrations: usize,
    pub discarded_signatures: usize,
    pub fragments_produced: u64,
    pub fragments_retained: u64,
    /// Every produced fragment by length, regardless of the threshold.
    pub histogram: LengthHistogram,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a newly registered signature.
    pub fn record_signature(&mut self, kind: SignatureKind) {
        match kind {
            SignatureKind::Content => self.content_signatures += 1,
            SignatureKind::Pattern => self.pattern_signatures += 1,
        }
    }

    /// Counts a signature that kept at least one fragment.
    pub fn record_covered_signature(&mut self, kind: SignatureKind) {
        match kind {
            SignatureKind::Content => self.content_with_fragments += 1,
            SignatureKind::Pattern => self.pattern_with_fragments += 1,
        }
    }

    pub fn unique_signatures(&self) -> usize {
        self.content_signatures + self.pattern_signatures
    }
}

/// Records every fragment in the histogram and keeps those above the threshold.
pub fn apply_threshold(
    fragments: Vec<Vec<u8>>,
    origin: SignatureId,
    threshold: &ThresholdConfig,
    stats: &mut RunStats,
) -> Vec<ExactMatchFragment> {
    let mut retained = Vec::with_capacity(fragments.len());
    for bytes in fragments {
        stats.histogram.record(bytes.len());
        stats.fragments_produced += 1;
        if threshold.retains(bytes.len()) {
            stats.fragments_retained += 1;
            retained.push(ExactMatchFragment::new(bytes, origin));
        } else {
            trace!("Dropping {}-byte fragment below threshold.", bytes.len());
        }
    }
    retained
}
