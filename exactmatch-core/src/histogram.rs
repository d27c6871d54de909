//! histogram.rs - Fragment length histogram.
//!
//! License: MIT OR APACHE 2.0

use serde::Serialize;
use std::collections::BTreeMap;

/// Upper bounds of the cumulative threshold bins; `None` is the `ALL` bin.
pub const THRESHOLD_BINS: [Option<usize>; 7] = [Some(2), Some(4), Some(8), Some(16), Some(32), Some(64), None];

/// Counts of produced fragments by length, ordered by length.
///
/// Every produced fragment is counted, whether or not it was retained, so the
/// histogram never depends on the threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LengthHistogram {
    counts: BTreeMap<usize, u64>,
}

/// One cumulative bin: the number of fragments with `length <= bound`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThresholdBin {
    pub label: String,
    pub count: u64,
}

impl LengthHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, length: usize) {
        *self.counts.entry(length).or_insert(0) += 1;
    }

    pub fn count(&self, length: usize) -> u64 {
        self.counts.get(&length).copied().unwrap_or(0)
    }

    /// Sum over all lengths.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(length, count)` pairs in ascending length order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.counts.iter().map(|(len, count)| (*len, *count))
    }

    /// Cumulative counts for the bins `<2 <4 <8 <16 <32 <64 ALL`.
    pub fn threshold_bins(&self) -> Vec<ThresholdBin> {
        THRESHOLD_BINS
            .iter()
            .map(|bound| match bound {
                Some(limit) => ThresholdBin {
                    label: format!("<{}", limit),
                    count: self.counts.range(..=*limit).map(|(_, c)| c).sum(),
                },
                None => ThresholdBin {
                    label: "ALL".to_string(),
                    count: self.total(),
                },
            })
            .collect()
    }
}
