//! report.rs - Serializable records built from a finished run.
//!
//! Fragment bytes are rendered two ways: `hex` (lowercase, no separators) and
//! a Latin-1 view where every byte maps to the code point of the same value,
//! so the text view never changes the fragment length.
//!
//! License: MIT OR APACHE 2.0

use serde::Serialize;

use crate::histogram::LengthHistogram;
use crate::registry::SignatureRegistry;
use crate::signature::{RuleId, Signature, SignatureKind, SignatureOutcome};

/// One line of `signatures_hist.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureRecord {
    pub signature: String,
    #[serde(rename = "signature_type")]
    pub kind: SignatureKind,
    pub exact_matches: Vec<String>,
    pub exact_matches_hex: Vec<String>,
    pub rules: Vec<RuleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One line of `exact_matches_hex.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentRecord {
    pub exact_match_hex: String,
    pub kinds: Vec<SignatureKind>,
    pub rules: Vec<RuleId>,
}

/// One row of `length_histogram.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramRow {
    pub length: usize,
    pub count: u64,
}

/// Renders bytes as text with one char per byte.
pub fn latin1_view(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

impl SignatureRecord {
    pub fn from_signature(signature: &Signature) -> Self {
        let error = match &signature.outcome {
            SignatureOutcome::Discarded(e) => Some(e.to_string()),
            _ => None,
        };
        Self {
            signature: signature.text.clone(),
            kind: signature.kind,
            exact_matches: signature.fragments.iter().map(|f| latin1_view(&f.bytes)).collect(),
            exact_matches_hex: signature.fragments.iter().map(|f| hex::encode(&f.bytes)).collect(),
            rules: signature.referencing_rules.clone(),
            error,
        }
    }
}

pub fn signature_records(registry: &SignatureRegistry) -> Vec<SignatureRecord> {
    registry.iter().map(SignatureRecord::from_signature).collect()
}

pub fn fragment_records(registry: &SignatureRegistry) -> Vec<FragmentRecord> {
    registry
        .fragment_index()
        .into_iter()
        .map(|entry| FragmentRecord {
            exact_match_hex: hex::encode(&entry.bytes),
            kinds: entry.kinds.into_iter().collect(),
            rules: entry.rules,
        })
        .collect()
}

pub fn histogram_rows(histogram: &LengthHistogram) -> Vec<HistogramRow> {
    histogram
        .iter()
        .map(|(length, count)| HistogramRow { length, count })
        .collect()
}

/// Serializes records as JSON lines, one compact object per line.
pub fn to_json_lines<T: Serialize>(records: &[T]) -> serde_json::Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExtractError;
    use crate::signature::ExactMatchFragment;

    fn registry() -> SignatureRegistry {
        let mut registry = SignatureRegistry::new();
        let (_, a) = registry.register("|ff|ab", SignatureKind::Content, RuleId(10));
        registry.record_outcome(
            a,
            SignatureOutcome::Extracted { produced: 1 },
            vec![ExactMatchFragment::new(vec![0xff, b'a', b'b'], a)],
        );
        let (_, b) = registry.register("ab|6|", SignatureKind::Content, RuleId(11));
        registry.record_outcome(
            b,
            SignatureOutcome::Discarded(ExtractError::MalformedHexSpan {
                offset: 2,
                span: "6".into(),
            }),
            Vec::new(),
        );
        registry
    }

    #[test]
    fn test_latin1_view_keeps_length() {
        let view = latin1_view(&[0xff, b'a', 0x00]);
        assert_eq!(view.chars().count(), 3);
        assert_eq!(view.chars().next(), Some('\u{ff}'));
    }

    #[test]
    fn test_signature_record_json() {
        let records = signature_records(&registry());
        let json = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(json["signature_type"], "content");
        assert_eq!(json["exact_matches_hex"][0], "ff6162");
        assert_eq!(json["rules"][0], 10);
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(&records[1]).unwrap();
        assert!(json["error"].as_str().unwrap().contains("malformed hex span"));
    }

    #[test]
    fn test_json_lines() {
        let text = to_json_lines(&fragment_records(&registry())).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert_eq!(
            text.trim_end(),
            r#"{"exact_match_hex":"ff6162","kinds":["content"],"rules":[10]}"#
        );
    }
}
