// exactmatch-core/src/signature.rs
//! Core data model: rules, signatures and the fragments extracted from them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ExtractError;

/// Identifier of a detection rule (its `sid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a signature inside a `SignatureRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignatureId(pub usize);

/// A scanned rule line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    /// 1-based line number in the input.
    pub line: usize,
    pub text: String,
}

/// Which rule option a signature came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureKind {
    /// `content:"…"`, a literal with optional `|hex|` spans.
    Content,
    /// `pcre:"…"`, a delimited regular expression.
    Pattern,
}

impl SignatureKind {
    /// The rule option keyword for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            SignatureKind::Content => "content",
            SignatureKind::Pattern => "pcre",
        }
    }
}

impl fmt::Display for SignatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A byte sequence guaranteed to occur verbatim wherever its signature matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactMatchFragment {
    pub bytes: Vec<u8>,
    pub origin: SignatureId,
}

impl ExactMatchFragment {
    pub fn new(bytes: Vec<u8>, origin: SignatureId) -> Self {
        Self { bytes, origin }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// What happened when a signature was processed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SignatureOutcome {
    /// Registered but not yet processed.
    #[default]
    Pending,
    /// Decoded/extracted; `produced` counts every fragment before thresholding.
    Extracted { produced: usize },
    /// Discarded because decoding or extraction failed.
    Discarded(ExtractError),
}

/// A unique signature text together with every rule that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub id: SignatureId,
    pub text: String,
    pub kind: SignatureKind,
    /// Insertion-ordered, duplicate free. Never empty.
    pub referencing_rules: Vec<RuleId>,
    /// Fragments that survived the threshold.
    pub fragments: Vec<ExactMatchFragment>,
    pub outcome: SignatureOutcome,
}

impl Signature {
    pub(crate) fn new(id: SignatureId, text: String, kind: SignatureKind, rule: RuleId) -> Self {
        Self {
            id,
            text,
            kind,
            referencing_rules: vec![rule],
            fragments: Vec::new(),
            outcome: SignatureOutcome::Pending,
        }
    }

    /// Appends `rule` unless it is already listed. Returns whether it was added.
    pub(crate) fn add_rule(&mut self, rule: RuleId) -> bool {
        if self.referencing_rules.contains(&rule) {
            return false;
        }
        self.referencing_rules.push(rule);
        true
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self.outcome, SignatureOutcome::Discarded(_))
    }

    pub fn has_fragments(&self) -> bool {
        !self.fragments.is_empty()
    }
}

/// A signature-local failure, reported to the caller for auditing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureDiagnostic {
    pub signature_text: String,
    pub kind: SignatureKind,
    pub rule_id: RuleId,
    pub error: ExtractError,
}

impl fmt::Display for SignatureDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule {}: {} signature \"{}\" discarded ({}: {})",
            self.rule_id,
            self.kind,
            self.signature_text,
            self.error.kind(),
            self.error
        )
    }
}
