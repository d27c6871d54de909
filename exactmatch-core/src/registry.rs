// exactmatch-core/src/registry.rs
//! The signature registry.
//!
//! One entry exists per unique `(kind, text)`. The raw text is the key: no
//! case folding or normalization happens here, so two signatures differing
//! only in case are two entries.

use log::debug;
use std::collections::{BTreeSet, HashMap};

use crate::signature::{ExactMatchFragment, RuleId, Signature, SignatureId, SignatureKind, SignatureOutcome};

/// Registry of every signature seen during a run, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct SignatureRegistry {
    signatures: Vec<Signature>,
    index: HashMap<(SignatureKind, String), SignatureId>,
}

/// All signatures that yielded the same fragment bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentEntry {
    pub bytes: Vec<u8>,
    pub kinds: BTreeSet<SignatureKind>,
    /// Union of the referencing rules, in first-seen order.
    pub rules: Vec<RuleId>,
}

impl SignatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one occurrence of a signature.
    ///
    /// Returns `true` with the new id on first sight of `(kind, text)`. Later
    /// sights append `rule` to the existing entry (once) and return `false`;
    /// the caller must not process the signature again.
    pub fn register(&mut self, text: &str, kind: SignatureKind, rule: RuleId) -> (bool, SignatureId) {
        if let Some(&id) = self.index.get(&(kind, text.to_string())) {
            if self.signatures[id.0].add_rule(rule) {
                debug!("Rule {} also references {} signature #{}.", rule, kind, id.0);
            }
            return (false, id);
        }

        let id = SignatureId(self.signatures.len());
        self.signatures.push(Signature::new(id, text.to_string(), kind, rule));
        self.index.insert((kind, text.to_string()), id);
        (true, id)
    }

    /// Stores the result of processing a signature.
    pub fn record_outcome(&mut self, id: SignatureId, outcome: SignatureOutcome, fragments: Vec<ExactMatchFragment>) {
        if let Some(signature) = self.signatures.get_mut(id.0) {
            signature.outcome = outcome;
            signature.fragments = fragments;
        }
    }

    pub fn get(&self, id: SignatureId) -> Option<&Signature> {
        self.signatures.get(id.0)
    }

    pub fn lookup(&self, kind: SignatureKind, text: &str) -> Option<&Signature> {
        self.index.get(&(kind, text.to_string())).and_then(|id| self.get(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signature> {
        self.signatures.iter()
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Deduplicated view of all retained fragments, in first-seen order.
    pub fn fragment_index(&self) -> Vec<FragmentEntry> {
        let mut entries: Vec<FragmentEntry> = Vec::new();
        let mut positions: HashMap<&[u8], usize> = HashMap::new();

        for signature in &self.signatures {
            for fragment in &signature.fragments {
                let pos = *positions.entry(fragment.bytes.as_slice()).or_insert_with(|| {
                    entries.push(FragmentEntry {
                        bytes: fragment.bytes.clone(),
                        kinds: BTreeSet::new(),
                        rules: Vec::new(),
                    });
                    entries.len() - 1
                });
                let entry = &mut entries[pos];
                entry.kinds.insert(signature.kind);
                for rule in &signature.referencing_rules {
                    if !entry.rules.contains(rule) {
                        entry.rules.push(*rule);
                    }
                }
            }
        }
        entries
    }
}
