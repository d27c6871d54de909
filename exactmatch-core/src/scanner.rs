// exactmatch-core/src/scanner.rs
//! Rule line scanner.
//!
//! Pulls every `content:"…"` and `pcre:"…"` option and the `sid` out of a
//! rule line. Option values are matched escape-aware, so `\"` inside a value
//! does not end it.

use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;

use crate::errors::ScanError;
use crate::signature::{Rule, RuleId, SignatureKind};

lazy_static! {
    static ref SIGNATURE_OPTION: Regex =
        Regex::new(r#"\b(content|pcre)\s*:\s*(!)?\s*"((?:[^"\\]|\\.)*)""#).unwrap();
    static ref RULE_ID_OPTION: Regex = Regex::new(r"\bsid\s*:\s*([^;\s)]+)").unwrap();
    static ref QUOTED_VALUE: Regex = Regex::new(r#""(?:[^"\\]|\\.)*""#).unwrap();
}

/// A signature option found in a rule line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedSignature {
    pub kind: SignatureKind,
    pub text: String,
}

/// A rule line with its signatures in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRule {
    pub rule: Rule,
    pub signatures: Vec<ScannedSignature>,
}

/// Scans one line. `line_number` is 1-based.
///
/// Blank lines, `#` comments and lines carrying neither a signature nor a
/// sid yield `Ok(None)`. Negated options are skipped: their bytes are
/// guaranteed absent from a match.
pub fn scan_line(line_number: usize, line: &str) -> Result<Option<ScannedRule>, ScanError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut signatures = Vec::new();
    for caps in SIGNATURE_OPTION.captures_iter(trimmed) {
        let kind = match &caps[1] {
            "pcre" => SignatureKind::Pattern,
            _ => SignatureKind::Content,
        };
        if caps.get(2).is_some() {
            trace!("line {}: skipping negated {} option.", line_number, kind);
            continue;
        }
        signatures.push(ScannedSignature {
            kind,
            text: caps[3].to_string(),
        });
    }

    let rule_id = match find_rule_id(trimmed) {
        Some(value) => value
            .parse::<u64>()
            .map(RuleId)
            .map_err(|_| ScanError::InvalidRuleId {
                line: line_number,
                value: value.to_string(),
            })?,
        None if signatures.is_empty() => return Ok(None),
        None => {
            return Err(ScanError::MissingRuleId {
                line: line_number,
                signatures: signatures.len(),
            })
        }
    };

    debug!("line {}: rule {} with {} signature(s).", line_number, rule_id, signatures.len());
    Ok(Some(ScannedRule {
        rule: Rule {
            id: rule_id,
            line: line_number,
            text: trimmed.to_string(),
        },
        signatures,
    }))
}

/// The first `sid:` value outside any quoted option value.
fn find_rule_id(line: &str) -> Option<&str> {
    let quoted: Vec<(usize, usize)> = QUOTED_VALUE.find_iter(line).map(|m| (m.start(), m.end())).collect();
    RULE_ID_OPTION
        .captures_iter(line)
        .find(|caps| {
            let start = caps.get(0).map_or(0, |m| m.start());
            !quoted.iter().any(|(s, e)| start > *s && start < *e)
        })
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
