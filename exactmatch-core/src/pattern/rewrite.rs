//! rewrite.rs - The ordered rewrite chain behind pattern extraction.
//!
//! Every rule pairs a regex matcher with an action. The chain is plain data:
//! rules run in the order of `STANDARD_RULES`, each on the output of the
//! previous one, and any rule can be disabled by name. Most rules replace an
//! inherently variable construct with the separator, which deletes the
//! construct and marks a fragment boundary at the same time.
//!
//! Rules assume their input went through escape canonicalization, so every
//! bare metacharacter they see is a real metacharacter.
//!
//! License: MIT OR APACHE 2.0

use log::{trace, warn};
use regex::{Captures, Regex};

use crate::errors::ExactmatchError;
use crate::pattern::SEPARATOR;

/// What a rule does with each match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteAction {
    /// Replace the match with the separator.
    Separator,
    /// `c{n}` becomes `n` copies of the atom in group 1; group 2 holds `n`.
    /// Counts above `max_count` are left in place.
    ExpandExactRepeat { max_count: usize },
    /// Keep group 1, then a separator (`c+` is at least one `c`).
    KeepAtom,
    /// The match opens a group; remove everything through its closing paren.
    DropGroup,
    /// The match starts with a closing paren; remove the whole group it closes.
    DropEnclosingGroup,
}

/// A named, compiled rewrite rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    name: String,
    matcher: Regex,
    action: RewriteAction,
}

impl RewriteRule {
    pub fn new(name: &str, pattern: &str, action: RewriteAction) -> Result<Self, ExactmatchError> {
        let matcher = Regex::new(pattern)
            .map_err(|e| ExactmatchError::RuleCompilationError(name.to_string(), e))?;
        Ok(Self {
            name: name.to_string(),
            matcher,
            action,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    pub fn action(&self) -> RewriteAction {
        self.action
    }

    /// Applies this rule to `text`.
    pub fn apply(&self, text: &str) -> String {
        match self.action {
            RewriteAction::Separator => self.matcher.replace_all(text, SEPARATOR_STR).into_owned(),
            RewriteAction::ExpandExactRepeat { max_count } => self
                .matcher
                .replace_all(text, |caps: &Captures| expand_repeat(caps, max_count))
                .into_owned(),
            RewriteAction::KeepAtom => self
                .matcher
                .replace_all(text, |caps: &Captures| format!("{}{}", &caps[1], SEPARATOR))
                .into_owned(),
            RewriteAction::DropGroup => self.drop_groups(text, find_group_end),
            RewriteAction::DropEnclosingGroup => self.drop_groups(text, find_group_start),
        }
    }

    /// Repeatedly removes the group located by `locate` around the first match.
    /// Each pass removes at least the match itself, so the loop terminates.
    fn drop_groups(&self, text: &str, locate: fn(&str, usize, usize) -> (usize, usize)) -> String {
        let mut current = text.to_string();
        while let Some(m) = self.matcher.find(&current) {
            let (start, end) = locate(&current, m.start(), m.end());
            current.replace_range(start..end, SEPARATOR_STR);
        }
        current
    }
}

const SEPARATOR_STR: &str = " ";

fn expand_repeat(caps: &Captures, max_count: usize) -> String {
    let atom = &caps[1];
    if is_variable_escape(atom) {
        return caps[0].to_string();
    }
    match caps[2].parse::<usize>() {
        Ok(count) if count <= max_count => atom.repeat(count),
        _ => caps[0].to_string(),
    }
}

/// `\d`, `\w`, `\1`, `\cX` and friends: escapes with no literal form.
fn is_variable_escape(atom: &str) -> bool {
    let bytes = atom.as_bytes();
    match bytes {
        [b'\\', b'c', _] => true,
        [b'\\', letter] => letter.is_ascii_alphanumeric() && !matches!(letter, b'r' | b'n'),
        _ => false,
    }
}

/// From an opener at `open`, finds the end of the balanced group.
/// An unbalanced group extends to the end of the text.
fn find_group_end(text: &str, open: usize, _match_end: usize) -> (usize, usize) {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut pos = open;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return (open, pos + 1);
                }
            }
            _ => {}
        }
        pos += 1;
    }
    (open, bytes.len())
}

/// From a closing paren at `close`, finds the matching opener. The removed
/// span runs through `match_end`, which covers the trailing quantifier.
fn find_group_start(text: &str, close: usize, match_end: usize) -> (usize, usize) {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut pos = close;
    while pos > 0 {
        pos -= 1;
        let escaped = pos > 0 && bytes[pos - 1] == b'\\';
        match bytes[pos] {
            b')' if !escaped => depth += 1,
            b'(' if !escaped => {
                depth -= 1;
                if depth == 0 {
                    return (pos, match_end);
                }
            }
            _ => {}
        }
    }
    (close, match_end)
}

/// A trailing quantifier with its optional lazy or possessive suffix.
macro_rules! quantifier {
    () => {
        r"(?:[*+?]|\{\d*(?:,\d*)?\})[?+]?"
    };
}

/// A single literal atom that may carry a quantifier: `\xHH`, `\r`, `\n` or an
/// escaped punctuation character.
macro_rules! escape_atom {
    () => {
        r"\\x[0-9A-Fa-f]{2}|\\[rn]|\\[[:punct:]]"
    };
}

/// The standard rule order. Brackets go before the anchor, escape and
/// wildcard rules, which would otherwise rewrite class members, and before
/// anything that counts parentheses. Group removal goes before the plain
/// paren sweep.
const STANDARD_RULES: &[(&str, &str, RewriteAction)] = &[
    (
        "exact-repeat",
        concat!(r"(", escape_atom!(), r"|\\c.|\\.|[^\\\[\]().*+?{}|^$/\s])\{(\d+)\}"),
        RewriteAction::ExpandExactRepeat { max_count: 0 },
    ),
    ("pattern-flags", r"/[A-Za-z]*$", RewriteAction::Separator),
    ("pattern-open", r"^/", RewriteAction::Separator),
    (
        "bracket-expressions",
        concat!(r"\[\^?\]?(?:\[:\^?[a-z]+:\]|\\.|[^\]])*\](?:", quantifier!(), r")?"),
        RewriteAction::Separator,
    ),
    ("anchors", r"[\^$]", RewriteAction::Separator),
    (
        "escape-classes",
        concat!(r"\\[AbBdDfsStvwWzZ](?:", quantifier!(), r")?"),
        RewriteAction::Separator,
    ),
    (
        "unsupported-escapes",
        concat!(
            r"\\(?:x\{[^}]*\}|[pP](?:\{[^}]*\}|[A-Za-z])|[gk](?:\{[^}]*\}|<[^>]*>|'[^']*')|c.|[0-9A-Za-z&&[^xrn]])(?:",
            quantifier!(),
            r")?"
        ),
        RewriteAction::Separator,
    ),
    ("wildcard", concat!(r"\.(?:", quantifier!(), r")?"), RewriteAction::Separator),
    ("negative-lookaround", r"\(\?(?:<?!|#)", RewriteAction::DropGroup),
    ("quantified-groups", concat!(r"\)", quantifier!()), RewriteAction::DropEnclosingGroup),
    (
        "group-openers",
        r"\(\?(?:[:=>|]|<=|P?<[A-Za-z_][0-9A-Za-z_]*>|'[A-Za-z_][0-9A-Za-z_]*'|[A-Za-z]*(?:-[A-Za-z]*)?[:)])",
        RewriteAction::Separator,
    ),
    ("groups-and-alternation", r"[()|]", RewriteAction::Separator),
    (
        "brace-quantifiers",
        concat!(r"(?:", escape_atom!(), r"|[^\\])\{\d*(?:,\d*)?\}[?+]?"),
        RewriteAction::Separator,
    ),
    (
        "optional-escapes",
        concat!(r"(?:", escape_atom!(), r")[?*][?+]?"),
        RewriteAction::Separator,
    ),
    (
        "repeated-escapes",
        concat!(r"(", escape_atom!(), r")\+[?+]?"),
        RewriteAction::KeepAtom,
    ),
    ("optional-atoms", r"[^\\][?*][?+]?", RewriteAction::Separator),
    ("repeated-atoms", r"([^\\])\+[?+]?", RewriteAction::KeepAtom),
    ("stray-metacharacters", r"[\[\]{}()*+?|^$.]", RewriteAction::Separator),
];

/// Names of the standard rules, in evaluation order.
pub fn standard_rule_names() -> impl Iterator<Item = &'static str> {
    STANDARD_RULES.iter().map(|(name, _, _)| *name)
}

/// An ordered list of rewrite rules.
#[derive(Debug, Clone)]
pub struct RewriteChain {
    rules: Vec<RewriteRule>,
}

impl RewriteChain {
    /// Compiles the standard rules.
    pub fn standard(max_exact_repeat: usize) -> Result<Self, ExactmatchError> {
        let rules = STANDARD_RULES
            .iter()
            .map(|(name, pattern, action)| {
                let action = match action {
                    RewriteAction::ExpandExactRepeat { .. } => RewriteAction::ExpandExactRepeat {
                        max_count: max_exact_repeat,
                    },
                    other => *other,
                };
                RewriteRule::new(name, pattern, action)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn from_rules(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    /// Drops the named rules. Unknown names are reported and ignored.
    pub fn without(mut self, disabled: &[String]) -> Self {
        for name in disabled {
            if !self.rules.iter().any(|r| &r.name == name) {
                warn!("Rewrite rule '{}' in `disabled_rules` does not exist.", name);
            }
        }
        self.rules.retain(|rule| !disabled.contains(&rule.name));
        self
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&RewriteRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Runs every rule in order.
    pub fn apply(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |current, rule| {
            let next = rule.apply(&current);
            if next != current {
                trace!("rewrite '{}': {:?} -> {:?}", rule.name, current, next);
            }
            next
        })
    }
}
