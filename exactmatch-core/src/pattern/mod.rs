//! Pattern literal extraction for `pcre:"…"` signatures.
//!
//! A pattern passes through four stages:
//!
//! 1. escape canonicalization ([`canonicalize`]),
//! 2. brace validation (malformed quantifiers discard the signature),
//! 3. the ordered [`rewrite::RewriteChain`], which expands exact repeats and
//!    replaces every variable construct with [`SEPARATOR`],
//! 4. splitting on the separator and decoding each span back to bytes.
//!
//! Every emitted fragment occurs verbatim in any input the pattern matches,
//! with one exception: sides of an alternation are scanned independently, so
//! a match through one side need not contain the other side's fragments.
//!
//! License: MIT OR APACHE 2.0

pub mod canonicalize;
pub mod rewrite;

use log::debug;

use crate::config::PatternConfig;
use crate::content::latin1_byte;
use crate::errors::{ExactmatchError, ExtractError};
use canonicalize::EscapeCanonicalizer;
use rewrite::RewriteChain;

/// The fragment boundary inserted by rewrite rules.
pub const SEPARATOR: char = ' ';

const DELIMITER: char = '/';
const EXTENDED_FLAG: char = 'x';

/// A pattern split into its body and trailing mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternParts<'a> {
    pub body: &'a str,
    pub flags: &'a str,
}

impl PatternParts<'_> {
    /// Whether the `x` flag makes unescaped whitespace insignificant.
    pub fn is_extended(&self) -> bool {
        self.flags.contains(EXTENDED_FLAG)
    }
}

/// Strips the `/…/flags` delimiters. A pattern without a leading slash is
/// taken as a bare body; a last slash followed by anything but letters is
/// part of the body.
pub fn split_delimiters(pattern: &str) -> Result<PatternParts<'_>, ExtractError> {
    let parts = match pattern.strip_prefix(DELIMITER) {
        Some(rest) => match rest.rfind(DELIMITER) {
            Some(idx) if rest[idx + 1..].chars().all(|c| c.is_ascii_alphabetic()) => PatternParts {
                body: &rest[..idx],
                flags: &rest[idx + 1..],
            },
            _ => PatternParts { body: rest, flags: "" },
        },
        None => PatternParts { body: pattern, flags: "" },
    };

    if parts.body.is_empty() {
        return Err(ExtractError::EmptySignature);
    }
    Ok(parts)
}

/// Escapes whose letter is followed by a braced argument, e.g. `\x{263a}`.
const BRACED_ESCAPES: &[u8] = b"xpPgkN";

/// Checks every brace outside bracket expressions and escapes.
///
/// Accepted forms are `{n}`, `{n,}`, `{n,m}` (with `n <= m`) and `{,m}`.
/// Offsets are byte offsets into `body`.
pub fn validate_quantifiers(body: &str) -> Result<(), ExtractError> {
    let bytes = body.as_bytes();
    let malformed = |start: usize, end: usize| ExtractError::MalformedQuantifier {
        offset: start,
        quantifier: String::from_utf8_lossy(&bytes[start..end.min(bytes.len())]).into_owned(),
    };

    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => {
                let braced = pos + 2 < bytes.len()
                    && BRACED_ESCAPES.contains(&bytes[pos + 1])
                    && bytes[pos + 2] == b'{';
                pos = if braced {
                    find_byte(bytes, pos + 3, b'}').map_or(bytes.len(), |close| close + 1)
                } else {
                    pos + 2
                };
            }
            b'[' => pos = skip_bracket(bytes, pos),
            b'{' => {
                let close = find_byte(bytes, pos + 1, b'}').ok_or_else(|| malformed(pos, bytes.len()))?;
                if !is_valid_bound(&body[pos + 1..close]) {
                    return Err(malformed(pos, close + 1));
                }
                pos = close + 1;
            }
            b'}' => return Err(malformed(pos, pos + 1)),
            _ => pos += 1,
        }
    }
    Ok(())
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes.get(from..)?.iter().position(|&b| b == needle).map(|rel| from + rel)
}

/// Returns the position just past the bracket expression opened at `open`.
/// A `]` right after `[` or `[^` is literal; `[:name:]` classes are nested.
fn skip_bracket(bytes: &[u8], open: usize) -> usize {
    let mut pos = open + 1;
    if bytes.get(pos) == Some(&b'^') {
        pos += 1;
    }
    if bytes.get(pos) == Some(&b']') {
        pos += 1;
    }
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'[' if bytes.get(pos + 1) == Some(&b':') => {
                pos = find_byte(bytes, pos + 2, b']').map_or(bytes.len(), |close| close + 1);
            }
            b']' => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}

fn is_valid_bound(inner: &str) -> bool {
    let is_count = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match inner.split_once(',') {
        None => is_count(inner),
        Some((min, "")) => is_count(min),
        Some(("", max)) => is_count(max),
        Some((min, max)) => {
            is_count(min)
                && is_count(max)
                && match (min.parse::<u64>(), max.parse::<u64>()) {
                    (Ok(lo), Ok(hi)) => lo <= hi,
                    _ => false,
                }
        }
    }
}

/// Splits rewritten text on the separator and decodes every span.
pub fn split_fragments(text: &str) -> Vec<Vec<u8>> {
    text.split(SEPARATOR)
        .filter(|span| !span.trim().is_empty())
        .flat_map(|span| decode_span(&span.to_ascii_lowercase()))
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Decodes `\xHH`, `\r`, `\n` and escaped punctuation to raw bytes.
/// Plain characters are ISO-8859-1, one byte each. Any other escape, and any
/// character above U+00FF, cannot be expressed as a literal and splits the span.
pub fn decode_span(span: &str) -> Vec<Vec<u8>> {
    let chars: Vec<char> = span.chars().collect();
    let mut pieces = Vec::new();
    let mut current = Vec::with_capacity(chars.len());
    let mut pos = 0;

    while pos < chars.len() {
        if chars[pos] != '\\' {
            match latin1_byte(chars[pos]) {
                Some(b) => current.push(b),
                None => pieces.push(std::mem::take(&mut current)),
            }
            pos += 1;
            continue;
        }
        match chars.get(pos + 1) {
            Some('x') => {
                let decoded = chars
                    .get(pos + 2..pos + 4)
                    .and_then(|digits| hex::decode(digits.iter().collect::<String>()).ok());
                match decoded {
                    Some(decoded) => {
                        current.extend_from_slice(&decoded);
                        pos += 4;
                    }
                    None => {
                        pieces.push(std::mem::take(&mut current));
                        pos += 2;
                    }
                }
            }
            Some('r') => {
                current.push(b'\r');
                pos += 2;
            }
            Some('n') => {
                current.push(b'\n');
                pos += 2;
            }
            // `\cX` is a control character; its operand is not a literal.
            Some('c') => {
                pieces.push(std::mem::take(&mut current));
                pos += 3;
            }
            Some(&p) if p.is_ascii_punctuation() => {
                current.push(p as u8);
                pos += 2;
            }
            _ => {
                pieces.push(std::mem::take(&mut current));
                pos += 2;
            }
        }
    }
    pieces.push(current);
    pieces.retain(|piece| !piece.is_empty());
    pieces
}

/// Extracts exact-match fragments from `pcre` signatures.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    canonicalizer: EscapeCanonicalizer,
    chain: RewriteChain,
}

impl PatternExtractor {
    /// Validates the settings and compiles the rewrite chain.
    pub fn new(config: &PatternConfig) -> Result<Self, ExactmatchError> {
        config.validate()?;
        let chain = RewriteChain::standard(config.max_exact_repeat)?.without(&config.disabled_rules);
        debug!("Pattern extractor ready with {} rewrite rule(s).", chain.rules().len());
        Ok(Self {
            canonicalizer: EscapeCanonicalizer::new(&config.metacharacters),
            chain,
        })
    }

    pub fn chain(&self) -> &RewriteChain {
        &self.chain
    }

    /// Extracts the fragments of one pattern. Zero fragments is a valid
    /// result: the pattern has no literal guaranteed to be present.
    pub fn extract(&self, pattern: &str) -> Result<Vec<Vec<u8>>, ExtractError> {
        let parts = split_delimiters(pattern)?;
        validate_quantifiers(parts.body)?;

        let canonical = self.canonicalizer.canonicalize(parts.body, parts.is_extended());
        let rewritten = self
            .chain
            .apply(&format!("{DELIMITER}{canonical}{DELIMITER}{}", parts.flags));
        let fragments = split_fragments(&rewritten);
        debug!("Pattern {:?} rewritten to {:?}: {} fragment(s).", pattern, rewritten, fragments.len());
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(pattern: &str) -> Vec<Vec<u8>> {
        PatternExtractor::new(&PatternConfig::default())
            .unwrap()
            .extract(pattern)
            .unwrap()
    }

    fn frags(pattern: &str) -> Vec<String> {
        extract(pattern)
            .into_iter()
            .map(|f| String::from_utf8_lossy(&f).into_owned())
            .collect()
    }

    #[test]
    fn test_split_delimiters() {
        let parts = split_delimiters("/abc/ims").unwrap();
        assert_eq!(parts.body, "abc");
        assert_eq!(parts.flags, "ims");
        assert!(!parts.is_extended());

        let parts = split_delimiters("/a/b c/").unwrap();
        assert_eq!(parts.body, "a/b c");

        let parts = split_delimiters("/a/b.c").unwrap();
        assert_eq!(parts.body, "a/b.c");
        assert_eq!(parts.flags, "");

        assert_eq!(split_delimiters("abc").unwrap().body, "abc");
        assert!(split_delimiters("/abc/x").unwrap().is_extended());
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(split_delimiters("//i").unwrap_err(), ExtractError::EmptySignature);
        assert_eq!(split_delimiters("").unwrap_err(), ExtractError::EmptySignature);
        let extractor = PatternExtractor::new(&PatternConfig::default()).unwrap();
        assert_eq!(extractor.extract("//").unwrap_err(), ExtractError::EmptySignature);
    }

    #[test]
    fn test_valid_quantifiers() {
        for body in ["a{2}", "a{2,}", "a{2,5}", "a{,5}", r"\{", r"\x{263a}", "[{}]", r"[\]{]", "[[:alpha:]{]"] {
            assert!(validate_quantifiers(body).is_ok(), "{body}");
        }
    }

    #[test]
    fn test_malformed_quantifiers() {
        let err = validate_quantifiers("ab{x}").unwrap_err();
        assert_eq!(
            err,
            ExtractError::MalformedQuantifier {
                offset: 2,
                quantifier: "{x}".into()
            }
        );
        assert!(validate_quantifiers("a{5,2}").is_err());
        assert!(validate_quantifiers("a{}").is_err());
        assert!(validate_quantifiers("a{,}").is_err());
        assert!(validate_quantifiers("a{2").is_err());
        assert!(validate_quantifiers("a}").is_err());
    }

    #[test]
    fn test_decode_span() {
        assert_eq!(decode_span(r"a\x2eb"), vec![b"a.b".to_vec()]);
        assert_eq!(decode_span(r"\r\n"), vec![b"\r\n".to_vec()]);
        assert_eq!(decode_span(r"a\-b"), vec![b"a-b".to_vec()]);
        assert_eq!(decode_span(r"ab\qcd"), vec![b"ab".to_vec(), b"cd".to_vec()]);
        assert_eq!(decode_span(r"\xff"), vec![vec![0xff]]);
        assert!(decode_span(r"\q").is_empty());
    }

    #[test]
    fn test_exact_repeat_expansion() {
        assert_eq!(frags("/o{2}/"), vec!["oo"]);
        assert_eq!(frags("/x{3}y{0}/"), vec!["xxx"]);
        // Hex escapes keep their byte value; only the span text is case folded.
        assert_eq!(frags(r"/\x41{2}B/"), vec!["AAb"]);
    }

    #[test]
    fn test_ambiguity_boundaries() {
        let found = frags(r"/^GateCrasher\s+v\d+\x2E\d+\x2C\s+Server\s+On-Line\x2E\x2E\x2E/ims");
        // Spans are maximal: `\x2E` is a literal, so `on-line...` stays whole.
        assert_eq!(found, vec!["gatecrasher", "v", ".", ",", "server", "on-line..."]);
    }

    #[test]
    fn test_latin1_pattern_bytes() {
        assert_eq!(extract("/caf\u{e9}/"), vec![b"caf\xe9".to_vec()]);
        assert_eq!(extract("/ab\u{263a}cd/"), vec![b"ab".to_vec(), b"cd".to_vec()]);
        assert_eq!(decode_span("\u{ff}"), vec![vec![0xff]]);
    }

    #[test]
    fn test_leading_bracket_in_class() {
        assert_eq!(frags("/x[]abc]y/"), vec!["x", "y"]);
        assert_eq!(frags("/x[^]abc]y/"), vec!["x", "y"]);
        assert_eq!(frags("/ab[^$]cd/"), vec!["ab", "cd"]);
    }

    #[test]
    fn test_control_escape_is_not_a_literal() {
        assert_eq!(frags(r"/q\cA{2}z/"), vec!["q", "z"]);
        assert_eq!(frags(r"/q\cAz/"), vec!["q", "z"]);
        assert_eq!(decode_span(r"q\cAz"), vec![b"q".to_vec(), b"z".to_vec()]);
    }

    #[test]
    fn test_extended_comment_is_not_a_fragment() {
        assert_eq!(frags("/abc # secretword\n/x"), vec!["abc"]);
        assert_eq!(frags("/abc#def/"), vec!["abc#def"]);
    }

    #[test]
    fn test_no_literal_yields_nothing() {
        assert!(extract("/^[a-z]{2,4}$/").is_empty());
        assert!(extract(r"/.*\d+/").is_empty());
    }

    #[test]
    fn test_alternation_sides_are_independent() {
        assert_eq!(frags("/(abc|def)xyz/"), vec!["abc", "def", "xyz"]);
        assert_eq!(frags("/abc|def/"), vec!["abc", "def"]);
    }

    #[test]
    fn test_optional_constructs_are_dropped() {
        assert_eq!(frags("/abc?d/"), vec!["ab", "d"]);
        assert_eq!(frags("/ab(cd)?ef/"), vec!["ab", "ef"]);
        assert_eq!(frags("/user(?!name)pass/"), vec!["user", "pass"]);
    }

    #[test]
    fn test_plus_keeps_one_copy() {
        assert_eq!(frags("/ab+c/"), vec!["ab", "c"]);
        assert_eq!(frags(r"/a\x2E+b/"), vec!["a.", "b"]);
    }

    #[test]
    fn test_escaped_metacharacters_are_literal() {
        assert_eq!(frags(r"/GET \/index\.php\?id=/"), vec!["get /index.php?id="]);
        assert_eq!(frags(r"/a\|b/"), vec!["a|b"]);
    }

    #[test]
    fn test_extended_flag_splits_on_whitespace() {
        assert_eq!(frags("/abc def/x"), vec!["abc", "def"]);
        assert_eq!(frags("/abc def/"), vec!["abc def"]);
    }

    #[test]
    fn test_inner_slash_and_bare_body() {
        assert_eq!(frags("/a/b/i"), vec!["a/b"]);
        assert_eq!(frags("abc"), vec!["abc"]);
    }

    #[test]
    fn test_malformed_quantifier_discards_signature() {
        let extractor = PatternExtractor::new(&PatternConfig::default()).unwrap();
        let err = extractor.extract("/abc{x}def/").unwrap_err();
        assert_eq!(err.kind(), "MalformedQuantifier");
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let config = PatternConfig {
            disabled_rules: vec!["exact-repeat".to_string()],
            ..PatternConfig::default()
        };
        let extractor = PatternExtractor::new(&config).unwrap();
        assert!(extractor.chain().get("exact-repeat").is_none());
        let found = extractor.extract("/ao{2}b/").unwrap();
        assert_eq!(found, vec![b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PatternConfig {
            metacharacters: vec!['a'],
            ..PatternConfig::default()
        };
        assert!(PatternExtractor::new(&config).is_err());
    }
}
