//! Escape canonicalization, the first stage of pattern extraction.
//!
//! Escaped metacharacters are rewritten to `\xHH` so that the ambiguity
//! removal rules, which match bare metacharacters, never touch a character the
//! pattern author meant literally. The scan is a single left-to-right pass, so
//! `\\.` is read as an escaped backslash followed by a wildcard.

use crate::pattern::SEPARATOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeCanonicalizer {
    metacharacters: Vec<char>,
}

impl EscapeCanonicalizer {
    pub fn new(metacharacters: &[char]) -> Self {
        Self {
            metacharacters: metacharacters.to_vec(),
        }
    }

    pub fn metacharacters(&self) -> &[char] {
        &self.metacharacters
    }

    /// Rewrites escaped metacharacters and literal whitespace to `\xHH`.
    ///
    /// With `extended` set (the `x` flag) unescaped whitespace outside a
    /// bracket expression carries no meaning and becomes a fragment boundary
    /// instead, and an unescaped `#` outside a class starts a comment that
    /// runs to the end of the line.
    pub fn canonicalize(&self, pattern: &str, extended: bool) -> String {
        let mut out = String::with_capacity(pattern.len() + 8);
        let mut chars = pattern.chars().peekable();
        let mut in_class = false;

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) if self.metacharacters.contains(&escaped) || escaped.is_ascii_whitespace() => {
                        push_hex_escape(&mut out, escaped);
                    }
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                },
                '[' if !in_class => {
                    in_class = true;
                    out.push('[');
                    if let Some(negate) = chars.next_if_eq(&'^') {
                        out.push(negate);
                    }
                    if let Some(member) = chars.next_if_eq(&']') {
                        out.push(member);
                    }
                }
                '[' if chars.peek() == Some(&':') => {
                    out.push('[');
                    for inner in chars.by_ref() {
                        out.push(inner);
                        if inner == ']' {
                            break;
                        }
                    }
                }
                ']' if in_class => {
                    in_class = false;
                    out.push(']');
                }
                '#' if extended && !in_class && !out.ends_with("(?") => {
                    for skipped in chars.by_ref() {
                        if skipped == '\n' {
                            break;
                        }
                    }
                    out.push(SEPARATOR);
                }
                ws if ws.is_ascii_whitespace() => {
                    if extended && !in_class {
                        out.push(SEPARATOR);
                    } else {
                        push_hex_escape(&mut out, ws);
                    }
                }
                other => out.push(other),
            }
        }
        out
    }
}

fn push_hex_escape(out: &mut String, c: char) {
    out.push_str(&format!("\\x{:02X}", c as u32));
}
