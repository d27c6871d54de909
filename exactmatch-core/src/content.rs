//! Decoder for `content:"…"` signatures.
//!
//! A content signature is literal text with optional `|…|` spans holding
//! whitespace separated hexadecimal byte values, e.g. `ab|63 0d 0a|de`.
//! Decoding maps every input character to exactly one output byte, so a
//! literal `é` (U+00E9) is the byte 0xe9 and never its UTF-8 encoding.
//! Characters above U+00FF have no single-byte form and discard the signature.
//!
//! License: MIT OR APACHE 2.0

use log::debug;

use crate::errors::ExtractError;

const HEX_SPAN_DELIMITER: char = '|';
const ESCAPE: char = '\\';

/// The byte a character stands for in ISO-8859-1 text.
pub(crate) fn latin1_byte(c: char) -> Option<u8> {
    u8::try_from(c).ok()
}

/// Decodes a (lower-cased) content signature into its exact byte sequence.
///
/// The text is read as ISO-8859-1: every character outside a hex span becomes
/// the single byte of the same value. Outside hex spans a backslash escapes
/// the following character, which is how the rule language writes a literal
/// `"`, `;`, `\` or `|`. Offsets in errors are character offsets.
pub fn decode_content(text: &str) -> Result<Vec<u8>, ExtractError> {
    if text.is_empty() {
        return Err(ExtractError::EmptySignature);
    }

    let chars: Vec<char> = text.chars().collect();
    let mut decoded = Vec::with_capacity(chars.len());
    let mut pos = 0;

    let single_byte = |offset: usize, character: char| {
        latin1_byte(character).ok_or(ExtractError::UnencodableCharacter { offset, character })
    };

    while pos < chars.len() {
        match chars[pos] {
            ESCAPE if pos + 1 < chars.len() => {
                decoded.push(single_byte(pos + 1, chars[pos + 1])?);
                pos += 2;
            }
            HEX_SPAN_DELIMITER => {
                let close = chars[pos + 1..]
                    .iter()
                    .position(|&c| c == HEX_SPAN_DELIMITER)
                    .map(|rel| pos + 1 + rel)
                    .ok_or(ExtractError::UnterminatedHexSpan { offset: pos })?;
                let span: String = chars[pos + 1..close].iter().collect();
                decode_hex_span(&span, pos, &mut decoded)?;
                pos = close + 1;
            }
            other => {
                decoded.push(single_byte(pos, other)?);
                pos += 1;
            }
        }
    }

    debug!("Decoded content signature of {} chars into {} bytes.", chars.len(), decoded.len());
    Ok(decoded)
}

/// Decodes a content signature into its fragment list.
///
/// Content signatures have no internal ambiguity, so the list always holds
/// exactly one fragment: the whole decoded signature.
pub fn content_fragments(text: &str) -> Result<Vec<Vec<u8>>, ExtractError> {
    decode_content(text).map(|bytes| vec![bytes])
}

fn decode_hex_span(span: &str, offset: usize, out: &mut Vec<u8>) -> Result<(), ExtractError> {
    let malformed = || ExtractError::MalformedHexSpan {
        offset,
        span: span.to_string(),
    };

    let mut digits = Vec::with_capacity(span.len());
    for b in span.bytes() {
        if b.is_ascii_hexdigit() {
            digits.push(b);
        } else if !b.is_ascii_whitespace() {
            return Err(malformed());
        }
    }

    if digits.len() % 2 != 0 {
        return Err(malformed());
    }

    let decoded = hex::decode(&digits).map_err(|_| malformed())?;
    out.extend_from_slice(&decoded);
    Ok(())
}

fn is_literal_safe(b: u8) -> bool {
    (b.is_ascii_graphic() || b == b' ')
        && !b.is_ascii_uppercase()
        && !matches!(b, b'|' | b'"' | b';' | b'\\')
}

/// Renders bytes back into content notation.
///
/// Uppercase letters are hex encoded as well, so the result survives the
/// lower-casing that precedes decoding.
pub fn encode_content(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    let mut pending: Vec<u8> = Vec::new();

    for &b in bytes {
        if is_literal_safe(b) {
            flush_hex_span(&mut pending, &mut encoded);
            encoded.push(b as char);
        } else {
            pending.push(b);
        }
    }
    flush_hex_span(&mut pending, &mut encoded);
    encoded
}

fn flush_hex_span(pending: &mut Vec<u8>, out: &mut String) {
    if pending.is_empty() {
        return;
    }
    let span = pending
        .iter()
        .map(|b| hex::encode([*b]))
        .collect::<Vec<_>>()
        .join(" ");
    out.push('|');
    out.push_str(&span);
    out.push('|');
    pending.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mixed_literal_and_hex() {
        assert_eq!(decode_content("ab|63|de").unwrap(), b"abcde".to_vec());
    }

    #[test]
    fn test_decode_multiple_bytes_in_span() {
        assert_eq!(decode_content("get|20 2f|index").unwrap(), b"get /index".to_vec());
        assert_eq!(decode_content("|0d0a|").unwrap(), vec![0x0d, 0x0a]);
    }

    #[test]
    fn test_high_bytes_stay_single_byte() {
        let decoded = decode_content("|ff fe 80|x").unwrap();
        assert_eq!(decoded, vec![0xff, 0xfe, 0x80, b'x']);
        assert_eq!(decoded.len(), 4);
    }

    #[test]
    fn test_latin1_text_is_one_byte_per_char() {
        let decoded = decode_content("caf\u{e9}|20|\u{ff}").unwrap();
        assert_eq!(decoded, vec![b'c', b'a', b'f', 0xe9, b' ', 0xff]);
    }

    #[test]
    fn test_char_above_latin1_is_rejected() {
        let err = decode_content("ab\u{263a}").unwrap_err();
        assert_eq!(
            err,
            ExtractError::UnencodableCharacter {
                offset: 2,
                character: '\u{263a}'
            }
        );
        assert_eq!(err.kind(), "UnencodableCharacter");
    }

    #[test]
    fn test_odd_digit_count_is_malformed() {
        let err = decode_content("ab|6|de").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedHexSpan { offset: 2, .. }));
    }

    #[test]
    fn test_non_hex_char_is_malformed() {
        let err = decode_content("|0g|").unwrap_err();
        assert_eq!(err.kind(), "MalformedHexSpan");
    }

    #[test]
    fn test_unterminated_span() {
        let err = decode_content("abc|41 42").unwrap_err();
        assert_eq!(err, ExtractError::UnterminatedHexSpan { offset: 3 });
    }

    #[test]
    fn test_escaped_pipe_is_literal() {
        assert_eq!(decode_content("a\\|b").unwrap(), b"a|b".to_vec());
        assert_eq!(decode_content("say \\\"hi\\\"").unwrap(), b"say \"hi\"".to_vec());
    }

    #[test]
    fn test_empty_signature() {
        assert_eq!(decode_content("").unwrap_err(), ExtractError::EmptySignature);
    }

    #[test]
    fn test_empty_span_decodes_to_nothing() {
        assert_eq!(decode_content("a||b").unwrap(), b"ab".to_vec());
    }

    #[test]
    fn test_content_fragments_is_single_fragment() {
        let frags = content_fragments("user |3a| admin").unwrap();
        assert_eq!(frags, vec![b"user : admin".to_vec()]);
    }

    #[test]
    fn test_reencode_then_decode_is_identity() {
        let original = decode_content("ab|63|de").unwrap();
        let encoded = encode_content(&original);
        assert_eq!(decode_content(&encoded).unwrap(), original);

        let awkward: Vec<u8> = vec![0x00, b'|', b'A', b'"', b';', b'\\', 0xff, b' ', b'z'];
        let encoded = encode_content(&awkward);
        assert_eq!(decode_content(&encoded.to_lowercase()).unwrap(), awkward);
    }

    #[test]
    fn test_encode_groups_consecutive_bytes() {
        assert_eq!(encode_content(&[b'a', 0x0d, 0x0a, b'b']), "a|0d 0a|b");
        assert_eq!(encode_content(b"Host"), "|48|ost");
    }
}
