//! MIME decoding utilities.
//!
//! Base64, Quoted-Printable, and RFC 2047 encoded-word header decoding.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Decodes Quoted-Printable text (RFC 2045) to raw bytes.
///
/// Soft line breaks (`=` at end of line) are removed; `=XX` escapes become
/// single bytes.
///
/// # Errors
///
/// Returns an error on an invalid or truncated escape sequence.
pub fn decode_quoted_printable_bytes(text: &str) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '=' {
            // Soft line break
            if chars.peek() == Some(&'\r') {
                chars.next();
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    continue;
                }
            } else if chars.peek() == Some(&'\n') {
                chars.next();
                continue;
            }

            let hex: String = chars.by_ref().take(2).collect();
            if hex.len() == 2 {
                let byte = u8::from_str_radix(&hex, 16)
                    .map_err(|e| Error::InvalidEncoding(format!("Invalid hex: {e}")))?;
                result.push(byte);
            } else {
                return Err(Error::InvalidEncoding(
                    "Incomplete escape sequence".to_string(),
                ));
            }
        } else {
            let mut buf = [0u8; 4];
            result.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }

    Ok(result)
}

/// Decodes Quoted-Printable text to a string.
///
/// # Errors
///
/// Returns an error on invalid escapes or non-UTF-8 output.
pub fn decode_quoted_printable(text: &str) -> Result<String> {
    String::from_utf8(decode_quoted_printable_bytes(text)?).map_err(Into::into)
}

/// Decodes a header containing RFC 2047 encoded words.
///
/// Handles multiple encoded words with mixed charsets/encodings in one
/// header; whitespace between adjacent encoded words is dropped per the
/// RFC. Anything that fails to decode is left as the raw text; this
/// function never fails.
#[must_use]
pub fn decode_header(raw: &str) -> String {
    let mut out = String::new();
    let mut rest = raw;
    let mut prev_was_encoded = false;

    loop {
        let Some(start) = rest.find("=?") else {
            out.push_str(rest);
            break;
        };

        let (gap, tail) = rest.split_at(start);
        if let Some((decoded, consumed)) = parse_encoded_word(tail) {
            // Separating whitespace between two encoded words is not
            // part of the text.
            if !(prev_was_encoded && gap.chars().all(char::is_whitespace)) {
                out.push_str(gap);
            }
            out.push_str(&decoded);
            rest = &tail[consumed..];
            prev_was_encoded = true;
        } else {
            out.push_str(gap);
            out.push_str("=?");
            rest = &tail[2..];
            prev_was_encoded = false;
        }
    }

    out
}

/// Parses one `=?charset?encoding?text?=` word at the start of the input.
///
/// Returns the decoded text and the byte length consumed, or `None` if the
/// input is not a decodable encoded word.
fn parse_encoded_word(s: &str) -> Option<(String, usize)> {
    let inner = s.strip_prefix("=?")?;

    let q1 = inner.find('?')?;
    let charset = &inner[..q1];

    let after_charset = &inner[q1 + 1..];
    let q2 = after_charset.find('?')?;
    let encoding = &after_charset[..q2];

    let after_encoding = &after_charset[q2 + 1..];
    let end = after_encoding.find("?=")?;
    let text = &after_encoding[..end];

    let bytes = match encoding.to_uppercase().as_str() {
        "B" => decode_base64(text).ok()?,
        // Q encoding: underscore means space
        "Q" => decode_quoted_printable_bytes(&text.replace('_', " ")).ok()?,
        _ => return None,
    };

    let decoded = decode_charset(charset, &bytes)?;
    let consumed = 2 + q1 + 1 + q2 + 1 + end + 2;
    Some((decoded, consumed))
}

/// Converts decoded bytes to a string per the declared charset.
fn decode_charset(charset: &str, bytes: &[u8]) -> Option<String> {
    match charset.to_lowercase().as_str() {
        "utf-8" | "utf8" | "us-ascii" | "ascii" => String::from_utf8(bytes.to_vec()).ok(),
        // Latin-1 bytes map 1:1 onto the first 256 code points
        "iso-8859-1" | "latin1" => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        _ => Some(String::from_utf8_lossy(bytes).into_owned()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_decode() {
        assert_eq!(decode_base64("SGVsbG8=").unwrap(), b"Hello");
        assert!(decode_base64("not base64!!").is_err());
    }

    #[test]
    fn test_quoted_printable_decode() {
        assert_eq!(
            decode_quoted_printable("H=C3=A9llo").unwrap(),
            "H\u{e9}llo"
        );
        assert_eq!(decode_quoted_printable("plain text").unwrap(), "plain text");
    }

    #[test]
    fn test_quoted_printable_soft_break() {
        assert_eq!(
            decode_quoted_printable("long =\r\nline").unwrap(),
            "long line"
        );
        assert_eq!(decode_quoted_printable("long =\nline").unwrap(), "long line");
    }

    #[test]
    fn test_quoted_printable_truncated_escape() {
        assert!(decode_quoted_printable("bad =4").is_err());
        assert!(decode_quoted_printable("bad =ZZ").is_err());
    }

    #[test]
    fn test_decode_header_plain_passthrough() {
        assert_eq!(decode_header("Hello, World"), "Hello, World");
    }

    #[test]
    fn test_decode_header_base64_word() {
        // "Héllo" in UTF-8 Base64
        assert_eq!(decode_header("=?utf-8?B?SMOpbGxv?="), "H\u{e9}llo");
    }

    #[test]
    fn test_decode_header_q_word() {
        assert_eq!(decode_header("=?utf-8?Q?H=C3=A9llo_World?="), "H\u{e9}llo World");
    }

    #[test]
    fn test_decode_header_latin1() {
        // 0xE9 is é in ISO-8859-1
        assert_eq!(decode_header("=?iso-8859-1?Q?caf=E9?="), "caf\u{e9}");
    }

    #[test]
    fn test_decode_header_multiple_words() {
        // Whitespace between adjacent encoded words is dropped
        assert_eq!(
            decode_header("=?utf-8?B?SMOpbGxv?= =?utf-8?Q?World?="),
            "H\u{e9}lloWorld"
        );
    }

    #[test]
    fn test_decode_header_mixed_content() {
        assert_eq!(
            decode_header("Re: =?utf-8?Q?caf=C3=A9?= meeting"),
            "Re: caf\u{e9} meeting"
        );
    }

    #[test]
    fn test_decode_header_degrades_to_raw() {
        // Unknown encoding letter: left untouched
        assert_eq!(decode_header("=?utf-8?X?abc?="), "=?utf-8?X?abc?=");
        // Truncated word: left untouched
        assert_eq!(decode_header("=?utf-8?B?SGVsbG8"), "=?utf-8?B?SGVsbG8");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Header decoding never fails, whatever the input looks like.
            #[test]
            fn decode_header_total(input in "\\PC{0,64}") {
                let _ = decode_header(&input);
            }

            /// Headers without encoded words pass through verbatim.
            #[test]
            fn plain_headers_untouched(input in "[a-zA-Z0-9 .,:;@<>-]{0,64}") {
                prop_assert_eq!(decode_header(&input), input);
            }
        }
    }
}
