use std::iter::Peekable;
use std::str::Chars;
use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};

const BOM: char = '\u{FEFF}';

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// How a text payload was made safe for splicing into a command string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    /// JSON string-body escaping, spliced into a double-quoted literal.
    RawEscaped,
    /// Base64 of the UTF-8 bytes, spliced into a single-quoted literal.
    Base64,
}

/// Order in which encodings are tried when setting text on the runtime.
pub const FALLBACK_ORDER: [Encoding; 2] = [Encoding::RawEscaped, Encoding::Base64];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPayload {
    pub encoding: Encoding,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Normalize text before it is encoded.
///
/// Strips a leading BOM, drops NUL characters and turns `\r\n` into `\n`.
/// Text that contains the two-character sequence `\n` but no real newline is
/// treated as double-escaped and unescaped once.
pub fn clean(text: &str) -> String {
    let mut cleaned = strip_noise(text);
    if looks_double_escaped(&cleaned) {
        log::debug!(
            "content looks double-escaped, unescaping once ({} chars)",
            cleaned.len()
        );
        cleaned = strip_noise(&unescape_once(&cleaned));
    }
    cleaned
}

fn strip_noise(text: &str) -> String {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    text.replace('\0', "").replace("\r\n", "\n")
}

fn looks_double_escaped(text: &str) -> bool {
    text.contains("\\n") && !text.contains('\n')
}

/// Run a single, non-recursive unescape pass.
///
/// Recognizes `\n \r \t \\ \" \' \/ \0 \b \f \uXXXX \xXX` (including UTF-16
/// surrogate pairs written as two `\u` escapes). Anything else is kept as is.
pub fn unescape_once(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(esc @ ('n' | 'r' | 't' | '\\' | '"' | '\'' | '/' | '0' | 'b' | 'f')) => {
                chars.next();
                out.push(match esc {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '0' => '\0',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    other => other,
                });
            }
            Some('u') => match take_unicode_escape(&mut chars) {
                Some(decoded) => out.push(decoded),
                None => out.push('\\'),
            },
            Some('x') => {
                let mut lookahead = chars.clone();
                lookahead.next();
                match take_hex(&mut lookahead, 2).and_then(char::from_u32) {
                    Some(decoded) => {
                        chars = lookahead;
                        out.push(decoded);
                    }
                    None => out.push('\\'),
                }
            }
            _ => out.push('\\'),
        }
    }

    out
}

/// Consume `uXXXX` (and a following `\uXXXX` low surrogate when needed).
/// Leaves the iterator untouched when the escape is not valid.
fn take_unicode_escape(chars: &mut Peekable<Chars<'_>>) -> Option<char> {
    let mut lookahead = chars.clone();
    lookahead.next();
    let high = take_hex(&mut lookahead, 4)?;

    let decoded = if (0xD800..=0xDBFF).contains(&high) {
        if lookahead.next() != Some('\\') || lookahead.next() != Some('u') {
            return None;
        }
        let low = take_hex(&mut lookahead, 4)?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return None;
        }
        char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))?
    } else {
        char::from_u32(high)?
    };

    *chars = lookahead;
    Some(decoded)
}

fn take_hex(chars: &mut Peekable<Chars<'_>>, len: usize) -> Option<u32> {
    let digits: String = chars.clone().take(len).collect();
    if digits.len() != len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    for _ in 0..len {
        chars.next();
    }
    u32::from_str_radix(&digits, 16).ok()
}

fn base64_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").ok())
        .as_ref()
}

/// Decode content that arrived base64-wrapped.
///
/// Only single-line text that looks like base64 is considered. If decoding
/// fails, or the bytes are not UTF-8, the text is returned unchanged.
pub fn sniff_base64(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || text.contains('\n') {
        return text.to_string();
    }
    let looks_encoded = base64_pattern().is_some_and(|re| re.is_match(trimmed));
    if !looks_encoded {
        return text.to_string();
    }

    match BASE64_STANDARD.decode(trimmed) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(decoded) => {
                log::debug!(
                    "decoded base64-wrapped content ({} -> {} chars)",
                    trimmed.len(),
                    decoded.len()
                );
                decoded
            }
            Err(e) => {
                log::warn!("base64-looking content is not UTF-8, keeping as text: {}", e);
                text.to_string()
            }
        },
        Err(e) => {
            log::warn!("base64-looking content failed to decode, keeping as text: {}", e);
            text.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// Clean `text` and encode it with the given strategy.
pub fn encode(text: &str, encoding: Encoding) -> EncodedPayload {
    encode_cleaned(&clean(text), encoding)
}

/// Encode text that has already been through [`clean`].
pub fn encode_cleaned(cleaned: &str, encoding: Encoding) -> EncodedPayload {
    let body = match encoding {
        Encoding::RawEscaped => escape_string_body(cleaned),
        Encoding::Base64 => BASE64_STANDARD.encode(cleaned.as_bytes()),
    };
    EncodedPayload { encoding, body }
}

/// Reverse [`encode`]. Yields the cleaned text byte-for-byte.
pub fn decode(payload: &EncodedPayload) -> Result<String, String> {
    match payload.encoding {
        Encoding::RawEscaped => serde_json::from_str(&format!("\"{}\"", payload.body))
            .map_err(|e| format!("Invalid escaped payload: {}", e)),
        Encoding::Base64 => {
            let bytes = BASE64_STANDARD
                .decode(payload.body.as_bytes())
                .map_err(|e| format!("Invalid base64 payload: {}", e))?;
            String::from_utf8(bytes).map_err(|e| format!("Base64 payload is not UTF-8: {}", e))
        }
    }
}

/// `text` as a double-quoted JavaScript string literal.
pub fn js_string(text: &str) -> String {
    format!("\"{}\"", escape_string_body(text))
}

fn escape_string_body(text: &str) -> String {
    let quoted = serde_json::to_string(text).unwrap_or_else(|_| String::from("\"\""));
    let body = &quoted[1..quoted.len() - 1];
    // Line/paragraph separators are legal in JSON but break older JS parsers.
    body.replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// Whether a runtime result string reports success.
///
/// Accepts the `success` marker returned by the set-value helpers as well as a
/// bare boolean `true`. Results starting with `error` never count.
pub fn is_success_marker(result: &str) -> bool {
    let trimmed = result.trim().trim_matches('"').to_ascii_lowercase();
    if trimmed.starts_with("error") {
        return false;
    }
    trimmed == "true" || trimmed.contains("success")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<&'static str> {
        vec![
            "",
            "plain text",
            "const s = \"quoted\" + 'single';",
            "C:\\path\\to\\file",
            "line one\nline two\r\nline three",
            "nul\0byte",
            "\u{FEFF}bom first\nsecond",
            "emoji 🎉 and 中文 and é",
            "tabs\tand\u{2028}separators\u{2029}",
            "</script><script>alert(1)</script>",
        ]
    }

    #[test]
    fn round_trip_matches_clean_for_both_encodings() {
        for text in samples() {
            for encoding in FALLBACK_ORDER {
                let payload = encode(text, encoding);
                assert_eq!(
                    decode(&payload).unwrap(),
                    clean(text),
                    "{:?} / {:?}",
                    encoding,
                    text
                );
            }
        }
    }

    #[test]
    fn clean_strips_bom_nul_and_crlf() {
        assert_eq!(clean("\u{FEFF}a\0b\r\nc"), "ab\nc");
    }

    #[test]
    fn clean_keeps_bom_in_the_middle() {
        assert_eq!(clean("a\u{FEFF}b"), "a\u{FEFF}b");
    }

    #[test]
    fn clean_unescapes_double_escaped_content_once() {
        assert_eq!(clean("fn main() {\\n\\tprintln!();\\n}"), "fn main() {\n\tprintln!();\n}");
    }

    #[test]
    fn clean_leaves_escapes_alone_when_real_newlines_exist() {
        let text = "let s = \"a\\nb\";\nnext line";
        assert_eq!(clean(text), text);
    }

    #[test]
    fn unescape_is_not_recursive() {
        assert_eq!(unescape_once("a\\\\nb"), "a\\nb");
    }

    #[test]
    fn unescape_handles_unicode_and_surrogate_pairs() {
        assert_eq!(unescape_once("\\u00e9"), "é");
        assert_eq!(unescape_once("\\ud83c\\udf89"), "🎉");
        assert_eq!(unescape_once("\\x41"), "A");
    }

    #[test]
    fn unescape_keeps_unknown_and_truncated_sequences() {
        assert_eq!(unescape_once("\\q"), "\\q");
        assert_eq!(unescape_once("\\u12"), "\\u12");
        assert_eq!(unescape_once("\\ud83c alone"), "\\ud83c alone");
        assert_eq!(unescape_once("trailing\\"), "trailing\\");
    }

    #[test]
    fn raw_escaped_body_is_safe_inside_a_double_quoted_literal() {
        let payload = encode("say \"hi\"\nand\\leave\u{2028}", Encoding::RawEscaped);
        assert!(!payload.body.contains('\n'));
        assert!(!payload.body.contains('\u{2028}'));
        assert!(!payload.body.replace("\\\"", "").contains('"'));
    }

    #[test]
    fn base64_preserves_multibyte_characters() {
        let payload = encode("héllo 🎉", Encoding::Base64);
        assert_eq!(payload.body, "aMOpbGxvIPCfjok=");
        assert_eq!(decode(&payload).unwrap(), "héllo 🎉");
    }

    #[test]
    fn decode_rejects_malformed_base64() {
        let payload = EncodedPayload {
            encoding: Encoding::Base64,
            body: "not base64!".to_string(),
        };
        assert!(decode(&payload).is_err());
    }

    #[test]
    fn sniff_base64_decodes_wrapped_content() {
        assert_eq!(sniff_base64("Y29uc29sZS5sb2coMSk="), "console.log(1)");
    }

    #[test]
    fn sniff_base64_keeps_text_that_fails_to_decode() {
        assert_eq!(sniff_base64("hello"), "hello");
        assert_eq!(sniff_base64("not base64 at all"), "not base64 at all");
        assert_eq!(sniff_base64("Y29u\nc29sZQ=="), "Y29u\nc29sZQ==");
    }

    #[test]
    fn sniff_base64_keeps_text_when_bytes_are_not_utf8() {
        // "//79" decodes to 0xFF 0xFE 0xFD
        assert_eq!(sniff_base64("//79"), "//79");
    }

    #[test]
    fn success_marker_detection() {
        assert!(is_success_marker("success"));
        assert!(is_success_marker("\"success\""));
        assert!(is_success_marker("true"));
        assert!(!is_success_marker("queued"));
        assert!(!is_success_marker("error: unsuccessful"));
        assert!(!is_success_marker(""));
    }

    #[test]
    fn fallback_order_is_escape_then_base64() {
        assert_eq!(FALLBACK_ORDER, [Encoding::RawEscaped, Encoding::Base64]);
    }

    #[test]
    fn js_string_is_a_quoted_literal() {
        assert_eq!(js_string("say \"hi\"\n"), r#""say \"hi\"\n""#);
        assert_eq!(js_string("a\u{2028}b"), r#""a\u2028b""#);
    }
}
