//! Byte-to-text decoding for HTML documents.
//!
//! [§ 13.2.3 The input byte stream](https://html.spec.whatwg.org/multipage/parsing.html#the-input-byte-stream)
//!
//! The encoding is chosen in this order:
//! 1. A byte order mark (UTF-8, UTF-16LE, UTF-16BE), which is stripped.
//! 2. The transport-layer label (e.g. from a `Content-Type` header).
//! 3. A `<meta charset>` or `<meta http-equiv="content-type">` declaration
//!    found by prescanning the first bytes of the document.
//! 4. windows-1252.
//!
//! Decoding itself is delegated to `encoding_rs` and is lossy: malformed
//! sequences become U+FFFD.

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};
use thiserror::Error;

/// [§ 13.2.3.2 Determining the character encoding](https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding)
/// "the user agent may ... examine the first 1024 bytes"
const MAX_NON_COMMENT_BYTES: usize = 1024;

/// Upper bound on bytes scanned, counting bytes inside comments.
const MAX_TOTAL_SCAN: usize = 65536;

/// Result of decoding a byte stream.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// The decoded document text, without any byte order mark.
    pub text: String,
    /// The encoding that was used.
    pub encoding: &'static Encoding,
    /// True if malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Errors from [`decode_with_label`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The label does not name an encoding.
    #[error("unknown encoding label '{0}'")]
    UnknownLabel(String),
    /// The bytes are not valid in the requested encoding.
    #[error("input is not valid {encoding}")]
    Malformed {
        /// Canonical name of the encoding that rejected the input.
        encoding: &'static str,
    },
}

/// Decode `bytes` using BOM, transport label, and `<meta>` prescan precedence.
#[must_use]
pub fn decode(bytes: &[u8], transport_encoding: Option<&str>) -> Decoded {
    let (bom_encoding, bom_len) = match sniff_bom(bytes) {
        Some((encoding, len)) => (Some(encoding), len),
        None => (None, 0),
    };

    let encoding = bom_encoding
        .or_else(|| transport_encoding.and_then(normalize_encoding_label))
        .or_else(|| prescan_for_meta_charset(bytes))
        .unwrap_or(WINDOWS_1252);

    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
    Decoded {
        text: text.into_owned(),
        encoding,
        had_errors,
    }
}

/// Decode `bytes` with an explicitly named encoding, rejecting malformed input.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownLabel`] if `label` names no encoding, and
/// [`DecodeError::Malformed`] if the bytes do not decode cleanly.
pub fn decode_with_label(bytes: &[u8], label: &str) -> Result<String, DecodeError> {
    let encoding =
        normalize_encoding_label(label).ok_or_else(|| DecodeError::UnknownLabel(label.to_string()))?;
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(std::borrow::Cow::into_owned)
        .ok_or(DecodeError::Malformed {
            encoding: encoding.name(),
        })
}

/// Map a label to an encoding. UTF-7 is never honored and maps to windows-1252.
#[must_use]
pub fn normalize_encoding_label(label: &str) -> Option<&'static Encoding> {
    let normalized = label.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if matches!(normalized.as_str(), "utf-7" | "utf7" | "x-utf-7") {
        return Some(WINDOWS_1252);
    }
    Encoding::for_label(normalized.as_bytes())
}

/// A `<meta>`-declared UTF-16 variant means the document is really UTF-8.
fn normalize_meta_declared_encoding(label: &[u8]) -> Option<&'static Encoding> {
    let label = std::str::from_utf8(label).ok()?;
    let encoding = normalize_encoding_label(label)?;
    if encoding == UTF_16LE || encoding == UTF_16BE {
        return Some(UTF_8);
    }
    Some(encoding)
}

/// Detect a byte order mark, returning the encoding and the BOM length.
#[must_use]
pub fn sniff_bom(bytes: &[u8]) -> Option<(&'static Encoding, usize)> {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => Some((UTF_8, 3)),
        [0xFF, 0xFE, ..] => Some((UTF_16LE, 2)),
        [0xFE, 0xFF, ..] => Some((UTF_16BE, 2)),
        _ => None,
    }
}

const fn is_ascii_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn skip_whitespace(data: &[u8], mut i: usize) -> usize {
    while i < data.len() && is_ascii_whitespace(data[i]) {
        i += 1;
    }
    i
}

fn find_bytes(data: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    data.get(start..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + start)
}

/// Returns the index just past the closing `>` of a tag, honoring quotes.
fn find_tag_end(data: &[u8], mut i: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    while i < data.len() {
        let b = data[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(i + 1),
            None => {}
        }
        i += 1;
    }
    None
}

/// [§ 13.2.3.2 Prescan a byte stream to determine its encoding](https://html.spec.whatwg.org/multipage/parsing.html#prescan-a-byte-stream-to-determine-its-encoding)
#[must_use]
pub fn prescan_for_meta_charset(data: &[u8]) -> Option<&'static Encoding> {
    let n = data.len();
    let mut i = 0;
    let mut non_comment = 0;

    while i < n && i < MAX_TOTAL_SCAN && non_comment < MAX_NON_COMMENT_BYTES {
        if data[i] != b'<' {
            i += 1;
            non_comment += 1;
            continue;
        }

        // Comments are skipped whole and don't count against the budget.
        if data[i..].starts_with(b"<!--") {
            let end = find_bytes(data, b"-->", i + 4)?;
            i = end + 3;
            continue;
        }

        let j = i + 1;
        if data.get(j) == Some(&b'/') {
            let end = find_tag_end(data, i + 2)?;
            non_comment += end - i;
            i = end;
            continue;
        }

        if !data.get(j).is_some_and(u8::is_ascii_alphabetic) {
            i += 1;
            non_comment += 1;
            continue;
        }

        let mut name_end = j + 1;
        while name_end < n && (data[name_end].is_ascii_alphabetic() || data[name_end] == b'-') {
            name_end += 1;
        }
        let end = find_tag_end(data, name_end)?;

        if data[j..name_end].eq_ignore_ascii_case(b"meta") {
            if let Some(encoding) = extract_charset_from_meta(&data[name_end..end]) {
                return Some(encoding);
            }
        }

        non_comment += end - i;
        i = end;
    }

    None
}

/// Lowercase ASCII letters and turn every whitespace byte into a space.
fn fold_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .map(|&b| if is_ascii_whitespace(b) { b' ' } else { b.to_ascii_lowercase() })
        .collect()
}

/// [§ 2.5.5 Extracting character encodings from meta elements](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#algorithm-for-extracting-a-character-encoding-from-a-meta-element)
fn extract_charset_from_content(content: &[u8]) -> Option<Vec<u8>> {
    let s = fold_bytes(content);
    let idx = find_bytes(&s, b"charset", 0)?;
    let mut i = skip_whitespace(&s, idx + b"charset".len());
    if s.get(i) != Some(&b'=') {
        return None;
    }
    i = skip_whitespace(&s, i + 1);

    let quote = match s.get(i) {
        Some(&q @ (b'"' | b'\'')) => {
            i += 1;
            Some(q)
        }
        Some(_) => None,
        None => return None,
    };

    let start = i;
    while i < s.len() {
        let b = s[i];
        match quote {
            Some(q) if b == q => break,
            None if is_ascii_whitespace(b) || b == b';' => break,
            _ => i += 1,
        }
    }

    if quote.is_some() && s.get(i) != quote.as_ref() {
        return None;
    }
    Some(s[start..i].to_vec())
}

fn extract_charset_from_meta(tag_content: &[u8]) -> Option<&'static Encoding> {
    let lower = fold_bytes(tag_content);
    let n = lower.len();
    let mut i = 0;
    let mut got_pragma = false;
    let mut need_pragma = false;
    let mut charset: Option<Vec<u8>> = None;

    while i < n {
        i = skip_whitespace(&lower, i);
        if i >= n {
            break;
        }
        if !lower[i].is_ascii_alphabetic() {
            i += 1;
            continue;
        }

        let attr_start = i;
        i += 1;
        while i < n && (lower[i].is_ascii_alphabetic() || lower[i] == b'-') {
            i += 1;
        }
        let attr_name = &lower[attr_start..i];

        i = skip_whitespace(&lower, i);
        if lower.get(i) != Some(&b'=') {
            continue;
        }
        i = skip_whitespace(&lower, i + 1);
        if i >= n {
            break;
        }

        let value = if lower[i] == b'"' || lower[i] == b'\'' {
            let quote = lower[i];
            i += 1;
            let start = i;
            while i < n && lower[i] != quote {
                i += 1;
            }
            let value = &tag_content[start..i];
            if i < n {
                i += 1;
            }
            value
        } else {
            let start = i;
            while i < n && !is_ascii_whitespace(lower[i]) {
                i += 1;
            }
            &tag_content[start..i]
        };

        if value.is_empty() {
            continue;
        }

        match attr_name {
            b"http-equiv" => {
                if value.trim_ascii().eq_ignore_ascii_case(b"content-type") {
                    got_pragma = true;
                }
            }
            b"content" => {
                if let Some(declared) = extract_charset_from_content(value) {
                    charset = Some(declared);
                    need_pragma = true;
                }
            }
            b"charset" => {
                charset = Some(value.to_vec());
                need_pragma = false;
            }
            _ => {}
        }
    }

    let charset = charset?;
    let encoding = normalize_meta_declared_encoding(charset.trim_ascii())?;
    if need_pragma && !got_pragma {
        return None;
    }
    Some(encoding)
}
