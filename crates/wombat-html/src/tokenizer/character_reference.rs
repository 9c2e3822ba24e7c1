//! Character reference decoding.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! The tokenizer does not run the character reference states inline. Text
//! and attribute values are buffered raw and decoded here in one pass when
//! the buffer is flushed or the attribute is committed.

use super::named_character_references::{longest_legacy_prefix, lookup_entity, MAX_ENTITY_NAME_LEN};

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column of that row."
const C1_REPLACEMENTS: [(u32, char); 27] = [
    (0x80, '\u{20AC}'),
    (0x82, '\u{201A}'),
    (0x83, '\u{0192}'),
    (0x84, '\u{201E}'),
    (0x85, '\u{2026}'),
    (0x86, '\u{2020}'),
    (0x87, '\u{2021}'),
    (0x88, '\u{02C6}'),
    (0x89, '\u{2030}'),
    (0x8A, '\u{0160}'),
    (0x8B, '\u{2039}'),
    (0x8C, '\u{0152}'),
    (0x8E, '\u{017D}'),
    (0x91, '\u{2018}'),
    (0x92, '\u{2019}'),
    (0x93, '\u{201C}'),
    (0x94, '\u{201D}'),
    (0x95, '\u{2022}'),
    (0x96, '\u{2013}'),
    (0x97, '\u{2014}'),
    (0x98, '\u{02DC}'),
    (0x99, '\u{2122}'),
    (0x9A, '\u{0161}'),
    (0x9B, '\u{203A}'),
    (0x9C, '\u{0153}'),
    (0x9E, '\u{017E}'),
    (0x9F, '\u{0178}'),
];

/// Decode every character reference in `text`.
///
/// `in_attribute` selects the attribute-value rule for semicolon-less legacy
/// references: one followed by `=` or an ASCII alphanumeric is left alone.
/// `report` receives the WHATWG error code of each malformed reference.
///
/// Text without `&` is returned unchanged.
///
/// ```
/// use wombat_html::tokenizer::character_reference::decode_entities;
///
/// assert_eq!(decode_entities("a &lt; b", false, |_| {}), "a < b");
/// assert_eq!(decode_entities("?a=1&copy=2", true, |_| {}), "?a=1&copy=2");
/// ```
pub fn decode_entities(text: &str, in_attribute: bool, mut report: impl FnMut(&'static str)) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let consumed = if after.starts_with('#') {
            decode_numeric(after, &mut out, &mut report)
        } else {
            decode_named(after, in_attribute, &mut out, &mut report)
        };
        match consumed {
            Some(len) => rest = &after[len..],
            None => {
                // "Flush code points consumed as a character reference."
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
///
/// Returns how many bytes after the `&` were consumed, or `None` when the
/// ampersand stays literal.
fn decode_named(
    after: &str,
    in_attribute: bool,
    out: &mut String,
    report: &mut impl FnMut(&'static str),
) -> Option<usize> {
    let run_len = after
        .bytes()
        .take_while(u8::is_ascii_alphanumeric)
        .count();
    if run_len == 0 {
        return None;
    }
    let run = &after[..run_len];

    if run_len <= MAX_ENTITY_NAME_LEN
        && after[run_len..].starts_with(';')
        && let Some(value) = lookup_entity(&after[..=run_len])
    {
        out.push_str(value);
        return Some(run_len + 1);
    }

    if let Some((len, value)) = longest_legacy_prefix(run) {
        // "If the character reference was consumed as part of an attribute, and
        // the last character matched is not a U+003B SEMICOLON character (;),
        // and the next input character is either a U+003D EQUALS SIGN character
        // (=) or an ASCII alphanumeric, then, for historical reasons, flush code
        // points consumed as a character reference"
        let next = after[len..].chars().next();
        if in_attribute && next.is_some_and(|c| c == '=' || c.is_ascii_alphanumeric()) {
            return None;
        }
        report("missing-semicolon-after-character-reference");
        out.push_str(value);
        return Some(len);
    }

    // [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    // "U+003B SEMICOLON (;) - This is an unknown-named-character-reference parse error."
    if after[run_len..].starts_with(';') {
        report("unknown-named-character-reference");
    }
    None
}

/// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
///
/// `after` starts with `#`.
fn decode_numeric(after: &str, out: &mut String, report: &mut impl FnMut(&'static str)) -> Option<usize> {
    let body = &after[1..];
    let (radix, prefix_len) = match body.as_bytes().first() {
        Some(b'x' | b'X') => (16, 2),
        _ => (10, 1),
    };
    let digits = &after[prefix_len..];
    let digit_len = digits
        .bytes()
        .take_while(|b| char::from(*b).is_digit(radix))
        .count();

    // "This is an absence-of-digits-in-numeric-character-reference parse
    // error. Flush code points consumed as a character reference."
    if digit_len == 0 {
        report("absence-of-digits-in-numeric-character-reference");
        return None;
    }

    // Saturate instead of overflowing; anything past U+10FFFF is replaced anyway.
    let code = digits[..digit_len]
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0u32, |acc, d| acc.saturating_mul(radix).saturating_add(d));

    let mut consumed = prefix_len + digit_len;
    if digits[digit_len..].starts_with(';') {
        consumed += 1;
    } else {
        report("missing-semicolon-after-character-reference");
    }

    out.push(resolve_code_point(code, report));
    Some(consumed)
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
fn resolve_code_point(code: u32, report: &mut impl FnMut(&'static str)) -> char {
    // "If the number is 0x00, then this is a null-character-reference parse
    // error. Set the character reference code to 0xFFFD."
    if code == 0 {
        report("null-character-reference");
        return '\u{FFFD}';
    }
    // "If the number is greater than 0x10FFFF, then this is a
    // character-reference-outside-unicode-range parse error."
    if code > 0x0010_FFFF {
        report("character-reference-outside-unicode-range");
        return '\u{FFFD}';
    }
    // "If the number is a surrogate, then this is a
    // surrogate-character-reference parse error."
    let Some(c) = char::from_u32(code) else {
        report("surrogate-character-reference");
        return '\u{FFFD}';
    };
    if is_noncharacter(c) {
        report("noncharacter-character-reference");
        return c;
    }
    // "If the number is 0x0D, or a control that's not ASCII whitespace, then
    // this is a control-character-reference parse error."
    if code == 0x0D || (c.is_control() && !c.is_ascii_whitespace()) {
        report("control-character-reference");
        if let Some(&(_, replacement)) = C1_REPLACEMENTS.iter().find(|(from, _)| *from == code) {
            return replacement;
        }
    }
    c
}

/// [Noncharacter](https://infra.spec.whatwg.org/#noncharacter): U+FDD0 to
/// U+FDEF, and the last two code points of every plane.
#[must_use]
pub const fn is_noncharacter(c: char) -> bool {
    let code = c as u32;
    matches!(code, 0xFDD0..=0xFDEF) || (code & 0xFFFE) == 0xFFFE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_collecting(text: &str, in_attribute: bool) -> (String, Vec<&'static str>) {
        let mut codes = Vec::new();
        let decoded = decode_entities(text, in_attribute, |code| codes.push(code));
        (decoded, codes)
    }

    #[test]
    fn test_c1_control_remapped() {
        let (decoded, codes) = decode_collecting("&#x80;&#150;", false);
        assert_eq!(decoded, "\u{20AC}\u{2013}");
        assert_eq!(codes, vec!["control-character-reference"; 2]);
    }

    #[test]
    fn test_unmapped_c1_kept() {
        let (decoded, _) = decode_collecting("&#x81;", false);
        assert_eq!(decoded, "\u{81}");
    }

    #[test]
    fn test_noncharacter_detection() {
        assert!(is_noncharacter('\u{FDD0}'));
        assert!(is_noncharacter('\u{FFFF}'));
        assert!(is_noncharacter('\u{1FFFE}'));
        assert!(!is_noncharacter('a'));
    }

    #[test]
    fn test_huge_number_saturates() {
        let (decoded, codes) = decode_collecting("&#99999999999999999999;", false);
        assert_eq!(decoded, "\u{FFFD}");
        assert_eq!(codes, vec!["character-reference-outside-unicode-range"]);
    }
}
