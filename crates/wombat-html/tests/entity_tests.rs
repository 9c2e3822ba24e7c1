//! Integration tests for character reference decoding.

use quickcheck_macros::quickcheck;
use wombat_html::decode_entities;
use wombat_html::tokenizer::named_character_references::lookup_entity;

/// Helper to decode text content and collect the reported error codes
fn decode(text: &str) -> (String, Vec<&'static str>) {
    let mut codes = Vec::new();
    let decoded = decode_entities(text, false, |code| codes.push(code));
    (decoded, codes)
}

fn decode_attr(text: &str) -> String {
    decode_entities(text, true, |_| {})
}

#[test]
fn test_basic_named_references() {
    assert_eq!(decode("&lt;&gt;&amp;&quot;&apos;").0, "<>&\"'");
}

#[test]
fn test_common_named_references() {
    assert_eq!(decode("&nbsp;&copy;&mdash;&hellip;&euro;").0, "\u{A0}\u{A9}\u{2014}\u{2026}\u{20AC}");
}

#[test]
fn test_legacy_reference_without_semicolon() {
    let (decoded, codes) = decode("&copy 2024");
    assert_eq!(decoded, "\u{A9} 2024");
    assert_eq!(codes, ["missing-semicolon-after-character-reference"]);
}

#[test]
fn test_legacy_prefix_is_longest_match() {
    assert_eq!(decode("&notit;").0, "\u{AC}it;");
}

#[test]
fn test_modern_reference_needs_semicolon() {
    assert_eq!(decode("&hellip").0, "&hellip");
    assert!(lookup_entity("hellip;").is_some());
}

#[test]
fn test_unknown_named_reference() {
    let (decoded, codes) = decode("&nosuchthing;");
    assert_eq!(decoded, "&nosuchthing;");
    assert_eq!(codes, ["unknown-named-character-reference"]);
}

#[test]
fn test_bare_ampersand_is_text() {
    let (decoded, codes) = decode("fish & chips &");
    assert_eq!(decoded, "fish & chips &");
    assert!(codes.is_empty());
}

// ========== Numeric references ==========

#[test]
fn test_decimal_and_hex() {
    assert_eq!(decode("&#65;&#x42;&#X43;").0, "ABC");
}

#[test]
fn test_numeric_without_semicolon() {
    let (decoded, codes) = decode("&#65x");
    assert_eq!(decoded, "Ax");
    assert_eq!(codes, ["missing-semicolon-after-character-reference"]);
}

#[test]
fn test_numeric_without_digits() {
    let (decoded, codes) = decode("&#;&#x;");
    assert_eq!(decoded, "&#;&#x;");
    assert_eq!(
        codes,
        [
            "absence-of-digits-in-numeric-character-reference",
            "absence-of-digits-in-numeric-character-reference"
        ]
    );
}

#[test]
fn test_null_reference() {
    let (decoded, codes) = decode("&#0;");
    assert_eq!(decoded, "\u{FFFD}");
    assert_eq!(codes, ["null-character-reference"]);
}

#[test]
fn test_out_of_range_reference() {
    let (decoded, codes) = decode("&#x110000;&#99999999999999;");
    assert_eq!(decoded, "\u{FFFD}\u{FFFD}");
    assert_eq!(
        codes,
        [
            "character-reference-outside-unicode-range",
            "character-reference-outside-unicode-range"
        ]
    );
}

#[test]
fn test_surrogate_reference() {
    let (decoded, codes) = decode("&#xD800;");
    assert_eq!(decoded, "\u{FFFD}");
    assert_eq!(codes, ["surrogate-character-reference"]);
}

#[test]
fn test_c1_controls_use_windows_1252() {
    let (decoded, codes) = decode("&#x80;&#x99;&#150;");
    assert_eq!(decoded, "\u{20AC}\u{2122}\u{2013}");
    assert_eq!(codes.len(), 3);
    assert!(codes.iter().all(|&code| code == "control-character-reference"));
}

// ========== Attribute values ==========

#[test]
fn test_attribute_legacy_reference_before_equals_kept() {
    assert_eq!(decode_attr("?a=1&copy=2"), "?a=1&copy=2");
    assert_eq!(decode_attr("?a=1&ampx"), "?a=1&ampx");
}

#[test]
fn test_attribute_reference_with_semicolon_decoded() {
    assert_eq!(decode_attr("a&amp;b"), "a&b");
    assert_eq!(decode_attr("&copy;=2"), "\u{A9}=2");
}

#[test]
fn test_attribute_legacy_reference_at_end_decoded() {
    assert_eq!(decode_attr("x&amp"), "x&");
}

// ========== Properties ==========

#[quickcheck]
fn prop_identity_without_ampersand(text: String) -> bool {
    let text = text.replace('&', "");
    decode_entities(&text, false, |_| {}) == text && decode_entities(&text, true, |_| {}) == text
}
