//! Tests for byte-stream decoding precedence: BOM, transport label, meta prescan.

use encoding_rs::{ISO_8859_2, UTF_8, UTF_16LE, WINDOWS_1252};
use wombat_common::encoding::{
    DecodeError, decode, decode_with_label, normalize_encoding_label, prescan_for_meta_charset,
};

// ========== BOM ==========

#[test]
fn test_utf8_bom_wins_and_is_stripped() {
    let bytes = b"\xEF\xBB\xBF<p>caf\xC3\xA9</p>";
    let decoded = decode(bytes, Some("windows-1252"));
    assert_eq!(decoded.encoding, UTF_8);
    assert_eq!(decoded.text, "<p>café</p>");
}

#[test]
fn test_utf16le_bom() {
    let bytes = [0xFF, 0xFE, b'h', 0, b'i', 0];
    let decoded = decode(&bytes, None);
    assert_eq!(decoded.encoding, UTF_16LE);
    assert_eq!(decoded.text, "hi");
}

// ========== transport ==========

#[test]
fn test_transport_label_beats_meta() {
    let bytes = b"<meta charset=\"iso-8859-2\"><p>x</p>";
    let decoded = decode(bytes, Some("utf-8"));
    assert_eq!(decoded.encoding, UTF_8);
}

#[test]
fn test_unknown_transport_label_falls_through_to_meta() {
    let bytes = b"<meta charset=\"iso-8859-2\">";
    let decoded = decode(bytes, Some("no-such-encoding"));
    assert_eq!(decoded.encoding, ISO_8859_2);
}

#[test]
fn test_utf7_is_never_honored() {
    assert_eq!(normalize_encoding_label(" UTF-7 "), Some(WINDOWS_1252));
}

// ========== meta prescan ==========

#[test]
fn test_meta_charset_attribute() {
    let bytes = b"<!doctype html><html><head><meta charset='utf-8'></head>";
    assert_eq!(prescan_for_meta_charset(bytes), Some(UTF_8));
}

#[test]
fn test_meta_http_equiv_content_type() {
    let bytes =
        b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=iso-8859-2\">";
    assert_eq!(prescan_for_meta_charset(bytes), Some(ISO_8859_2));
}

#[test]
fn test_meta_content_without_pragma_is_ignored() {
    let bytes = b"<meta content=\"text/html; charset=iso-8859-2\">";
    assert_eq!(prescan_for_meta_charset(bytes), None);
}

#[test]
fn test_meta_inside_comment_is_ignored() {
    let bytes = b"<!-- <meta charset=\"iso-8859-2\"> --><p>hi</p>";
    assert_eq!(prescan_for_meta_charset(bytes), None);
}

#[test]
fn test_meta_declared_utf16_means_utf8() {
    let bytes = b"<meta charset=\"utf-16le\">";
    assert_eq!(prescan_for_meta_charset(bytes), Some(UTF_8));
}

#[test]
fn test_meta_beyond_scan_window_is_ignored() {
    let mut bytes = vec![b'x'; 2000];
    bytes.extend_from_slice(b"<meta charset=\"utf-8\">");
    assert_eq!(prescan_for_meta_charset(&bytes), None);
}

// ========== fallback ==========

#[test]
fn test_default_is_windows_1252() {
    let decoded = decode(b"caf\xE9", None);
    assert_eq!(decoded.encoding, WINDOWS_1252);
    assert_eq!(decoded.text, "café");
    assert!(!decoded.had_errors);
}

#[test]
fn test_malformed_utf8_is_replaced() {
    let decoded = decode(b"a\xFFb", Some("utf-8"));
    assert_eq!(decoded.text, "a\u{FFFD}b");
    assert!(decoded.had_errors);
}

// ========== decode_with_label ==========

#[test]
fn test_decode_with_label_rejects_unknown_label() {
    assert_eq!(
        decode_with_label(b"x", "klingon"),
        Err(DecodeError::UnknownLabel("klingon".to_string()))
    );
}

#[test]
fn test_decode_with_label_rejects_malformed_input() {
    assert_eq!(
        decode_with_label(b"a\xFF", "utf-8"),
        Err(DecodeError::Malformed { encoding: "UTF-8" })
    );
}
