//! Integration tests for the HTML tokenizer.

use quickcheck_macros::quickcheck;
use wombat_html::{InitialState, ParseError, Token, TokenizerOpts, tokenize};

/// Helper to tokenize a string and return the tokens
fn tokens(input: &str) -> Vec<Token> {
    tokenize(input, &TokenizerOpts::default()).0
}

/// Helper to tokenize with error collection and return the error codes
fn error_codes(input: &str) -> Vec<String> {
    let (_, errors) = tokenize(input, &TokenizerOpts::default().with_collect_errors(true));
    errors.into_iter().map(|e| e.code).collect()
}

fn errors(input: &str, opts: TokenizerOpts) -> Vec<ParseError> {
    tokenize(input, &opts.with_collect_errors(true)).1
}

fn text(s: &str) -> Token {
    Token::CharacterRun {
        text: s.to_string(),
    }
}

fn end_tag(name: &str) -> Token {
    Token::EndTag {
        name: name.to_string(),
    }
}

#[test]
fn test_plain_text_is_one_run() {
    assert_eq!(tokens("Hello"), vec![text("Hello"), Token::EndOfInput]);
}

#[test]
fn test_empty_input() {
    assert_eq!(tokens(""), vec![Token::EndOfInput]);
}

#[test]
fn test_doctype() {
    let tokens = tokens("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::Doctype {
            name,
            public_id,
            system_id,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert_eq!(public_id, &None);
            assert_eq!(system_id, &None);
            assert!(!force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_public_and_system_identifiers() {
    let tokens = tokens(
        r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" 'http://www.w3.org/TR/html4/strict.dtd'>"#,
    );
    match &tokens[0] {
        Token::Doctype {
            name,
            public_id,
            system_id,
            ..
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert_eq!(public_id.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
            assert_eq!(
                system_id.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_without_name_forces_quirks() {
    let tokens = tokens("<!DOCTYPE>");
    assert!(matches!(
        &tokens[0],
        Token::Doctype {
            name: None,
            force_quirks: true,
            ..
        }
    ));
    assert_eq!(error_codes("<!DOCTYPE>"), ["missing-doctype-name"]);
}

#[test]
fn test_start_tag_with_attributes() {
    let tokens = tokens(r#"<DIV Class="a" id=b data-x='c' hidden>"#);
    match &tokens[0] {
        Token::StartTag {
            name,
            attrs,
            self_closing,
        } => {
            assert_eq!(name, "div");
            assert!(!self_closing);
            let pairs: Vec<(&str, &str)> = attrs
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            assert_eq!(
                pairs,
                [("class", "a"), ("id", "b"), ("data-x", "c"), ("hidden", "")]
            );
        }
        other => panic!("Expected StartTag token, got {other:?}"),
    }
}

#[test]
fn test_self_closing_flag() {
    let tokens = tokens("<br/>");
    assert!(matches!(
        &tokens[0],
        Token::StartTag {
            self_closing: true,
            ..
        }
    ));
}

#[test]
fn test_end_tag() {
    assert_eq!(tokens("</div>"), vec![end_tag("div"), Token::EndOfInput]);
}

#[test]
fn test_end_tag_with_attributes_is_an_error() {
    assert_eq!(error_codes("</div class=x>"), ["end-tag-with-attributes"]);
}

#[test]
fn test_comment() {
    assert_eq!(
        tokens("<!-- hi -->"),
        vec![Token::new_comment(" hi "), Token::EndOfInput]
    );
}

#[test]
fn test_abrupt_empty_comment() {
    assert_eq!(tokens("<!-->")[0], Token::new_comment(""));
    assert_eq!(error_codes("<!-->"), ["abrupt-closing-of-empty-comment"]);
}

#[test]
fn test_incorrectly_closed_comment() {
    assert_eq!(tokens("<!--a--!>")[0], Token::new_comment("a"));
    assert_eq!(error_codes("<!--a--!>"), ["incorrectly-closed-comment"]);
}

#[test]
fn test_bogus_comments() {
    assert_eq!(tokens("<?xml version?>")[0], Token::new_comment("?xml version?"));
    assert_eq!(tokens("<!foo>")[0], Token::new_comment("foo"));
    assert_eq!(
        error_codes("<?x>"),
        ["unexpected-question-mark-instead-of-tag-name"]
    );
}

#[test]
fn test_cdata_in_html_is_bogus_comment() {
    assert_eq!(tokens("<![CDATA[x]]>")[0], Token::new_comment("[CDATA[x]]"));
    assert_eq!(error_codes("<![CDATA[x]]>"), ["cdata-in-html-content"]);
}

#[test]
fn test_text_around_tags() {
    let tokens = tokens("a<b>c</b>d");
    assert_eq!(tokens[0], text("a"));
    assert_eq!(tokens[2], text("c"));
    assert_eq!(tokens[3], end_tag("b"));
    assert_eq!(tokens[4], text("d"));
}

#[test]
fn test_lone_less_than_is_text() {
    assert_eq!(tokens("a < b"), vec![text("a < b"), Token::EndOfInput]);
    assert_eq!(
        error_codes("a < b"),
        ["invalid-first-character-of-tag-name"]
    );
}

#[test]
fn test_missing_end_tag_name() {
    assert_eq!(tokens("</>"), vec![Token::EndOfInput]);
    assert_eq!(error_codes("</>"), ["missing-end-tag-name"]);
}

#[test]
fn test_crlf_normalized() {
    assert_eq!(tokens("a\r\nb\rc"), vec![text("a\nb\nc"), Token::EndOfInput]);
}

#[test]
fn test_leading_bom_discarded() {
    assert_eq!(tokens("\u{FEFF}x"), vec![text("x"), Token::EndOfInput]);
    let (kept, _) = tokenize("\u{FEFF}x", &TokenizerOpts::default().with_discard_bom(false));
    assert_eq!(kept[0], text("\u{FEFF}x"));
}

// ========== Character references ==========

#[test]
fn test_character_references_in_text() {
    assert_eq!(tokens("a &amp; b &#60; &#x3E;")[0], text("a & b < >"));
}

#[test]
fn test_character_references_in_attribute() {
    let tokens = tokens(r#"<a href="?x=1&amp;y=2&copy=3">"#);
    match &tokens[0] {
        Token::StartTag { attrs, .. } => {
            assert_eq!(attrs.get("href").map(String::as_str), Some("?x=1&y=2&copy=3"));
        }
        other => panic!("Expected StartTag token, got {other:?}"),
    }
}

#[test]
fn test_unknown_reference_is_kept() {
    assert_eq!(tokens("&bogus;")[0], text("&bogus;"));
}

// ========== Duplicate attributes ==========

#[test]
fn test_duplicate_attribute_first_wins() {
    let input = r#"<a href="1" href="2">"#;
    match &tokens(input)[0] {
        Token::StartTag { attrs, .. } => {
            assert_eq!(attrs.len(), 1);
            assert_eq!(attrs.get("href").map(String::as_str), Some("1"));
        }
        other => panic!("Expected StartTag token, got {other:?}"),
    }
    assert_eq!(error_codes(input), ["duplicate-attribute"]);
}

// ========== Raw text element (RCDATA/RAWTEXT) tests ==========

#[test]
fn test_style_content_is_raw() {
    let tokens = tokens("<style>a < b &amp; </p></style>");
    assert_eq!(tokens[1], text("a < b &amp; </p>"));
    assert_eq!(tokens[2], end_tag("style"));
}

#[test]
fn test_title_content_decodes_references() {
    let tokens = tokens("<title>a &amp; <b></title>");
    assert_eq!(tokens[1], text("a & <b>"));
    assert_eq!(tokens[2], end_tag("title"));
}

#[test]
fn test_script_is_rawtext() {
    let tokens = tokens("<script>if (a < b) {}</script>");
    assert_eq!(tokens[1], text("if (a < b) {}"));
}

#[test]
fn test_plaintext_never_ends() {
    let tokens = tokens("<plaintext></plaintext><b>");
    assert_eq!(tokens[1], text("</plaintext><b>"));
    assert_eq!(tokens[2], Token::EndOfInput);
}

#[test]
fn test_initial_rawtext_state() {
    let opts = TokenizerOpts::default().with_initial_state(InitialState::RAWTEXT, Some("textarea"));
    let (tokens, _) = tokenize("<b>x</b></textarea>y", &opts);
    assert_eq!(tokens[0], text("<b>x</b>"));
    assert_eq!(tokens[1], end_tag("textarea"));
    assert_eq!(tokens[2], text("y"));
}

// ========== Errors and positions ==========

#[test]
fn test_errors_not_collected_by_default() {
    let (_, errors) = tokenize("<a b='1' b='2'>", &TokenizerOpts::default());
    assert!(errors.is_empty());
}

#[test]
fn test_error_position_is_token_start() {
    let errors = errors("ab\n  <a x x>", TokenizerOpts::default());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "duplicate-attribute");
    assert_eq!((errors[0].line, errors[0].column), (Some(2), Some(3)));
}

#[test]
fn test_exact_error_position() {
    let errors = errors(
        "ab\n  <a x x>",
        TokenizerOpts::default().with_exact_errors(true),
    );
    assert_eq!(errors[0].line, Some(2));
    assert!(errors[0].column > Some(3));
}

#[test]
fn test_eof_in_tag_emits_partial_start_tag() {
    let tokens = tokens("<div class=\"a");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::StartTag { name, attrs, .. } => {
            assert_eq!(name, "div");
            assert_eq!(attrs.get("class").map(String::as_str), Some("a"));
        }
        other => panic!("Expected start tag, got {other:?}"),
    }
    assert_eq!(tokens[1], Token::EndOfInput);
    assert_eq!(error_codes("<div class=\"a"), ["eof-in-tag"]);
}

#[test]
fn test_eof_in_tag_emits_partial_end_tag() {
    assert_eq!(tokens("x</di"), vec![text("x"), end_tag("di"), Token::EndOfInput]);
    assert_eq!(error_codes("</di"), ["eof-in-tag"]);
}

#[test]
fn test_eof_in_comment_emits_partial_comment() {
    assert_eq!(tokens("<!--abc")[0], Token::new_comment("abc"));
    assert_eq!(error_codes("<!--abc"), ["eof-in-comment"]);
}

#[test]
fn test_eof_in_doctype_forces_quirks() {
    assert!(matches!(
        &tokens("<!DOCTYPE html PUBLIC \"x")[0],
        Token::Doctype {
            force_quirks: true,
            ..
        }
    ));
}

#[test]
fn test_null_in_data_is_reported() {
    assert_eq!(error_codes("a\0b"), ["unexpected-null-character"]);
}

// ========== XML coercion ==========

#[test]
fn test_xml_coercion() {
    let opts = TokenizerOpts::default().with_xml_coercion(true);
    let (tokens, _) = tokenize("a\x0Cb<!--x--y-->", &opts);
    assert_eq!(tokens[0], text("a b"));
    assert_eq!(tokens[1], Token::new_comment("x- -y"));
}

// ========== Properties ==========

#[quickcheck]
fn prop_exactly_one_end_of_input_last(input: String) -> bool {
    let tokens = tokens(&input);
    tokens.last() == Some(&Token::EndOfInput) && tokens.iter().filter(|t| t.is_eof()).count() == 1
}

#[quickcheck]
fn prop_malformed_prefixes_terminate(input: String) -> bool {
    ["<", "</", "<!", "<!--", "<!DOCTYPE", "<a b='", "<a b=\""]
        .iter()
        .all(|prefix| {
            let tokens = tokens(&format!("{prefix}{input}"));
            tokens.last() == Some(&Token::EndOfInput)
        })
}
