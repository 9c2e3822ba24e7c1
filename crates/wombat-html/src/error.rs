//! Parse error records.
//!
//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! Parse errors never stop the parser. They are collected (when requested) as
//! [`ParseError`] values in document order: tokenizer errors first, then tree
//! construction errors. A strict caller turns the first one into a
//! [`StrictModeError`].

use core::fmt;

use serde::Serialize;
use thiserror::Error;

/// One recorded parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// The WHATWG error code, e.g. `duplicate-attribute`.
    pub code: String,
    /// 1-based line, when the position is known.
    pub line: Option<usize>,
    /// 1-based column (in characters), when the position is known.
    pub column: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

impl ParseError {
    /// An error without position, with its message taken from [`message_for`].
    #[must_use]
    pub fn new(code: &str, tag_name: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            line: None,
            column: None,
            message: message_for(code, tag_name),
        }
    }

    /// An error at a known line and column.
    #[must_use]
    pub fn at(code: &str, line: usize, column: usize) -> Self {
        Self {
            line: Some(line),
            column: Some(column),
            ..Self::new(code, None)
        }
    }

    /// Materialize this error for a strict caller, attaching the offending
    /// line of `source` when the position is known. `source` must be the
    /// tokenizer's normalized input ([`Tokenizer::input`]).
    ///
    /// [`Tokenizer::input`]: crate::tokenizer::Tokenizer::input
    #[must_use]
    pub fn to_strict_error(&self, source: &str) -> StrictModeError {
        let source_line = self
            .line
            .and_then(|line| line.checked_sub(1))
            .and_then(|index| source.split('\n').nth(index))
            .map(ToString::to_string);
        StrictModeError {
            error: self.clone(),
            source_line,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, "({line},{column}): ")?;
        }
        write!(f, "{}", self.code)?;
        if self.message != self.code {
            write!(f, " - {}", self.message)?;
        }
        Ok(())
    }
}

/// The first parse error of a strict-mode parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct StrictModeError {
    /// The error that stopped the parse.
    pub error: ParseError,
    /// The source line the error points into, if the position is known.
    pub source_line: Option<String>,
}

impl StrictModeError {
    /// The source line followed by a caret under the error column.
    #[must_use]
    pub fn annotated_source(&self) -> Option<String> {
        let line = self.source_line.as_deref()?;
        let column = self.error.column.unwrap_or(1).max(1);
        Some(format!("{line}\n{}^", " ".repeat(column - 1)))
    }
}

/// The human-readable message for an error code. Unknown codes fall back to
/// the code itself.
#[must_use]
pub fn message_for(code: &str, tag_name: Option<&str>) -> String {
    let tag = tag_name.unwrap_or("");
    let message = match code {
        // Tokenizer
        "abrupt-closing-of-empty-comment" => "Comment closed with '>' right after '<!--'",
        "abrupt-doctype-public-identifier" => "DOCTYPE public identifier ended by '>'",
        "abrupt-doctype-system-identifier" => "DOCTYPE system identifier ended by '>'",
        "cdata-in-html-content" => "CDATA section outside foreign content",
        "duplicate-attribute" => "Duplicate attribute; the first value is kept",
        "end-tag-with-attributes" => "End tag has attributes",
        "end-tag-with-trailing-solidus" => "End tag ends with '/>'",
        "eof-before-tag-name" => "Unexpected end of input after '<'",
        "eof-in-cdata" => "Unexpected end of input in CDATA section",
        "eof-in-comment" => "Unexpected end of input in comment",
        "eof-in-doctype" => "Unexpected end of input in DOCTYPE",
        "eof-in-tag" => "Unexpected end of input in tag",
        "incorrectly-closed-comment" => "Comment closed with '--!>'",
        "incorrectly-opened-comment" => "Markup declaration is not a comment, DOCTYPE or CDATA",
        "invalid-character-sequence-after-doctype-name" => {
            "Expected PUBLIC or SYSTEM after DOCTYPE name"
        }
        "invalid-first-character-of-tag-name" => "Invalid first character of tag name",
        "missing-attribute-value" => "Attribute value missing after '='",
        "missing-doctype-name" => "DOCTYPE has no name",
        "missing-doctype-public-identifier" => "DOCTYPE public identifier missing",
        "missing-doctype-system-identifier" => "DOCTYPE system identifier missing",
        "missing-end-tag-name" => "End tag '</>' has no name",
        "missing-quote-before-doctype-public-identifier" => {
            "DOCTYPE public identifier is not quoted"
        }
        "missing-quote-before-doctype-system-identifier" => {
            "DOCTYPE system identifier is not quoted"
        }
        "missing-whitespace-after-doctype-public-keyword" => {
            "Missing whitespace after DOCTYPE PUBLIC keyword"
        }
        "missing-whitespace-after-doctype-system-keyword" => {
            "Missing whitespace after DOCTYPE SYSTEM keyword"
        }
        "missing-whitespace-before-doctype-name" => "Missing whitespace before DOCTYPE name",
        "missing-whitespace-between-attributes" => "Missing whitespace between attributes",
        "missing-whitespace-between-doctype-public-and-system-identifiers" => {
            "Missing whitespace between DOCTYPE public and system identifiers"
        }
        "nested-comment" => "Nested comment '<!--' inside a comment",
        "unexpected-character-after-doctype-system-identifier" => {
            "Unexpected character after DOCTYPE system identifier"
        }
        "unexpected-character-in-attribute-name" => "Unexpected character in attribute name",
        "unexpected-character-in-unquoted-attribute-value" => {
            "Unexpected character in unquoted attribute value"
        }
        "unexpected-equals-sign-before-attribute-name" => "Unexpected '=' before attribute name",
        "unexpected-null-character" => "Unexpected NULL character",
        "unexpected-question-mark-instead-of-tag-name" => "Unexpected '?' instead of tag name",
        "unexpected-solidus-in-tag" => "Unexpected '/' in tag",
        // Character references
        "absence-of-digits-in-numeric-character-reference" => {
            "Numeric character reference has no digits"
        }
        "character-reference-outside-unicode-range" => {
            "Character reference outside the Unicode range"
        }
        "control-character-reference" => "Character reference to a control character",
        "missing-semicolon-after-character-reference" => {
            "Missing semicolon after character reference"
        }
        "noncharacter-character-reference" => "Character reference to a noncharacter",
        "null-character-reference" => "Character reference to NULL",
        "surrogate-character-reference" => "Character reference to a surrogate",
        "unknown-named-character-reference" => "Unknown named character reference",
        // Tree construction
        "expected-doctype-but-got-chars" => "Expected DOCTYPE but got text",
        "expected-doctype-but-got-eof" => "Expected DOCTYPE but got end of input",
        "expected-doctype-but-got-start-tag" => "Expected DOCTYPE but got a start tag",
        "unknown-doctype" => "Unknown DOCTYPE",
        "unexpected-doctype" => "Unexpected DOCTYPE",
        "unexpected-start-tag" => return format!("Unexpected start tag <{tag}>"),
        "unexpected-start-tag-ignored" => return format!("Start tag <{tag}> ignored"),
        "unexpected-start-tag-implies-end-tag" => {
            return format!("Start tag <{tag}> implies the end of the open <{tag}>");
        }
        "unexpected-end-tag" => return format!("Unexpected end tag </{tag}>"),
        "adoption-agency-1.3" => return format!("Misnested end tag </{tag}>"),
        "unexpected-cell-in-table-body" => "Table cell outside a table row",
        "unexpected-char-in-frameset" => "Text inside frameset",
        "eof-in-frameset" => "Unexpected end of input in frameset",
        "unexpected-char-after-body" => "Text after the body element was closed",
        "unexpected-char-after-frameset" => "Text after frameset",
        "unexpected-token-after-body" => "Unexpected tag after the body element was closed",
        "unexpected-token-after-frameset" => "Unexpected content after frameset",
        "expected-closing-tag-but-got-eof" => {
            return format!("Expected closing tag </{tag}> but got end of input");
        }
        "expected-named-closing-tag-but-got-eof" => {
            return format!("Expected </{tag}> but got end of input");
        }
        _ => code,
    };
    message.to_string()
}

/// Newline offsets of one input, for resolving byte offsets to positions.
///
/// Built once per tokenizer run, and only when errors are collected.
#[derive(Debug, Clone, Default)]
pub(crate) struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        Self {
            newlines: text
                .bytes()
                .enumerate()
                .filter_map(|(i, b)| (b == b'\n').then_some(i))
                .collect(),
        }
    }

    /// 1-based (line, column) of the byte `offset` in `text`. The column
    /// counts characters, not bytes.
    pub(crate) fn locate(&self, text: &str, offset: usize) -> (usize, usize) {
        let offset = offset.min(text.len());
        let line_index = self.newlines.partition_point(|&nl| nl < offset);
        let line_start = line_index
            .checked_sub(1)
            .map_or(0, |previous| self.newlines[previous] + 1);
        let column = text
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        (line_index + 1, column + 1)
    }
}
