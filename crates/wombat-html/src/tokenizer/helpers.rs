//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Input/character handling ("Consume the next input character")
//! - Text buffering and token emission ("Emit the current token")
//! - RCDATA/RAWTEXT helpers for raw text elements
//! - Attribute helpers for duplicate detection
//! - Error recording with line/column resolution

use super::character_reference::{decode_entities, is_noncharacter};
use super::core::{DoctypeId, Tokenizer, TokenizerState};
use super::token::Token;
use super::{TokenSink, TokenSinkResult};
use crate::error::ParseError;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl<S: TokenSink> Tokenizer<S> {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next iteration of the main loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    /// The same character will be processed again in the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }
}

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl<S: TokenSink> Tokenizer<S> {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Consume the next input character"
    ///
    /// Returns the character at the current position and advances the position.
    /// Returns None if we've reached the end of input.
    pub(super) fn consume(&mut self) -> Option<char> {
        self.char_start = self.current_pos;
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// Peek at a codepoint at the given offset from the current position without
    /// consuming it.
    fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.input[self.current_pos..].chars().nth(offset)
    }

    /// "If the next few characters are..."
    ///
    /// Check if the next few characters match the target string exactly.
    pub(super) fn next_few_characters_are(&self, target: &str) -> bool {
        target
            .chars()
            .enumerate()
            .all(|(i, target_char)| self.peek_codepoint(i) == Some(target_char))
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    pub(super) fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        target.chars().enumerate().all(|(i, target_char)| {
            self.peek_codepoint(i)
                .is_some_and(|input_char| input_char.eq_ignore_ascii_case(&target_char))
        })
    }

    /// Consume the given string from the input.
    /// Caller must have already verified the characters are present.
    pub(super) const fn consume_string(&mut self, target: &str) {
        // Every target is ASCII ("DOCTYPE", "--", "[CDATA["), so bytes == chars.
        self.current_pos += target.len();
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// NOTE: HTML tokenizer uses a subset excluding CR (which is normalized earlier).
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        // "U+0009 CHARACTER TABULATION (tab)"
        // "U+000A LINE FEED (LF)"
        // "U+000C FORM FEED (FF)"
        // "U+0020 SPACE"
        matches!(input_char, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Text Buffer and Token Emission Helpers
// =============================================================================

impl<S: TokenSink> Tokenizer<S> {
    /// "Emit the current input character as a character token."
    ///
    /// Characters are buffered and delivered as one `CharacterRun`. `decodes`
    /// marks data and RCDATA text, whose character references are decoded when
    /// the buffer is flushed.
    pub(super) fn push_text(&mut self, c: char, decodes: bool) {
        if !self.text_buffer.is_empty() && self.text_decodes != decodes {
            self.flush_text();
        }
        if self.text_buffer.is_empty() {
            self.text_start = self.char_start;
            self.text_decodes = decodes;
        }
        self.text_buffer.push(c);
    }

    /// Emit several characters in the text content model of `text_state`.
    pub(super) fn push_raw_text(&mut self, s: &str, text_state: TokenizerState) {
        let decodes = text_state == TokenizerState::RCDATA || text_state == TokenizerState::Data;
        for c in s.chars() {
            self.push_text(c, decodes);
        }
    }

    /// Deliver the buffered characters, if any, as one `CharacterRun`.
    pub(super) fn flush_text(&mut self) {
        if self.text_buffer.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.text_buffer);
        let mut text = if self.text_decodes {
            self.decode_reporting(&raw, false, self.text_start)
        } else {
            raw
        };
        if self.opts.xml_coercion {
            text = coerce_text(&text);
        }
        self.deliver(Token::CharacterRun { text });
    }

    /// Hand one token to the sink and apply the state switch it asks for.
    fn deliver(&mut self, token: Token) {
        log::trace!(target: "wombat.tokenizer", "[{}] emit {token}", self.state);
        let is_start_tag = matches!(token, Token::StartTag { .. });
        match self.sink.process(token) {
            TokenSinkResult::Continue => {}
            // [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
            // "Switch the tokenizer to the RCDATA state." (or RAWTEXT/PLAINTEXT)
            TokenSinkResult::SwitchTo(kind) if is_start_tag => {
                self.state = kind.into();
                log::trace!(target: "wombat.tokenizer", "sink switched tokenizer to {}", self.state);
            }
            TokenSinkResult::SwitchTo(_) => {}
        }
    }

    /// Emit a non-character token, flushing pending text first.
    pub(super) fn emit(&mut self, token: Token) {
        self.flush_text();
        // Track the last start tag name for RCDATA/RAWTEXT end tag detection
        if let Token::StartTag { ref name, .. } = token {
            self.last_start_tag_name = Some(name.clone());
        }
        let token = match token {
            Token::Comment { text } if self.opts.xml_coercion => Token::Comment {
                text: coerce_comment(text),
            },
            other => other,
        };
        self.deliver(token);
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Emit the current token"
    pub(super) fn emit_current_token(&mut self) {
        self.commit_attribute();
        let had_attributes = std::mem::take(&mut self.end_tag_had_attributes);
        if had_attributes && matches!(self.current_token, Some(Token::EndTag { .. })) {
            // "When an end tag token is emitted with attributes, that is an
            // end-tag-with-attributes parse error."
            self.parse_error("end-tag-with-attributes");
        }
        let Some(token) = self.current_token.take() else {
            return;
        };
        self.emit(token);
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof(&mut self) {
        self.flush_text();
        self.deliver(Token::EndOfInput);
        self.at_eof = true;
    }

    /// "This is an eof-in-tag parse error. Emit an end-of-file token."
    ///
    /// The partially built tag, with any pending attribute, is emitted before
    /// the end-of-file token so truncated markup still reaches the sink.
    pub(super) fn eof_in_tag(&mut self) {
        self.parse_error("eof-in-tag");
        self.emit_current_token();
        self.emit_eof();
    }

    /// "This is an eof-in-comment parse error. Emit the current comment token.
    /// Emit an end-of-file token."
    pub(super) fn eof_in_comment(&mut self) {
        self.parse_error("eof-in-comment");
        self.emit_current_token();
        self.emit_eof();
    }

    /// "This is an eof-in-doctype parse error. Set the current DOCTYPE token's
    /// force-quirks flag to on. Emit the current DOCTYPE token. Emit an
    /// end-of-file token."
    pub(super) fn eof_in_doctype(&mut self) {
        self.parse_error("eof-in-doctype");
        if let Some(ref mut token) = self.current_token {
            token.set_force_quirks();
        }
        self.emit_current_token();
        self.emit_eof();
    }

    /// A DOCTYPE cut short by `>`: report `code`, set force-quirks, emit it.
    pub(super) fn abrupt_doctype(&mut self, code: &str) {
        self.parse_error(code);
        if let Some(ref mut token) = self.current_token {
            token.set_force_quirks();
        }
        self.switch_to(TokenizerState::Data);
        self.emit_current_token();
    }

    /// "Set the current DOCTYPE token's force-quirks flag to on. Reconsume in
    /// the bogus DOCTYPE state."
    pub(super) fn bogus_doctype(&mut self, code: &str) {
        self.parse_error(code);
        if let Some(ref mut token) = self.current_token {
            token.set_force_quirks();
        }
        self.reconsume_in(TokenizerState::BogusDOCTYPE);
    }

    /// "Set the current DOCTYPE token's public identifier to the empty string
    /// (not missing), then switch to the DOCTYPE public identifier
    /// (double-quoted) state."
    pub(super) fn begin_doctype_identifier(&mut self, id: DoctypeId, quote: char) {
        if let Some(ref mut token) = self.current_token {
            match id {
                DoctypeId::Public => token.clear_public_id(),
                DoctypeId::System => token.clear_system_id(),
            }
        }
        self.switch_to(match (id, quote) {
            (DoctypeId::Public, '"') => TokenizerState::DOCTYPEPublicIdentifierDoubleQuoted,
            (DoctypeId::Public, _) => TokenizerState::DOCTYPEPublicIdentifierSingleQuoted,
            (DoctypeId::System, '"') => TokenizerState::DOCTYPESystemIdentifierDoubleQuoted,
            (DoctypeId::System, _) => TokenizerState::DOCTYPESystemIdentifierSingleQuoted,
        });
    }

    pub(super) fn append_to_doctype_identifier(&mut self, id: DoctypeId, c: char) {
        if let Some(ref mut token) = self.current_token {
            match id {
                DoctypeId::Public => token.append_to_public_id(c),
                DoctypeId::System => token.append_to_system_id(c),
            }
        }
    }

    pub(super) fn append_to_comment(&mut self, c: char) {
        if let Some(ref mut token) = self.current_token {
            token.append_to_comment(c);
        }
    }

    pub(super) fn append_str_to_comment(&mut self, s: &str) {
        if let Some(ref mut token) = self.current_token {
            token.append_str_to_comment(s);
        }
    }
}

// =============================================================================
// RCDATA/RAWTEXT Helpers
// =============================================================================

impl<S: TokenSink> Tokenizer<S> {
    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any."
    ///
    /// Used to determine if `</title>` should close the current `<title>` element.
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        if let (Some(last_start_tag), Some(Token::EndTag { name })) =
            (&self.last_start_tag_name, &self.current_token)
        {
            return name == last_start_tag;
        }
        false
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "Anything else":
    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character
    /// token, and a character token for each of the characters in the temporary
    /// buffer... Reconsume in the RCDATA state."
    pub(super) fn emit_raw_end_tag_name_anything_else(&mut self, text_state: TokenizerState) {
        // STEP 1: "Emit a U+003C LESS-THAN SIGN character token"
        // STEP 2: "Emit a U+002F SOLIDUS character token"
        self.push_raw_text("</", text_state);
        // STEP 3: "Emit a character token for each of the characters in the temporary buffer"
        let buffer = std::mem::take(&mut self.temporary_buffer);
        self.push_raw_text(&buffer, text_state);
        // STEP 4: Discard the current end tag token
        self.current_token = None;
        // STEP 5: "Reconsume in the RCDATA state"
        self.reconsume_in(text_state);
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl<S: TokenSink> Tokenizer<S> {
    /// "Start a new attribute in the current tag token. Set that attribute name
    /// and value to the empty string."
    pub(super) fn start_new_attribute(&mut self) {
        self.commit_attribute();
        self.current_attribute = Some((String::new(), String::new()));
    }

    /// "Append the current input character to the current attribute's name."
    pub(super) fn append_to_attribute_name(&mut self, c: char) {
        if let Some((ref mut name, _)) = self.current_attribute {
            name.push(c);
        }
    }

    /// "Append the current input character to the current attribute's value."
    pub(super) fn append_to_attribute_value(&mut self, c: char) {
        if let Some((_, ref mut value)) = self.current_attribute {
            value.push(c);
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "When the user agent leaves the attribute name state... if there is
    /// already an attribute on the token with the exact same name, then this
    /// is a duplicate-attribute parse error and the new attribute must be
    /// removed from the token."
    ///
    /// The value is decoded here, once the attribute is complete.
    pub(super) fn commit_attribute(&mut self) {
        let Some((name, raw_value)) = self.current_attribute.take() else {
            return;
        };

        // STEP 1: End tags keep no attributes; the error is reported on emission.
        if matches!(self.current_token, Some(Token::EndTag { .. })) {
            self.end_tag_had_attributes = true;
            return;
        }

        // STEP 2: "This is a duplicate-attribute parse error"
        let is_duplicate = self
            .current_token
            .as_ref()
            .is_some_and(|token| token.has_attribute(&name));
        if is_duplicate {
            self.parse_error("duplicate-attribute");
            return;
        }

        // STEP 3: Decode character references in the value.
        let offset = self.error_offset();
        let value = self.decode_reporting(&raw_value, true, offset);
        if let Some(ref mut token) = self.current_token {
            token.insert_attribute(name, value);
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl<S: TokenSink> Tokenizer<S> {
    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Records a parse error. Parse errors in HTML are not fatal - the parser
    /// recovers and continues.
    pub(super) fn parse_error(&mut self, code: &str) {
        let offset = self.error_offset();
        self.record_error(code, offset);
    }

    /// Where an error detected now is reported: the current character with
    /// `exact_errors`, otherwise the start of the token being built.
    fn error_offset(&self) -> usize {
        if self.opts.exact_errors {
            return self.char_start;
        }
        // A tag closed by '>' is emitted after the switch back to a text state.
        if self.current_token.is_some() {
            return self.token_start;
        }
        match self.state {
            TokenizerState::Data
            | TokenizerState::RCDATA
            | TokenizerState::RAWTEXT
            | TokenizerState::PLAINTEXT
            | TokenizerState::CDATASection => {
                if self.text_buffer.is_empty() {
                    self.char_start
                } else {
                    self.text_start
                }
            }
            _ => self.token_start,
        }
    }

    fn record_error(&mut self, code: &str, offset: usize) {
        if !self.opts.collect_errors {
            return;
        }
        let error = match self.line_index {
            Some(ref index) => {
                let (line, column) = index.locate(&self.input, offset);
                ParseError::at(code, line, column)
            }
            None => ParseError::new(code, None),
        };
        log::trace!(target: "wombat.tokenizer", "parse error {error}");
        self.errors.push(error);
    }

    /// Decode character references in `raw`, recording each malformed one at
    /// `offset`.
    fn decode_reporting(&mut self, raw: &str, in_attribute: bool, offset: usize) -> String {
        let mut codes = Vec::new();
        let decoded = decode_entities(raw, in_attribute, |code| codes.push(code));
        for code in codes {
            self.record_error(code, offset);
        }
        decoded
    }
}

/// Form feeds become spaces and noncharacters become U+FFFD.
fn coerce_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\x0C' => ' ',
            c if is_noncharacter(c) => '\u{FFFD}',
            c => c,
        })
        .collect()
}

/// `--` cannot appear inside an XML comment.
fn coerce_comment(mut text: String) -> String {
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_comment_splits_every_double_dash() {
        assert_eq!(coerce_comment("a--b".to_string()), "a- -b");
        assert_eq!(coerce_comment("---".to_string()), "- - -");
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(coerce_text("a\x0Cb\u{FFFF}"), "a b\u{FFFD}");
    }
}
