//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard.
//!
//! The tokenizer pushes tokens into a [`TokenSink`] as it scans. The sink
//! answers each token with a [`TokenSinkResult`], which is how the tree
//! builder puts the tokenizer into RCDATA, RAWTEXT or PLAINTEXT after a
//! `<title>`, `<style>` or `<plaintext>` start tag.

/// Character reference decoding for text runs and attribute values.
pub mod character_reference;
/// Helper methods for tokenizer state transitions.
mod helpers;
/// Named character reference lookup table per § 13.5.
pub mod named_character_references;
/// Token types produced by the tokenizer.
pub mod token;
/// HTML tokenizer state machine implementation.
pub mod core;

pub use self::core::{Tokenizer, TokenizerState};
pub use character_reference::decode_entities;
pub use token::Token;

/// What a [`TokenSink`] asks of the tokenizer after receiving a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSinkResult {
    /// Keep tokenizing in the current state.
    Continue,
    /// Switch to a raw text state. Only meaningful right after a start tag;
    /// the start tag's name becomes the appropriate end tag.
    SwitchTo(RawKind),
}

/// The text-only tokenizer states a sink can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state):
    /// character references are decoded, markup is not.
    Rcdata,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state):
    /// nothing is decoded until the appropriate end tag.
    Rawtext,
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state):
    /// everything to the end of input is text.
    Plaintext,
}

/// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
///
/// The raw text state an HTML start tag of this name switches the tokenizer
/// into, if any. `script` is tokenized as RAWTEXT; the script data escape
/// states are not implemented.
#[must_use]
pub fn raw_kind_for(tag_name: &str) -> Option<RawKind> {
    match tag_name {
        // "Follow the generic RCDATA element parsing algorithm."
        "title" | "textarea" => Some(RawKind::Rcdata),
        // "Follow the generic raw text element parsing algorithm."
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "script" => Some(RawKind::Rawtext),
        // "Switch the tokenizer to the PLAINTEXT state."
        "plaintext" => Some(RawKind::Plaintext),
        _ => None,
    }
}

/// The receiving end of a [`Tokenizer`].
pub trait TokenSink {
    /// Consume one token.
    fn process(&mut self, token: Token) -> TokenSinkResult;

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "if there is an adjusted current node and it is not an element in the
    /// HTML namespace". Decides whether `<![CDATA[` opens a CDATA section.
    fn in_foreign_content(&self) -> bool {
        false
    }
}

/// The tokenizer state a run starts in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitialState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    #[default]
    Data,
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    RCDATA,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    RAWTEXT,
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    PLAINTEXT,
}

/// Tokenizer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TokenizerOpts {
    /// Record errors at the exact character that triggered them instead of
    /// at the start of the token being built.
    pub exact_errors: bool,
    /// Skip a leading U+FEFF BYTE ORDER MARK.
    pub discard_bom: bool,
    /// The state scanning starts in.
    pub initial_state: InitialState,
    /// The end tag name that closes the initial RCDATA/RAWTEXT state.
    pub initial_rawtext_tag: Option<String>,
    /// Coerce the output to what an XML serializer can represent: form feeds
    /// become spaces, noncharacters become U+FFFD, and `--` in comments
    /// becomes `- -`.
    pub xml_coercion: bool,
    /// Record parse errors. Line and column are only computed when set.
    pub collect_errors: bool,
}

impl Default for TokenizerOpts {
    fn default() -> Self {
        Self {
            exact_errors: false,
            discard_bom: true,
            initial_state: InitialState::Data,
            initial_rawtext_tag: None,
            xml_coercion: false,
            collect_errors: false,
        }
    }
}

impl TokenizerOpts {
    /// Set [`TokenizerOpts::exact_errors`].
    #[must_use]
    pub const fn with_exact_errors(mut self, exact_errors: bool) -> Self {
        self.exact_errors = exact_errors;
        self
    }

    /// Set [`TokenizerOpts::discard_bom`].
    #[must_use]
    pub const fn with_discard_bom(mut self, discard_bom: bool) -> Self {
        self.discard_bom = discard_bom;
        self
    }

    /// Start in `state`, closed by an end tag named `rawtext_tag`.
    #[must_use]
    pub fn with_initial_state(mut self, state: InitialState, rawtext_tag: Option<&str>) -> Self {
        self.initial_state = state;
        self.initial_rawtext_tag = rawtext_tag.map(str::to_ascii_lowercase);
        self
    }

    /// Set [`TokenizerOpts::xml_coercion`].
    #[must_use]
    pub const fn with_xml_coercion(mut self, xml_coercion: bool) -> Self {
        self.xml_coercion = xml_coercion;
        self
    }

    /// Set [`TokenizerOpts::collect_errors`].
    #[must_use]
    pub const fn with_collect_errors(mut self, collect_errors: bool) -> Self {
        self.collect_errors = collect_errors;
        self
    }
}
