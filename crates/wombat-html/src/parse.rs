//! One-call entry points: markup in, [`Document`] out.

use wombat_common::encoding::decode;
use wombat_dom::{DomTree, Namespace, NodeId, SerializeOptions};

use crate::error::{ParseError, StrictModeError};
use crate::parser::{FragmentContext, QuirksMode, TreeBuilder, TreeBuilderOpts};
use crate::tokenizer::{
    InitialState, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts, raw_kind_for,
};

/// Options for [`parse`] and [`parse_bytes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ParseOptions {
    /// Record parse errors in [`Document::errors`].
    pub collect_errors: bool,
    /// Fail with the first parse error. Implies `collect_errors`.
    pub strict: bool,
    /// Parse a fragment. Without a `fragment_context` the context is `div`.
    pub fragment: bool,
    /// The context element for fragment parsing.
    pub fragment_context: Option<FragmentContext>,
    /// Parse as an `iframe` `srcdoc` document.
    pub iframe_srcdoc: bool,
    /// Tokenizer configuration. `collect_errors` is overridden from these
    /// options.
    pub tokenizer: TokenizerOpts,
    /// Encoding label from the transport layer, for [`parse_bytes`].
    pub transport_encoding: Option<String>,
}

impl ParseOptions {
    /// Set [`ParseOptions::collect_errors`].
    #[must_use]
    pub const fn with_collect_errors(mut self, collect_errors: bool) -> Self {
        self.collect_errors = collect_errors;
        self
    }

    /// Set [`ParseOptions::strict`].
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse a fragment in a `div` context.
    #[must_use]
    pub const fn with_fragment(mut self) -> Self {
        self.fragment = true;
        self
    }

    /// Parse a fragment in `context`.
    #[must_use]
    pub fn with_fragment_context(mut self, context: FragmentContext) -> Self {
        self.fragment = true;
        self.fragment_context = Some(context);
        self
    }

    /// Set [`ParseOptions::iframe_srcdoc`].
    #[must_use]
    pub const fn with_iframe_srcdoc(mut self, iframe_srcdoc: bool) -> Self {
        self.iframe_srcdoc = iframe_srcdoc;
        self
    }

    /// Replace the tokenizer options.
    #[must_use]
    pub fn with_tokenizer_opts(mut self, tokenizer: TokenizerOpts) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Set [`ParseOptions::transport_encoding`].
    #[must_use]
    pub fn with_transport_encoding(mut self, label: &str) -> Self {
        self.transport_encoding = Some(label.to_string());
        self
    }

    const fn wants_errors(&self) -> bool {
        self.collect_errors || self.strict
    }

    fn effective_fragment_context(&self) -> Option<FragmentContext> {
        self.fragment_context
            .clone()
            .or_else(|| self.fragment.then(|| FragmentContext::new("div")))
    }
}

/// A parsed document or fragment.
#[derive(Debug, Clone)]
pub struct Document {
    /// The tree. `NodeId::ROOT` is a Document, or a `DocumentFragment` for
    /// fragment parses.
    pub tree: DomTree,
    /// Tokenizer errors followed by tree construction errors. Empty unless
    /// errors were requested.
    pub errors: Vec<ParseError>,
    /// The compatibility mode the DOCTYPE selected.
    pub quirks_mode: QuirksMode,
    /// Name of the encoding the input bytes were decoded with, for
    /// [`parse_bytes`].
    pub encoding: Option<String>,
}

impl Document {
    /// Elements matching `selector` (`*` or a tag name) in document order.
    #[must_use]
    pub fn query(&self, selector: &str) -> Vec<NodeId> {
        wombat_dom::query(&self.tree, NodeId::ROOT, selector)
    }

    /// Serialize the whole document.
    #[must_use]
    pub fn to_html(&self, opts: &SerializeOptions) -> String {
        wombat_dom::to_html(&self.tree, NodeId::ROOT, opts)
    }

    /// The document's text, one entry per text node.
    #[must_use]
    pub fn to_text(&self, separator: &str, strip: bool) -> String {
        wombat_dom::to_text(&self.tree, NodeId::ROOT, separator, strip)
    }

    /// The html5lib tree-dump format.
    #[must_use]
    pub fn to_test_format(&self) -> String {
        wombat_dom::to_test_format(&self.tree, NodeId::ROOT)
    }
}

/// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
///
/// The tokenizer state a fragment in an HTML `context` starts in, and the end
/// tag that closes it.
fn fragment_tokenizer_state(context: &FragmentContext) -> Option<InitialState> {
    if context.namespace.is_some_and(|ns| ns != Namespace::Html) {
        return None;
    }
    match context.tag_name.as_str() {
        "textarea" | "title" | "style" => Some(InitialState::RAWTEXT),
        "plaintext" | "script" => Some(InitialState::PLAINTEXT),
        _ => None,
    }
}

/// Parse `html` into a document, or into a fragment when `opts` asks for one.
///
/// Malformed markup never fails the parse; it is repaired the way browsers
/// repair it.
///
/// # Errors
///
/// With `opts.strict`, returns the first recorded parse error.
///
/// ```
/// use wombat_html::{parse, ParseOptions};
///
/// let document = parse("<p>A<p>B", &ParseOptions::default()).unwrap();
/// assert_eq!(document.query("p").len(), 2);
/// ```
pub fn parse(html: &str, opts: &ParseOptions) -> Result<Document, StrictModeError> {
    let collect_errors = opts.wants_errors();
    let fragment_context = opts.effective_fragment_context();

    let mut tokenizer_opts = opts.tokenizer.clone().with_collect_errors(collect_errors);
    if let Some(context) = &fragment_context
        && let Some(state) = fragment_tokenizer_state(context)
    {
        tokenizer_opts = tokenizer_opts.with_initial_state(state, Some(&context.tag_name));
    }

    let builder = TreeBuilder::new(TreeBuilderOpts {
        fragment_context,
        iframe_srcdoc: opts.iframe_srcdoc,
        collect_errors,
    });
    let mut tokenizer = Tokenizer::new(builder, tokenizer_opts);
    tokenizer.run(html);
    let source = opts.strict.then(|| tokenizer.input().to_string());

    let (builder, mut errors) = tokenizer.into_parts();
    let quirks_mode = builder.quirks_mode();
    let (tree, tree_errors) = builder.finish();
    errors.extend(tree_errors);

    if let Some(source) = source
        && let Some(first) = errors.first()
    {
        return Err(first.to_strict_error(&source));
    }

    Ok(Document {
        tree,
        errors,
        quirks_mode,
        encoding: None,
    })
}

/// Decode `bytes` (BOM, then `opts.transport_encoding`, then `<meta>`
/// prescan, then windows-1252) and parse the result.
///
/// # Errors
///
/// With `opts.strict`, returns the first recorded parse error.
pub fn parse_bytes(bytes: &[u8], opts: &ParseOptions) -> Result<Document, StrictModeError> {
    let decoded = decode(bytes, opts.transport_encoding.as_deref());
    let mut document = parse(&decoded.text, opts)?;
    document.encoding = Some(decoded.encoding.name().to_string());
    Ok(document)
}

/// Collects every token. Raw text elements switch the tokenizer the way the
/// tree builder would, so `<style>` and `<title>` content comes out as text.
#[derive(Debug, Default)]
struct TokenCollector {
    tokens: Vec<Token>,
}

impl TokenSink for TokenCollector {
    fn process(&mut self, token: Token) -> TokenSinkResult {
        let switch = match &token {
            Token::StartTag { name, .. } => raw_kind_for(name),
            _ => None,
        };
        self.tokens.push(token);
        switch.map_or(TokenSinkResult::Continue, TokenSinkResult::SwitchTo)
    }
}

/// Tokenize `html` without building a tree.
///
/// The last token is always [`Token::EndOfInput`]. Errors are returned when
/// `opts.collect_errors` is set.
#[must_use]
pub fn tokenize(html: &str, opts: &TokenizerOpts) -> (Vec<Token>, Vec<ParseError>) {
    let mut tokenizer = Tokenizer::new(TokenCollector::default(), opts.clone());
    tokenizer.run(html);
    let (collector, errors) = tokenizer.into_parts();
    (collector.tokens, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_defaults_to_div_context() {
        let opts = ParseOptions::default().with_fragment();
        assert_eq!(
            opts.effective_fragment_context(),
            Some(FragmentContext::new("div"))
        );
        assert_eq!(ParseOptions::default().effective_fragment_context(), None);
    }

    #[test]
    fn test_fragment_tokenizer_state() {
        assert_eq!(
            fragment_tokenizer_state(&FragmentContext::new("TEXTAREA")),
            Some(InitialState::RAWTEXT)
        );
        assert_eq!(
            fragment_tokenizer_state(&FragmentContext::new("script")),
            Some(InitialState::PLAINTEXT)
        );
        assert_eq!(
            fragment_tokenizer_state(&FragmentContext::new("title").with_namespace(Namespace::Svg)),
            None
        );
        assert_eq!(fragment_tokenizer_state(&FragmentContext::new("div")), None);
    }

    #[test]
    fn test_strict_implies_collect() {
        assert!(ParseOptions::default().with_strict(true).wants_errors());
    }
}
