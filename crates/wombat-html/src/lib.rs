//! Error-tolerant HTML tokenizer and tree builder.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, PLAINTEXT and tag states
//!   - DOCTYPE, comment, bogus comment and CDATA handling
//!   - Character reference decoding for text and attribute values
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Document and table insertion modes, frameset modes, and the "text" mode
//!     for raw text elements
//!   - Implicit `html`/`head`/`body`/`tbody`/`tr` insertion
//!   - Quirks mode classification from the DOCTYPE
//!   - SVG and MathML foreign content
//!   - Fragment parsing
//!
//! # Simplifications
//!
//! - Misnested formatting end tags get a one-level adoption step instead of
//!   the full adoption agency algorithm
//! - No foster parenting: stray table content is inserted where it appears
//! - Script content is tokenized as RAWTEXT
//!
//! ```
//! use wombat_html::{parse, ParseOptions};
//!
//! let document = parse("<table><td>x</table>", &ParseOptions::default()).unwrap();
//! assert_eq!(document.query("tbody").len(), 1);
//! assert_eq!(document.query("tr").len(), 1);
//! ```

/// Parse error records.
pub mod error;
/// One-call parsing entry points.
pub mod parse;
/// HTML tree construction.
pub mod parser;
/// Markup event stream.
pub mod stream;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use error::{ParseError, StrictModeError, message_for};
pub use parse::{Document, ParseOptions, parse, parse_bytes, tokenize};
pub use parser::{FragmentContext, InsertionMode, QuirksMode, TreeBuilder, TreeBuilderOpts};
pub use stream::{StreamEvent, stream};
pub use tokenizer::{
    InitialState, RawKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
    decode_entities,
};
