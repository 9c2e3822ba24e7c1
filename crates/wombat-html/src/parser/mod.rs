//! HTML tree construction.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)

/// Element category tables.
pub mod constants;
/// Tree builder state machine implementation.
pub mod core;
/// SVG and MathML handling.
pub mod foreign_content;
/// DOCTYPE classification.
pub mod quirks;

pub use self::core::{FragmentContext, InsertionMode, TreeBuilder, TreeBuilderOpts};
pub use quirks::QuirksMode;
