//! Foreign content parsing support for SVG and MathML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

pub mod mathml;
pub mod svg;

pub use mathml::adjust_mathml_attributes;
pub use svg::{adjust_svg_attributes, adjust_svg_tag_name};

use wombat_dom::{AttributesMap, ElementData, Namespace};

/// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
///
/// "A start tag whose tag name is one of: "b", "big", "blockquote", "body",
/// "br", "center", "code", "dd", "div", "dl", "dt", "em", "embed", "h1", ...
/// Parse error. ... Pop an element from the stack of open elements. ..."
///
/// These HTML start tags break out of SVG or MathML. `font` only breaks out
/// when it carries `color`, `face` or `size`; see [`is_breakout_start_tag`].
const BREAKOUT_TAGS: &[&str] = &[
    "b", "big", "blockquote", "body", "br", "center", "code", "dd", "div", "dl", "dt", "em",
    "embed", "h1", "h2", "h3", "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing",
    "menu", "meta", "nobr", "ol", "p", "pre", "ruby", "s", "small", "span", "strong", "strike",
    "sub", "sup", "table", "tt", "u", "ul", "var",
];

/// Whether an HTML start tag inside foreign content closes the foreign
/// subtree.
#[must_use]
pub fn is_breakout_start_tag(name: &str, attrs: &AttributesMap) -> bool {
    BREAKOUT_TAGS.contains(&name)
        || (name == "font" && ["color", "face", "size"].iter().any(|a| attrs.contains_key(*a)))
}

/// [§ 13.2.6 MathML text integration point](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
///
/// "A node is a MathML text integration point if it is one of the following
/// elements: A MathML mi element, ... mo ... mn ... ms ... mtext"
#[must_use]
pub fn is_mathml_text_integration_point(element: &ElementData) -> bool {
    element.namespace == Namespace::MathMl
        && matches!(element.tag_name.as_str(), "mi" | "mo" | "mn" | "ms" | "mtext")
}

/// [§ 13.2.6 HTML integration point](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
///
/// "A MathML annotation-xml element whose start tag token had an attribute
/// with the name "encoding" whose value was an ASCII case-insensitive match
/// for the string "text/html" ... or "application/xhtml+xml"", and the SVG
/// `foreignObject`, `desc` and `title` elements.
#[must_use]
pub fn is_html_integration_point(element: &ElementData) -> bool {
    match element.namespace {
        Namespace::Svg => matches!(element.tag_name.as_str(), "foreignObject" | "desc" | "title"),
        Namespace::MathMl => {
            element.tag_name == "annotation-xml"
                && element.attrs.get("encoding").is_some_and(|encoding| {
                    encoding.eq_ignore_ascii_case("text/html")
                        || encoding.eq_ignore_ascii_case("application/xhtml+xml")
                })
        }
        Namespace::Html => false,
    }
}

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// The foreign elements that bound an element scope: "MathML mi, MathML mo,
/// MathML mn, MathML ms, MathML mtext, MathML annotation-xml, SVG
/// foreignObject, SVG desc, SVG title".
#[must_use]
pub fn is_foreign_scope_marker(element: &ElementData) -> bool {
    match element.namespace {
        Namespace::MathMl => {
            is_mathml_text_integration_point(element) || element.tag_name == "annotation-xml"
        }
        Namespace::Svg => matches!(element.tag_name.as_str(), "foreignObject" | "desc" | "title"),
        Namespace::Html => false,
    }
}

/// Tag name and attributes of a start tag inserted in `namespace`, with the
/// case adjustments that namespace requires.
#[must_use]
pub fn adjust_for_namespace(
    name: &str,
    attrs: AttributesMap,
    namespace: Namespace,
) -> (String, AttributesMap) {
    match namespace {
        Namespace::Svg => (
            adjust_svg_tag_name(name).to_string(),
            adjust_svg_attributes(attrs),
        ),
        Namespace::MathMl => (name.to_string(), adjust_mathml_attributes(attrs)),
        Namespace::Html => (name.to_string(), attrs),
    }
}
