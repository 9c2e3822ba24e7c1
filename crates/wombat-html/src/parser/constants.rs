//! Element category tables used by tree construction.

pub use wombat_dom::serialize::VOID_ELEMENTS;

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
///
/// "The elements in the formatting category are: a, b, big, code, em, font,
/// i, nobr, s, small, strike, strong, tt, u."
pub const FORMATTING_ELEMENTS: &[&str] = &[
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small", "strike", "strong", "tt",
    "u",
];

/// [§ 13.2.6.2 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
///
/// "while the current node is a dd element, a dt element, an li element, an
/// optgroup element, an option element, a p element, an rb element, an rp
/// element, an rt element, or an rtc element, the user agent must pop the
/// current node off the stack of open elements."
pub const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// Start tags that close an open `p` in button scope before inserting
/// themselves.
pub const CLOSES_P_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dir", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main", "menu", "nav",
    "ol", "p", "search", "section", "summary", "ul",
];

/// `h1` through `h6`.
pub const HEADING_ELEMENTS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements handled by the "in head" rules wherever they appear.
pub const HEAD_ELEMENTS: &[&str] = &[
    "base", "basefont", "bgsound", "link", "meta", "noframes", "script", "style", "template",
    "title",
];

/// Elements that table modes treat as table structure.
pub const TABLE_SECTION_ELEMENTS: &[&str] = &["tbody", "tfoot", "thead"];

/// End tags the table modes ignore with a parse error.
pub const IGNORED_TABLE_END_TAGS: &[&str] = &[
    "body", "col", "colgroup", "html", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-scope)
///
/// "applet, caption, html, table, td, th, marquee, object, template", plus
/// the foreign scope markers checked separately.
pub const DEFAULT_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];

/// "has an element in button scope": the default scope plus `button`.
pub const BUTTON_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "button",
];

/// "has an element in list item scope": the default scope plus `ol`, `ul`.
pub const LIST_ITEM_SCOPE: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template", "ol", "ul",
];

/// "has an element in table scope": "html, table, template".
pub const TABLE_SCOPE: &[&str] = &["html", "table", "template"];

/// [§ 13.2.4.3 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// HTML-namespace members of the special category.
pub const SPECIAL_ELEMENTS: &[&str] = &[
    "address", "applet", "area", "article", "aside", "base", "basefont", "bgsound", "blockquote",
    "body", "br", "button", "caption", "center", "col", "colgroup", "dd", "details", "dir", "div",
    "dl", "dt", "embed", "fieldset", "figcaption", "figure", "footer", "form", "frame",
    "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html",
    "iframe", "img", "input", "keygen", "li", "link", "listing", "main", "marquee", "menu",
    "meta", "nav", "noembed", "noframes", "noscript", "object", "ol", "p", "param", "plaintext",
    "pre", "script", "search", "section", "select", "source", "style", "summary", "table",
    "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "title", "tr", "track", "ul",
    "wbr", "xmp",
];

/// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
#[must_use]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// Split character data into its leading whitespace and the rest.
#[must_use]
pub fn split_leading_whitespace(text: &str) -> (&str, &str) {
    let end = text.find(|c: char| !is_whitespace(c)).unwrap_or(text.len());
    text.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_leading_whitespace() {
        assert_eq!(split_leading_whitespace("  \nab c"), ("  \n", "ab c"));
        assert_eq!(split_leading_whitespace("   "), ("   ", ""));
        assert_eq!(split_leading_whitespace("x"), ("", "x"));
    }
}
