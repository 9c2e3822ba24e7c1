//! Integration tests for serializing parsed documents.

use wombat_dom::SerializeOptions;
use wombat_html::{Document, ParseOptions, parse};

fn document(html: &str) -> Document {
    parse(html, &ParseOptions::default()).expect("non-strict parse")
}

fn compact(html: &str) -> String {
    document(html).to_html(&SerializeOptions::compact())
}

fn fragment(html: &str) -> Document {
    parse(html, &ParseOptions::default().with_fragment()).expect("non-strict parse")
}

#[test]
fn test_compact_document() {
    assert_eq!(
        compact("<!DOCTYPE html><p class=a>x &amp; y"),
        "<!DOCTYPE html><html><head></head><body><p class=\"a\">x &amp; y</p></body></html>"
    );
}

#[test]
fn test_pretty_document() {
    assert_eq!(
        document("<p>A<p>B").to_html(&SerializeOptions::default()),
        "<html>\n  <head></head>\n  <body>\n    <p>A</p>\n    <p>B</p>\n  </body>\n</html>"
    );
}

#[test]
fn test_pretty_indent_size() {
    let opts = SerializeOptions {
        pretty: true,
        indent_size: 4,
    };
    let html = document("<ul><li>x</ul>").to_html(&opts);
    assert!(html.contains("\n        <ul>\n            <li>x</li>\n        </ul>"));
}

#[test]
fn test_synthesized_structure_is_serialized() {
    assert_eq!(
        compact("<table><td>x</table>"),
        "<html><head></head><body><table><tbody><tr><td>x</td></tr></tbody></table></body></html>"
    );
}

#[test]
fn test_reparse_of_serialization_is_stable() {
    for html in [
        "<table><td>x</table>",
        "<ul><li>a<li>b</ul><p>c",
        "<b>1<p>2</b>3",
        "<svg viewbox=\"0 0 1 1\"><clippath/></svg>",
        "<template><p>t</template>",
    ] {
        let first = document(html);
        let again = document(&first.to_html(&SerializeOptions::compact()));
        assert_eq!(first.to_test_format(), again.to_test_format(), "input: {html}");
    }
}

#[test]
fn test_foreign_names_keep_case() {
    assert_eq!(
        fragment("<svg viewbox=\"0 0 1 1\"><clippath/></svg>").to_html(&SerializeOptions::compact()),
        "<svg viewBox=\"0 0 1 1\"><clipPath></clipPath></svg>"
    );
}

#[test]
fn test_raw_text_is_not_escaped() {
    let html = compact("<script>a<b && c</script><style>p>q{}</style>");
    assert!(html.contains("<script>a<b && c</script>"));
    assert!(html.contains("<style>p>q{}</style>"));
}

#[test]
fn test_title_text_is_escaped() {
    assert!(compact("<title>a &lt; b</title>").contains("<title>a &lt; b</title>"));
}

#[test]
fn test_fragment_serializes_children_only() {
    assert_eq!(
        fragment("<b>x</b>y").to_html(&SerializeOptions::compact()),
        "<b>x</b>y"
    );
}

#[test]
fn test_comments_and_doctype() {
    assert_eq!(
        compact("<!--a--><!DOCTYPE html><body><!--b-->"),
        "<!--a--><!DOCTYPE html><html><head></head><body><!--b--></body></html>"
    );
}

// ========== Text extraction ==========

#[test]
fn test_text_with_separator_and_strip() {
    let document = document("<p>a</p><p> b </p><p>  </p>");
    assert_eq!(document.to_text(" ", true), "a b");
    assert_eq!(document.to_text("|", false), "a| b |  ");
}

#[test]
fn test_text_skips_markup() {
    assert_eq!(document("<p>x<b>y</b>z").to_text("", false), "xyz");
}

#[test]
fn test_text_includes_template_contents() {
    assert_eq!(fragment("<template>t</template>u").to_text("", false), "tu");
}

// ========== Query ==========

#[test]
fn test_query_by_tag() {
    let document = document("<div><p>1</p><section><p>2</p></section></div>");
    let paragraphs = document.query("p");
    assert_eq!(paragraphs.len(), 2);
    assert_eq!(document.tree.text_content(paragraphs[1]), "2");
    assert_eq!(document.query("P").len(), 2);
}

#[test]
fn test_query_wildcard_matches_every_element() {
    assert_eq!(document("<p>x").query("*").len(), 4);
    assert!(document("<p>x").query("table").is_empty());
}
