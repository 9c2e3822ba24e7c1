//! Tests for markup/text serialization, the html5lib tree dump, and query.

use wombat_dom::{
    AttributesMap, DoctypeData, DomTree, Namespace, NodeId, NodeType, SerializeOptions, query,
    to_html, to_test_format, to_text,
};

fn attrs(pairs: &[(&str, &str)]) -> AttributesMap {
    pairs
        .iter()
        .map(|&(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Builds `<div id="main"><p>Hello <b>world</b>!</p></div>` under the root.
fn sample_tree() -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let div = tree.create_element("div", Namespace::Html, attrs(&[("id", "main")]));
    tree.append_child(NodeId::ROOT, div);
    let p = tree.create_element("p", Namespace::Html, AttributesMap::new());
    tree.append_child(div, p);
    tree.append_text(p, "Hello ");
    let b = tree.create_element("b", Namespace::Html, AttributesMap::new());
    tree.append_child(p, b);
    tree.append_text(b, "world");
    tree.append_text(p, "!");
    (tree, div)
}

#[test]
fn test_compact_html() {
    let (tree, div) = sample_tree();
    assert_eq!(
        to_html(&tree, div, &SerializeOptions::compact()),
        "<div id=\"main\"><p>Hello <b>world</b>!</p></div>"
    );
}

#[test]
fn test_pretty_html_indents_block_children() {
    let (tree, div) = sample_tree();
    assert_eq!(
        to_html(&tree, div, &SerializeOptions::default()),
        "<div id=\"main\">\n  <p>\n    Hello \n    <b>world</b>\n    !\n  </p>\n</div>"
    );
}

#[test]
fn test_text_joined_and_stripped() {
    let (tree, _) = sample_tree();
    assert_eq!(to_text(&tree, NodeId::ROOT, " ", true), "Hello world !");
    assert_eq!(to_text(&tree, NodeId::ROOT, "", false), "Hello world!");
}

#[test]
fn test_text_is_escaped_but_script_is_not() {
    let mut tree = DomTree::new();
    let p = tree.create_element("p", Namespace::Html, AttributesMap::new());
    tree.append_text(p, "a < b & c");
    let script = tree.create_element("script", Namespace::Html, AttributesMap::new());
    tree.append_text(script, "if (a < b) {}");

    let opts = SerializeOptions::compact();
    assert_eq!(to_html(&tree, p, &opts), "<p>a &lt; b &amp; c</p>");
    assert_eq!(to_html(&tree, script, &opts), "<script>if (a < b) {}</script>");
}

#[test]
fn test_void_and_boolean_attributes() {
    let mut tree = DomTree::new();
    let input = tree.create_element(
        "input",
        Namespace::Html,
        attrs(&[("disabled", ""), ("checked", "checked"), ("value", "say \"hi\"")]),
    );
    assert_eq!(
        to_html(&tree, input, &SerializeOptions::compact()),
        "<input disabled checked value='say \"hi\"'>"
    );
}

#[test]
fn test_foreign_attribute_written_with_local_name() {
    let mut tree = DomTree::new();
    let use_el = tree.create_element("use", Namespace::Svg, attrs(&[("xlink:href", "#a")]));
    assert_eq!(
        to_html(&tree, use_el, &SerializeOptions::compact()),
        "<use href=\"#a\"></use>"
    );
}

#[test]
fn test_doctype_forms() {
    let mut tree = DomTree::new();
    let doctype = tree.alloc(NodeType::Doctype(DoctypeData {
        name: Some("html".to_string()),
        public_id: Some("-//W3C//DTD HTML 4.01//EN".to_string()),
        system_id: None,
    }));
    tree.append_child(NodeId::ROOT, doctype);
    assert_eq!(
        to_html(&tree, NodeId::ROOT, &SerializeOptions::compact()),
        "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\">"
    );
}

#[test]
fn test_template_contents_serialized_as_children() {
    let mut tree = DomTree::new();
    let template = tree.create_element("template", Namespace::Html, AttributesMap::new());
    let contents = tree.template_contents(template).unwrap_or(template);
    tree.append_text(contents, "inert");
    assert_eq!(
        to_html(&tree, template, &SerializeOptions::compact()),
        "<template>inert</template>"
    );
}

#[test]
fn test_test_format_dump() {
    let mut tree = DomTree::new();
    let html = tree.create_element("html", Namespace::Html, AttributesMap::new());
    tree.append_child(NodeId::ROOT, html);
    let body = tree.create_element("body", Namespace::Html, attrs(&[("z", "1"), ("a", "2")]));
    tree.append_child(html, body);
    let svg = tree.create_element("svg", Namespace::Svg, AttributesMap::new());
    tree.append_child(body, svg);
    let comment = tree.alloc(NodeType::Comment("note".to_string()));
    tree.append_child(body, comment);
    tree.append_text(body, "x");

    let expected = [
        "| <html>",
        "|   <body>",
        "|     a=\"2\"",
        "|     z=\"1\"",
        "|     <svg svg>",
        "|     <!-- note -->",
        "|     \"x\"",
    ]
    .join("\n");
    assert_eq!(to_test_format(&tree, NodeId::ROOT), expected);
}

#[test]
fn test_query_by_tag_and_wildcard() {
    let (mut tree, div) = sample_tree();
    let template = tree.create_element("template", Namespace::Html, AttributesMap::new());
    tree.append_child(div, template);
    let contents = tree.template_contents(template).unwrap_or(template);
    let inner = tree.create_element("b", Namespace::Html, AttributesMap::new());
    tree.append_child(contents, inner);

    let bs = query(&tree, NodeId::ROOT, " B ");
    assert_eq!(bs.len(), 2);
    assert_eq!(bs[1], inner);

    assert_eq!(query(&tree, NodeId::ROOT, "*").len(), 5);
    assert_eq!(query(&tree, NodeId::ROOT, "").len(), 5);
}
