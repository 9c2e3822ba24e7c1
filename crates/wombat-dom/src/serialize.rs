//! Tree serialization: markup, plain text, and the html5lib tree dump.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)

use std::fmt::Write;

use crate::{DomTree, ElementData, Namespace, NodeId, NodeType};

/// [§ 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
/// Elements serialized without an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Children of these elements are written verbatim, never escaped.
const RAW_TEXT_PARENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Whitespace inside these elements is significant.
const PREFORMATTED_ELEMENTS: &[&str] = &["pre", "textarea", "code"];

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// Format: (qualified name, prefix, local name). On svg/math elements these
/// attributes are written with their local name.
pub const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, &str, &str)] = &[
    ("xlink:actuate", "xlink", "actuate"),
    ("xlink:arcrole", "xlink", "arcrole"),
    ("xlink:href", "xlink", "href"),
    ("xlink:role", "xlink", "role"),
    ("xlink:show", "xlink", "show"),
    ("xlink:title", "xlink", "title"),
    ("xlink:type", "xlink", "type"),
    ("xml:lang", "xml", "lang"),
    ("xml:space", "xml", "space"),
    ("xmlns", "", "xmlns"),
    ("xmlns:xlink", "xmlns", "xlink"),
];

/// Options for [`to_html`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Put block children on their own indented lines and collapse
    /// formatting whitespace in text.
    pub pretty: bool,
    /// Spaces per indentation level in pretty mode.
    pub indent_size: usize,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent_size: 2,
        }
    }
}

impl SerializeOptions {
    /// Compact output: no added whitespace, text written as parsed.
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            pretty: false,
            indent_size: 0,
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Prefer double quotes unless the value contains `"` and no `'`.
fn choose_quote(value: &str) -> char {
    if value.contains('"') && !value.contains('\'') {
        '\''
    } else {
        '"'
    }
}

fn escape_attribute_value(value: &str, quote: char) -> String {
    let escaped = value.replace('&', "&amp;");
    if quote == '"' {
        escaped.replace('"', "&quot;")
    } else {
        escaped.replace('\'', "&#39;")
    }
}

fn attribute_output_name<'a>(name: &'a str, namespace: Namespace) -> &'a str {
    if namespace == Namespace::Html {
        return name;
    }
    FOREIGN_ATTRIBUTE_ADJUSTMENTS
        .iter()
        .find(|(qualified, _, _)| qualified.eq_ignore_ascii_case(name))
        .map_or(name, |&(_, _, local)| local)
}

fn serialize_start_tag(element: &ElementData) -> String {
    let mut out = format!("<{}", element.tag_name);
    for (name, value) in &element.attrs {
        let name = attribute_output_name(name, element.namespace);
        // Boolean minimization: `disabled=""` and `disabled="disabled"` both
        // serialize as a bare `disabled`.
        if value.is_empty() || value.eq_ignore_ascii_case(name) {
            let _ = write!(out, " {name}");
            continue;
        }
        let quote = choose_quote(value);
        let _ = write!(
            out,
            " {name}={quote}{}{quote}",
            escape_attribute_value(value, quote)
        );
    }
    out.push('>');
    out
}

/// Replace runs of formatting whitespace (newline, tab, form feed, CR) with a
/// single space, dropping it entirely at the edges.
fn normalize_formatting_whitespace(text: &str) -> String {
    const FORMATTING: [char; 4] = ['\n', '\r', '\t', '\x0C'];
    if !text.contains(FORMATTING) {
        return text.to_string();
    }

    let starts_with_formatting = text.starts_with(FORMATTING);
    let ends_with_formatting = text.ends_with(FORMATTING);

    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    let mut saw_formatting = false;
    for c in text.chars() {
        if c == ' ' {
            if in_whitespace && saw_formatting {
                continue;
            }
            if !in_whitespace {
                saw_formatting = false;
            }
            in_whitespace = true;
            out.push(' ');
        } else if FORMATTING.contains(&c) {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
            saw_formatting = true;
        } else {
            in_whitespace = false;
            saw_formatting = false;
            out.push(c);
        }
    }

    let mut result = out.as_str();
    if starts_with_formatting {
        result = result.strip_prefix(' ').unwrap_or(result);
    }
    if ends_with_formatting {
        result = result.strip_suffix(' ').unwrap_or(result);
    }
    result.to_string()
}

fn serialize_doctype(tree: &DomTree, id: NodeId) -> String {
    let Some(doctype) = tree.as_doctype(id) else {
        return "<!DOCTYPE html>".to_string();
    };
    let Some(name) = doctype.name.as_deref().filter(|n| !n.is_empty()) else {
        return "<!DOCTYPE html>".to_string();
    };
    let public_id = doctype.public_id.as_deref().unwrap_or_default();
    let system_id = doctype.system_id.as_deref().unwrap_or_default();
    match (public_id.is_empty(), system_id.is_empty()) {
        (true, true) => format!("<!DOCTYPE {name}>"),
        (false, true) => format!("<!DOCTYPE {name} PUBLIC \"{public_id}\">"),
        (true, false) => format!("<!DOCTYPE {name} SYSTEM \"{system_id}\">"),
        (false, false) => format!("<!DOCTYPE {name} PUBLIC \"{public_id}\" \"{system_id}\">"),
    }
}

fn node_to_html(tree: &DomTree, id: NodeId, depth: usize, opts: SerializeOptions, in_pre: bool) -> String {
    let Some(node) = tree.get(id) else {
        return String::new();
    };

    match &node.node_type {
        NodeType::Text(text) => {
            let raw_parent = node
                .parent
                .and_then(|p| tree.as_element(p))
                .is_some_and(|e| e.namespace == Namespace::Html && RAW_TEXT_PARENTS.contains(&e.tag_name.as_str()));
            if raw_parent {
                text.clone()
            } else if in_pre || !opts.pretty {
                escape_text(text)
            } else {
                escape_text(&normalize_formatting_whitespace(text))
            }
        }
        NodeType::Comment(data) => format!("<!--{data}-->"),
        NodeType::Doctype(_) => serialize_doctype(tree, id),
        NodeType::Document | NodeType::DocumentFragment => {
            let parts: Vec<String> = node
                .children
                .iter()
                .map(|&child| node_to_html(tree, child, depth, opts, in_pre))
                .filter(|chunk| !(opts.pretty && chunk.is_empty()))
                .collect();
            parts.join(if opts.pretty { "\n" } else { "" })
        }
        NodeType::Element(element) => element_to_html(tree, id, element, depth, opts, in_pre),
    }
}

fn element_to_html(
    tree: &DomTree,
    id: NodeId,
    element: &ElementData,
    depth: usize,
    opts: SerializeOptions,
    in_pre: bool,
) -> String {
    let name = element.tag_name.as_str();
    let start_tag = serialize_start_tag(element);
    let is_void = element.namespace == Namespace::Html && VOID_ELEMENTS.contains(&name);
    let is_pre = in_pre || PREFORMATTED_ELEMENTS.contains(&name);

    // [§ 13.3] "If current node is a template element, then let the node be
    // the template element's template contents"
    let content_root = element.template_contents.unwrap_or(id);
    let children = tree.children(content_root);

    if children.is_empty() {
        return if is_void {
            start_tag
        } else {
            format!("{start_tag}</{name}>")
        };
    }

    let chunks: Vec<String> = children
        .iter()
        .map(|&child| node_to_html(tree, child, depth + 1, opts, is_pre))
        .collect();

    let has_element_child = children.iter().any(|&c| tree.as_element(c).is_some());
    if !opts.pretty || is_pre || !has_element_child {
        return format!("{start_tag}{}</{name}>", chunks.concat());
    }

    let pad = " ".repeat(opts.indent_size * depth);
    let child_pad = " ".repeat(opts.indent_size * (depth + 1));
    let inner: Vec<String> = chunks
        .into_iter()
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| format!("{child_pad}{chunk}"))
        .collect();
    format!("{start_tag}\n{}\n{pad}</{name}>", inner.join("\n"))
}

/// Serialize `id` (and its subtree) to markup.
///
/// A document or fragment serializes as its children; an element serializes
/// as itself, including its start and end tags.
#[must_use]
pub fn to_html(tree: &DomTree, id: NodeId, opts: &SerializeOptions) -> String {
    node_to_html(tree, id, 0, *opts, false)
}

/// The text of every descendant text node of `id` in tree order (entering
/// template contents), each trimmed and dropped when empty if `strip` is
/// set, joined by `separator`.
#[must_use]
pub fn to_text(tree: &DomTree, id: NodeId, separator: &str, strip: bool) -> String {
    let mut parts = Vec::new();
    collect_text(tree, id, strip, &mut parts);
    parts.join(separator)
}

fn collect_text<'a>(tree: &'a DomTree, id: NodeId, strip: bool, parts: &mut Vec<&'a str>) {
    if let Some(text) = tree.as_text(id) {
        let text = if strip { text.trim() } else { text };
        if !(strip && text.is_empty()) {
            parts.push(text);
        }
        return;
    }
    if let Some(contents) = tree.template_contents(id) {
        collect_text(tree, contents, strip, parts);
    }
    for &child in tree.children(id) {
        collect_text(tree, child, strip, parts);
    }
}

/// Dump the tree in the html5lib test-suite format:
///
/// ```text
/// | <html>
/// |   <head>
/// |   <body>
/// |     <p>
/// |       class="x"
/// |       "text"
/// ```
#[must_use]
pub fn to_test_format(tree: &DomTree, id: NodeId) -> String {
    let mut lines = Vec::new();
    dump_node(tree, id, 0, &mut lines);
    lines.join("\n")
}

fn dump_node(tree: &DomTree, id: NodeId, depth: usize, lines: &mut Vec<String>) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let indent = "  ".repeat(depth);

    match &node.node_type {
        NodeType::Document | NodeType::DocumentFragment => {
            for &child in &node.children {
                dump_node(tree, child, depth, lines);
            }
        }
        NodeType::Text(text) => lines.push(format!("| {indent}\"{text}\"")),
        NodeType::Comment(data) => lines.push(format!("| {indent}<!-- {data} -->")),
        NodeType::Doctype(doctype) => {
            let name = doctype.name.as_deref().unwrap_or_default();
            let public_id = doctype.public_id.as_deref().unwrap_or_default();
            let system_id = doctype.system_id.as_deref().unwrap_or_default();
            if doctype.public_id.is_none() && doctype.system_id.is_none() {
                lines.push(format!("| {indent}<!DOCTYPE {name}>"));
            } else {
                lines.push(format!(
                    "| {indent}<!DOCTYPE {name} \"{public_id}\" \"{system_id}\">"
                ));
            }
        }
        NodeType::Element(element) => {
            let prefix = match element.namespace {
                Namespace::Html => "",
                Namespace::Svg => "svg ",
                Namespace::MathMl => "math ",
            };
            lines.push(format!("| {indent}<{prefix}{}>", element.tag_name));

            let mut attrs: Vec<(&String, &String)> = element.attrs.iter().collect();
            attrs.sort();
            for (name, value) in attrs {
                lines.push(format!("| {indent}  {name}=\"{value}\""));
            }

            if let Some(contents) = element.template_contents {
                lines.push(format!("| {indent}  content"));
                dump_node(tree, contents, depth + 2, lines);
            }
            for &child in &node.children {
                dump_node(tree, child, depth + 1, lines);
            }
        }
    }
}
