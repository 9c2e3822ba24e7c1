//! Terminal and JSON renderings of a parsed document.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::{Map, Value, json};
use wombat_dom::{DomTree, Namespace, NodeId, NodeType};
use wombat_html::{Document, ParseError, Token};

/// Print the token stream, one numbered token per line.
pub fn print_tokens(tokens: &[Token]) {
    println!("=== HTML Tokens ({}) ===", tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        println!("  {i:3}: {token:?}");
    }
    println!();
}

/// Print the tree with a header carrying the quirks mode and encoding.
pub fn print_document(document: &Document) {
    let encoding = document
        .encoding
        .as_deref()
        .map(|name| format!(", {name}"))
        .unwrap_or_default();
    println!("=== DOM Tree ({}{encoding}) ===", document.quirks_mode);
    print_tree(&document.tree, document.tree.root(), 0);
}

/// Print the parse errors under a counted header.
pub fn print_errors(errors: &[ParseError]) {
    println!("\n=== Parse Errors ({}) ===", errors.len());
    for error in errors {
        println!("  - {}", error.red());
    }
}

fn tag_label(tag_name: &str, namespace: Namespace) -> String {
    match namespace {
        Namespace::Html => tag_name.to_string(),
        _ => format!("{namespace} {tag_name}"),
    }
}

/// Indented, colored tree. Whitespace in text is made visible.
fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => println!("{prefix}{}", "#document".bold()),
        NodeType::DocumentFragment => println!("{prefix}{}", "#document-fragment".bold()),
        NodeType::Element(data) => {
            let label = tag_label(&data.tag_name, data.namespace);
            if data.attrs.is_empty() {
                println!("{prefix}{}", format!("<{label}>").cyan());
            } else {
                let attrs: Vec<String> = data
                    .attrs
                    .iter()
                    .map(|(k, v)| {
                        if v.is_empty() {
                            k.clone()
                        } else {
                            format!("{k}=\"{v}\"")
                        }
                    })
                    .collect();
                println!(
                    "{prefix}{}{}{}",
                    format!("<{label} ").cyan(),
                    attrs.join(" ").yellow(),
                    ">".cyan()
                );
            }
            if let Some(contents) = data.template_contents {
                println!("{prefix}  {}", "content".dimmed());
                print_tree(tree, contents, indent + 2);
            }
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            println!("{prefix}{}", format!("\"{display}\"").green());
        }
        NodeType::Comment(data) => println!("{prefix}{}", format!("<!-- {data} -->").dimmed()),
        NodeType::Doctype(doctype) => {
            let name = doctype.name.as_deref().unwrap_or_default();
            println!("{prefix}{}", format!("<!DOCTYPE {name}>").magenta());
        }
    }
    for &child in tree.children(id) {
        print_tree(tree, child, indent + 1);
    }
}

/// Print `{ quirksMode, encoding, errors, document }` as pretty JSON.
pub fn print_json(document: &Document) -> Result<()> {
    let json = json!({
        "quirksMode": document.quirks_mode,
        "encoding": document.encoding,
        "errors": document.errors,
        "document": node_to_json(&document.tree, document.tree.root()),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn node_to_json(tree: &DomTree, id: NodeId) -> Value {
    let mut obj = Map::new();
    let Some(node) = tree.get(id) else {
        return Value::Object(obj);
    };

    match &node.node_type {
        NodeType::Document => {
            let _ = obj.insert("type".to_string(), json!("document"));
        }
        NodeType::DocumentFragment => {
            let _ = obj.insert("type".to_string(), json!("fragment"));
        }
        NodeType::Element(data) => {
            let _ = obj.insert("type".to_string(), json!("element"));
            let _ = obj.insert("tagName".to_string(), json!(data.tag_name));
            let _ = obj.insert("namespace".to_string(), json!(data.namespace.to_string()));
            let attrs: Map<String, Value> = data
                .attrs
                .iter()
                .map(|(k, v)| (k.clone(), json!(v)))
                .collect();
            let _ = obj.insert("attributes".to_string(), Value::Object(attrs));
            if let Some(contents) = data.template_contents {
                let _ = obj.insert("content".to_string(), node_to_json(tree, contents));
            }
        }
        NodeType::Text(text) => {
            let _ = obj.insert("type".to_string(), json!("text"));
            let _ = obj.insert("content".to_string(), json!(text));
        }
        NodeType::Comment(text) => {
            let _ = obj.insert("type".to_string(), json!("comment"));
            let _ = obj.insert("content".to_string(), json!(text));
        }
        NodeType::Doctype(doctype) => {
            let _ = obj.insert("type".to_string(), json!("doctype"));
            let _ = obj.insert("name".to_string(), json!(doctype.name));
            let _ = obj.insert("publicId".to_string(), json!(doctype.public_id));
            let _ = obj.insert("systemId".to_string(), json!(doctype.system_id));
        }
    }

    let children = tree.children(id);
    if !children.is_empty() {
        let children: Vec<Value> = children
            .iter()
            .map(|&child| node_to_json(tree, child))
            .collect();
        let _ = obj.insert("children".to_string(), Value::Array(children));
    }

    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wombat_html::{ParseOptions, parse};

    #[test]
    fn test_json_tree_shape() {
        let document = parse(
            "<!DOCTYPE html><p class=a>x",
            &ParseOptions::default(),
        )
        .unwrap();
        let json = node_to_json(&document.tree, document.tree.root());
        assert_eq!(json["type"], "document");
        assert_eq!(json["children"][0]["type"], "doctype");
        assert_eq!(json["children"][0]["name"], "html");

        let body = &json["children"][1]["children"][1];
        assert_eq!(body["tagName"], "body");
        let p = &body["children"][0];
        assert_eq!(p["attributes"]["class"], "a");
        assert_eq!(p["namespace"], "html");
        assert_eq!(p["children"][0]["content"], "x");
    }

    #[test]
    fn test_json_template_content() {
        let document = parse(
            "<template><b>t</b></template>",
            &ParseOptions::default().with_fragment(),
        )
        .unwrap();
        let json = node_to_json(&document.tree, document.tree.root());
        assert_eq!(json["type"], "fragment");
        let template = &json["children"][0];
        assert_eq!(template["content"]["children"][0]["tagName"], "b");
        assert!(template.get("children").is_none());
    }

    #[test]
    fn test_foreign_label() {
        assert_eq!(tag_label("circle", Namespace::Svg), "svg circle");
        assert_eq!(tag_label("p", Namespace::Html), "p");
    }
}
