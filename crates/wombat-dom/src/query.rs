//! Tag-name element lookup.
//!
//! Only the two simplest selector forms are understood: `*` (or an empty
//! selector) matching every element, and a bare tag name.

use crate::{DomTree, NodeId};

/// All elements under `root` (inclusive) in tree order that match `selector`.
///
/// Template contents are searched after the template's own children.
#[must_use]
pub fn query(tree: &DomTree, root: NodeId, selector: &str) -> Vec<NodeId> {
    let selector = selector.trim();
    let wanted = (!selector.is_empty() && selector != "*").then(|| selector.to_ascii_lowercase());

    let mut out = Vec::new();
    collect(tree, root, wanted.as_deref(), &mut out);
    out
}

fn collect(tree: &DomTree, id: NodeId, wanted: Option<&str>, out: &mut Vec<NodeId>) {
    if let Some(element) = tree.as_element(id)
        && wanted.is_none_or(|name| element.tag_name.eq_ignore_ascii_case(name))
    {
        out.push(id);
    }
    for &child in tree.children(id) {
        collect(tree, child, wanted, out);
    }
    if let Some(contents) = tree.template_contents(id) {
        collect(tree, contents, wanted, out);
    }
}
