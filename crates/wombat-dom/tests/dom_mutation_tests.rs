//! Tests for tree mutation: append_child, insert_before, remove_child,
//! move_children, clone_node, and the parent back-reference they maintain.

use wombat_dom::{AttributesMap, DomTree, Namespace, NodeId, NodeType};

/// Helper to create an HTML element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.create_element(tag, Namespace::Html, AttributesMap::new())
}

fn alloc_text(tree: &mut DomTree, text: &str) -> NodeId {
    tree.alloc(NodeType::Text(text.to_string()))
}

// ========== append_child ==========

#[test]
fn test_append_sets_parent_and_siblings() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(parent, a);
    tree.append_child(parent, b);

    assert_eq!(tree.children(parent), &[a, b]);
    assert_eq!(tree.parent(a), Some(parent));
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
}

#[test]
fn test_append_attached_node_moves_it() {
    let mut tree = DomTree::new();
    let first = alloc_element(&mut tree, "div");
    let second = alloc_element(&mut tree, "section");
    tree.append_child(NodeId::ROOT, first);
    tree.append_child(NodeId::ROOT, second);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(first, child);
    tree.append_child(second, child);

    assert!(tree.children(first).is_empty());
    assert_eq!(tree.children(second), &[child]);
    assert_eq!(tree.parent(child), Some(second));
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child);

    assert!(tree.remove_child(parent, child));

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_middle_relinks_siblings() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "ul");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "li");
    let b = alloc_element(&mut tree, "li");
    let c = alloc_element(&mut tree, "li");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    assert!(tree.remove_child(parent, b));

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_non_child_is_noop() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let stranger = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, parent);
    tree.append_child(NodeId::ROOT, stranger);

    assert!(!tree.remove_child(parent, stranger));
    assert_eq!(tree.parent(stranger), Some(NodeId::ROOT));
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let existing = alloc_element(&mut tree, "b");
    tree.append_child(parent, existing);
    let new_child = alloc_element(&mut tree, "a");
    tree.insert_before(parent, new_child, Some(existing));

    assert_eq!(tree.children(parent), &[new_child, existing]);
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(parent, a);
    tree.append_child(parent, c);
    let b = alloc_element(&mut tree, "b");
    tree.insert_before(parent, b, Some(c));

    assert_eq!(tree.children(parent), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

#[test]
fn test_insert_before_none_appends() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    let a = alloc_element(&mut tree, "a");
    tree.append_child(parent, a);
    let b = alloc_element(&mut tree, "b");
    tree.insert_before(parent, b, None);

    assert_eq!(tree.children(parent), &[a, b]);
}

// ========== move_children ==========

#[test]
fn test_move_children_appends_to_existing() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "section");
    let kept = alloc_element(&mut tree, "h1");
    tree.append_child(to, kept);

    let x = alloc_element(&mut tree, "p");
    let y = alloc_text(&mut tree, "tail");
    tree.append_child(from, x);
    tree.append_child(from, y);

    tree.move_children(from, to);

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[kept, x, y]);
    assert_eq!(tree.parent(y), Some(to));
    assert_eq!(tree.prev_sibling(x), Some(kept));
}

// ========== append_text ==========

#[test]
fn test_append_text_merges_adjacent_text() {
    let mut tree = DomTree::new();
    let p = alloc_element(&mut tree, "p");
    tree.append_text(p, "Hello");
    tree.append_text(p, ", world");

    assert_eq!(tree.children(p).len(), 1);
    assert_eq!(tree.text_content(p), "Hello, world");
}

#[test]
fn test_append_text_after_element_makes_new_node() {
    let mut tree = DomTree::new();
    let p = alloc_element(&mut tree, "p");
    tree.append_text(p, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(p, b);
    tree.append_text(p, "c");

    assert_eq!(tree.children(p).len(), 3);
}

// ========== templates and cloning ==========

#[test]
fn test_template_gets_detached_contents_fragment() {
    let mut tree = DomTree::new();
    let template = alloc_element(&mut tree, "template");
    let contents = tree.template_contents(template);

    assert!(contents.is_some());
    assert!(tree.children(template).is_empty());
    assert!(matches!(
        contents.and_then(|c| tree.get(c)).map(|n| &n.node_type),
        Some(NodeType::DocumentFragment)
    ));
}

#[test]
fn test_svg_template_has_no_contents() {
    let mut tree = DomTree::new();
    let template = tree.create_element("template", Namespace::Svg, AttributesMap::new());
    assert_eq!(tree.template_contents(template), None);
}

#[test]
fn test_shallow_clone_copies_attributes_only() {
    let mut tree = DomTree::new();
    let mut attrs = AttributesMap::new();
    let _ = attrs.insert("class".to_string(), "x".to_string());
    let b = tree.create_element("b", Namespace::Html, attrs);
    tree.append_text(b, "bold");

    let clone = tree.clone_node(b, false);

    let class = tree.as_element(clone).and_then(|e| e.attrs.get("class"));
    assert_eq!(class.map(String::as_str), Some("x"));
    assert!(tree.children(clone).is_empty());
    assert_eq!(tree.parent(clone), None);
}

#[test]
fn test_deep_clone_copies_subtree() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    let span = alloc_element(&mut tree, "span");
    tree.append_child(div, span);
    tree.append_text(span, "inner");

    let clone = tree.clone_node(div, true);

    assert_eq!(tree.text_content(clone), "inner");
    assert_ne!(tree.children(clone), tree.children(div));
}

// ========== traversal ==========

#[test]
fn test_descendants_in_tree_order() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    tree.append_child(html, head);
    tree.append_child(html, body);
    let p = alloc_element(&mut tree, "p");
    tree.append_child(body, p);

    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![html, head, body, p]);
    assert_eq!(tree.head(), Some(head));
    assert_eq!(tree.body(), Some(body));
    assert!(tree.is_descendant_of(p, html));
    assert_eq!(tree.ancestors(p).collect::<Vec<_>>(), vec![body, html, NodeId::ROOT]);
}
