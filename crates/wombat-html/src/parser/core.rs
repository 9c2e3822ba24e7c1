use strum_macros::Display;

use wombat_common::warning::warn_once;
use wombat_dom::{AttributesMap, DoctypeData, DomTree, ElementData, Namespace, NodeId, NodeType};

use super::constants::{
    BUTTON_SCOPE, CLOSES_P_ELEMENTS, DEFAULT_SCOPE, FORMATTING_ELEMENTS, HEAD_ELEMENTS,
    HEADING_ELEMENTS, IGNORED_TABLE_END_TAGS, IMPLIED_END_TAGS, LIST_ITEM_SCOPE, SPECIAL_ELEMENTS,
    TABLE_SCOPE, TABLE_SECTION_ELEMENTS, VOID_ELEMENTS, is_whitespace, split_leading_whitespace,
};
use super::foreign_content::{
    adjust_for_namespace, is_breakout_start_tag, is_foreign_scope_marker,
    is_html_integration_point, is_mathml_text_integration_point,
};
use super::quirks::{QuirksMode, doctype_error_and_quirks};
use crate::error::ParseError;
use crate::tokenizer::{RawKind, Token, TokenSink, TokenSinkResult, raw_kind_for};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
///
/// Caption, column group, select and template contents are parsed with the
/// "in table" and "in body" rules; there are no dedicated modes for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
///
/// The element a fragment is parsed as the contents of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentContext {
    /// Lowercase tag name of the context element.
    pub tag_name: String,
    /// Namespace of the context element; `None` means HTML.
    pub namespace: Option<Namespace>,
}

impl FragmentContext {
    /// An HTML context element.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            namespace: None,
        }
    }

    /// Place the context element in `namespace`.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }
}

/// Tree builder configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeBuilderOpts {
    /// Parse a fragment in this context instead of a whole document.
    pub fragment_context: Option<FragmentContext>,
    /// The document is an `iframe` `srcdoc` document: a missing or odd
    /// DOCTYPE never selects quirks mode.
    pub iframe_srcdoc: bool,
    /// Record tree construction errors.
    pub collect_errors: bool,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Builds a [`DomTree`] from the tokens a [`Tokenizer`](crate::tokenizer::Tokenizer)
/// pushes into it. Call [`TreeBuilder::finish`] once the tokenizer has
/// delivered [`Token::EndOfInput`].
pub struct TreeBuilder {
    opts: TreeBuilderOpts,

    /// `NodeId::ROOT` is the Document (or `DocumentFragment`) node.
    tree: DomTree,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    /// The mode to return to when a raw text element closes.
    original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Index 0 is the `html` element once it exists and is never popped.
    stack_of_open_elements: Vec<NodeId>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    head_element_pointer: Option<NodeId>,

    quirks_mode: QuirksMode,

    errors: Vec<ParseError>,

    /// Raw text state requested for the tokenizer by the start tag being
    /// processed.
    pending_switch: Option<RawKind>,

    /// "If the next token is a U+000A LINE FEED (LF) character token, then
    /// ignore that token" (after `pre`, `listing` and `textarea`).
    skip_leading_newline: bool,
}

impl TreeBuilder {
    /// Create a tree builder. A fragment builder starts "in body" with a
    /// synthetic `html` root carrying the context element's namespace.
    #[must_use]
    pub fn new(opts: TreeBuilderOpts) -> Self {
        let fragment_namespace = opts
            .fragment_context
            .as_ref()
            .map(|context| context.namespace.unwrap_or_default());
        let mut builder = Self {
            tree: if fragment_namespace.is_some() {
                DomTree::new_fragment()
            } else {
                DomTree::new()
            },
            opts,
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            stack_of_open_elements: Vec::new(),
            head_element_pointer: None,
            quirks_mode: QuirksMode::NoQuirks,
            errors: Vec::new(),
            pending_switch: None,
            skip_leading_newline: false,
        };
        if let Some(namespace) = fragment_namespace {
            let html = builder
                .tree
                .create_element("html", namespace, AttributesMap::new());
            builder.tree.append_child(NodeId::ROOT, html);
            builder.stack_of_open_elements.push(html);
            builder.insertion_mode = InsertionMode::InBody;
        }
        builder
    }

    /// The document's compatibility mode, as set by its DOCTYPE.
    #[must_use]
    pub const fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// The current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// The tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Tree construction errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// [§ 13.2.7 The end](https://html.spec.whatwg.org/multipage/parsing.html#the-end)
    ///
    /// Check for an unclosed element at end of input and hand back the tree
    /// and the tree construction errors. The tree is returned however much
    /// of it was built. A fragment's children are moved out of the synthetic
    /// `html` root onto the `DocumentFragment`.
    #[must_use]
    pub fn finish(mut self) -> (DomTree, Vec<ParseError>) {
        if self.opts.collect_errors && self.stack_of_open_elements.len() > 1 {
            let unclosed = self.current_element().and_then(|element| {
                let name = element.tag_name.as_str();
                let acceptable = matches!(name, "html" | "body")
                    || (name == "frameset" && self.insertion_mode == InsertionMode::InFrameset)
                    || IMPLIED_END_TAGS.contains(&name);
                (!acceptable).then(|| name.to_string())
            });
            if let Some(name) = unclosed {
                self.parse_error("expected-closing-tag-but-got-eof", Some(&name));
            }
        }

        if self.opts.fragment_context.is_some()
            && let Some(html) = self.tree.first_child(NodeId::ROOT)
        {
            self.tree.move_children(html, NodeId::ROOT);
            let _ = self.tree.remove_child(NodeId::ROOT, html);
        }

        (self.tree, self.errors)
    }

    fn parse_error(&mut self, code: &str, tag_name: Option<&str>) {
        if self.opts.collect_errors {
            self.errors.push(ParseError::new(code, tag_name));
        }
    }

    /// `unexpected-start-tag` or `unexpected-end-tag` for a tag token that is
    /// ignored.
    fn unexpected_tag(&mut self, token: &Token) {
        match token {
            Token::StartTag { name, .. } => self.parse_error("unexpected-start-tag", Some(name)),
            Token::EndTag { name } => self.parse_error("unexpected-end-tag", Some(name)),
            _ => {}
        }
    }

    fn switch_to(&mut self, mode: InsertionMode) {
        log::trace!(target: "wombat.tree_builder", "{} -> {mode}", self.insertion_mode);
        self.insertion_mode = mode;
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    fn process_token(&mut self, token: &Token) {
        if self.should_use_foreign_content_rules(token) {
            self.handle_in_foreign_content(token);
        } else {
            self.process_using_insertion_mode(token);
        }
    }

    /// "Reprocess the token" in whatever mode the handler switched to.
    fn reprocess_token(&mut self, token: &Token) {
        self.process_token(token);
    }

    fn process_using_insertion_mode(&mut self, token: &Token) {
        match self.insertion_mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::InTable => self.handle_in_table_mode(token),
            InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
            InsertionMode::InRow => self.handle_in_row_mode(token),
            InsertionMode::InCell => self.handle_in_cell_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset_mode(token),
        }
    }

    // ========== Stack of open elements ==========

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#current-node)
    ///
    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    fn current_element(&self) -> Option<&ElementData> {
        self.current_node().and_then(|id| self.tree.as_element(id))
    }

    fn current_node_is(&self, tag_name: &str) -> bool {
        self.current_element()
            .is_some_and(|element| element.is_html(tag_name))
    }

    /// The current node is one the "in table" text rules care about.
    fn current_node_is_table_structure(&self) -> bool {
        self.current_element().is_some_and(|element| {
            element.namespace == Namespace::Html
                && matches!(
                    element.tag_name.as_str(),
                    "table" | "tbody" | "tfoot" | "thead" | "tr"
                )
        })
    }

    /// Index of the topmost open HTML element named `tag_name`, excluding the
    /// root at index 0.
    fn position_of_open_element(&self, tag_name: &str) -> Option<usize> {
        self.stack_of_open_elements
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|&(_, &id)| {
                self.tree
                    .as_element(id)
                    .is_some_and(|element| element.is_html(tag_name))
            })
            .map(|(index, _)| index)
    }

    /// Pop the current node, never the root.
    fn pop_current_node(&mut self) {
        if self.stack_of_open_elements.len() > 1 {
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// Pop elements until an HTML element named `tag_name` has been popped.
    /// Does nothing if there is none above the root.
    fn pop_until_tag(&mut self, tag_name: &str) {
        if let Some(index) = self.position_of_open_element(tag_name) {
            self.stack_of_open_elements.truncate(index);
        }
    }

    /// Pop elements until one of `tag_names` has been popped.
    fn pop_until_one_of(&mut self, tag_names: &[&str]) {
        let index = tag_names
            .iter()
            .filter_map(|name| self.position_of_open_element(name))
            .max();
        if let Some(index) = index {
            self.stack_of_open_elements.truncate(index);
        }
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node
    ///          of the stack)."
    /// STEP 2: "If node is the target node, terminate in a match state."
    /// STEP 3: "Otherwise, if node is one of the element types in list,
    ///          terminate in a failure state."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to step 2."
    fn has_element_in_specific_scope(
        &self,
        tag_name: &str,
        scope_markers: &[&str],
        foreign_markers: bool,
    ) -> bool {
        for &node_id in self.stack_of_open_elements.iter().rev() {
            let Some(element) = self.tree.as_element(node_id) else {
                continue;
            };
            if element.is_html(tag_name) {
                return true;
            }
            if element.namespace == Namespace::Html
                && scope_markers.contains(&element.tag_name.as_str())
            {
                return false;
            }
            if foreign_markers && is_foreign_scope_marker(element) {
                return false;
            }
        }
        false
    }

    fn has_element_in_scope(&self, tag_name: &str) -> bool {
        self.has_element_in_specific_scope(tag_name, DEFAULT_SCOPE, true)
    }

    fn has_element_in_button_scope(&self, tag_name: &str) -> bool {
        self.has_element_in_specific_scope(tag_name, BUTTON_SCOPE, true)
    }

    fn has_element_in_list_item_scope(&self, tag_name: &str) -> bool {
        self.has_element_in_specific_scope(tag_name, LIST_ITEM_SCOPE, true)
    }

    fn has_element_in_table_scope(&self, tag_name: &str) -> bool {
        self.has_element_in_specific_scope(tag_name, TABLE_SCOPE, false)
    }

    /// [§ 13.2.6.2 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "If a step requires the user agent to generate implied end tags but lists
    /// an element to exclude from the process, then the user agent must perform
    /// the above steps as if that element was not in the above list."
    fn generate_implied_end_tags_excluding(&mut self, exclude: Option<&str>) {
        while self.stack_of_open_elements.len() > 1
            && let Some(element) = self.current_element()
            && element.namespace == Namespace::Html
            && IMPLIED_END_TAGS.contains(&element.tag_name.as_str())
            && exclude != Some(element.tag_name.as_str())
        {
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    fn close_p_element_in_button_scope(&mut self) {
        if self.has_element_in_button_scope("p") {
            self.close_p_element();
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "Generate implied end tags, except for p elements. If the current node
    /// is not a p element, then this is a parse error. Pop elements from the
    /// stack of open elements until a p element has been popped from the stack."
    fn close_p_element(&mut self) {
        self.generate_implied_end_tags_excluding(Some("p"));
        if !self.current_node_is("p") {
            self.parse_error("unexpected-end-tag", Some("p"));
        }
        self.pop_until_tag("p");
    }

    /// The `li` / `dd` / `dt` start tag steps of "in body": walk down the
    /// stack, closing the nearest open list item unless a special element
    /// other than `address`, `div` or `p` comes first.
    fn close_open_list_item(&mut self, tag_names: &[&str]) {
        for index in (1..self.stack_of_open_elements.len()).rev() {
            let Some(element) = self.tree.as_element(self.stack_of_open_elements[index]) else {
                continue;
            };
            // STEP: "If node is an li element, then run these substeps..."
            if element.namespace == Namespace::Html
                && tag_names.contains(&element.tag_name.as_str())
            {
                let tag_name = element.tag_name.clone();
                self.generate_implied_end_tags_excluding(Some(&tag_name));
                if !self.current_node_is(&tag_name) {
                    self.parse_error("unexpected-start-tag-implies-end-tag", Some(&tag_name));
                }
                self.pop_until_tag(&tag_name);
                return;
            }
            // STEP: "If node is in the special category, but is not an
            //        address, div, or p element, then jump to the step
            //        labeled done below."
            if Self::is_special(element)
                && !(element.namespace == Namespace::Html
                    && matches!(element.tag_name.as_str(), "address" | "div" | "p"))
            {
                return;
            }
        }
    }

    /// [§ 13.2.4.2 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
    fn is_special(element: &ElementData) -> bool {
        (element.namespace == Namespace::Html
            && SPECIAL_ELEMENTS.contains(&element.tag_name.as_str()))
            || is_foreign_scope_marker(element)
    }

    /// [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-stack-back-to-a-table-context)
    ///
    /// "while the current node is not a table, template, or html element, pop
    /// elements from the stack of open elements."
    fn clear_stack_back_to(&mut self, tag_names: &[&str]) {
        while self.stack_of_open_elements.len() > 1
            && let Some(element) = self.current_element()
            && !(element.namespace == Namespace::Html
                && (tag_names.contains(&element.tag_name.as_str())
                    || matches!(element.tag_name.as_str(), "template" | "html")))
        {
            let _ = self.stack_of_open_elements.pop();
        }
    }

    fn clear_stack_back_to_table_context(&mut self) {
        self.clear_stack_back_to(&["table"]);
    }

    fn clear_stack_back_to_table_body_context(&mut self) {
        self.clear_stack_back_to(TABLE_SECTION_ELEMENTS);
    }

    fn clear_stack_back_to_table_row_context(&mut self) {
        self.clear_stack_back_to(&["tr"]);
    }

    /// [§ 13.2.6.4.15 Close the cell](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    fn close_the_cell(&mut self) {
        // "Generate implied end tags."
        self.generate_implied_end_tags_excluding(None);
        // "If the current node is not now a td element or a th element, then
        //  this is a parse error."
        if !(self.current_node_is("td") || self.current_node_is("th")) {
            let name = self.current_element().map(|element| element.tag_name.clone());
            self.parse_error("unexpected-end-tag", name.as_deref());
        }
        // "Pop elements from the stack of open elements stack until a td
        //  element or a th element has been popped from the stack."
        self.pop_until_one_of(&["td", "th"]);
        // "Switch the insertion mode to "in row"."
        self.switch_to(InsertionMode::InRow);
    }

    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    fn reset_insertion_mode_appropriately(&mut self) {
        for index in (0..self.stack_of_open_elements.len()).rev() {
            // STEP 3: "If node is the first node in the stack of open elements,
            //          then set last to true, and, if the parser was created as
            //          part of the HTML fragment parsing algorithm (fragment
            //          case), set node to the context element passed to that
            //          algorithm."
            let last = index == 0;
            let tag_name = match (&self.opts.fragment_context, last) {
                (Some(context), true) => context.tag_name.clone(),
                _ => match self.tree.as_element(self.stack_of_open_elements[index]) {
                    Some(element) if element.namespace == Namespace::Html => {
                        element.tag_name.clone()
                    }
                    _ => String::new(),
                },
            };

            let mode = match tag_name.as_str() {
                "td" | "th" if !last => Some(InsertionMode::InCell),
                "tr" => Some(InsertionMode::InRow),
                "tbody" | "thead" | "tfoot" => Some(InsertionMode::InTableBody),
                "caption" | "colgroup" | "table" => Some(InsertionMode::InTable),
                "head" if !last => Some(InsertionMode::InHead),
                "frameset" => Some(InsertionMode::InFrameset),
                "html" => Some(if self.head_element_pointer.is_none() {
                    InsertionMode::BeforeHead
                } else {
                    InsertionMode::AfterHead
                }),
                _ if last => Some(InsertionMode::InBody),
                // template contents and body both use the "in body" rules
                "template" | "body" => Some(InsertionMode::InBody),
                _ => None,
            };
            if let Some(mode) = mode {
                self.switch_to(mode);
                return;
            }
        }
    }

    // ========== Creating and inserting nodes ==========

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// The current node, or its template contents when it is a `template`.
    /// Foster parenting is not performed.
    fn appropriate_insertion_place(&self) -> NodeId {
        let target = self.current_node().unwrap_or(NodeId::ROOT);
        self.tree.template_contents(target).unwrap_or(target)
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// Create the element and append it at the appropriate place, without
    /// pushing it.
    fn insert_element(&mut self, tag_name: &str, namespace: Namespace, attrs: AttributesMap) -> NodeId {
        let element = self.tree.create_element(tag_name, namespace, attrs);
        let parent = self.appropriate_insertion_place();
        self.tree.append_child(parent, element);
        element
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    fn insert_html_element(&mut self, tag_name: &str, attrs: &AttributesMap) -> NodeId {
        let element = self.insert_element(tag_name, Namespace::Html, attrs.clone());
        self.stack_of_open_elements.push(element);
        element
    }

    /// "Insert an HTML element for the token. Immediately pop the current node
    /// off the stack of open elements."
    fn insert_void_element(&mut self, tag_name: &str, attrs: &AttributesMap) {
        let _ = self.insert_element(tag_name, Namespace::Html, attrs.clone());
    }

    /// Insert a start tag from "in body". Void and self-closing elements never
    /// receive children, so they are not pushed.
    fn insert_element_for_start_tag(&mut self, tag_name: &str, attrs: &AttributesMap, self_closing: bool) {
        if self_closing || VOID_ELEMENTS.contains(&tag_name) {
            self.insert_void_element(tag_name, attrs);
        } else {
            let _ = self.insert_html_element(tag_name, attrs);
        }
    }

    /// Insert an SVG or MathML element with the namespace's name adjustments.
    fn insert_foreign_element(
        &mut self,
        tag_name: &str,
        attrs: &AttributesMap,
        namespace: Namespace,
        self_closing: bool,
    ) {
        let (tag_name, attrs) = adjust_for_namespace(tag_name, attrs.clone(), namespace);
        let element = self.insert_element(&tag_name, namespace, attrs);
        // "If the token has its self-closing flag set, pop the current node off
        //  the stack of open elements and acknowledge the token's self-closing
        //  flag."
        if !self_closing {
            self.stack_of_open_elements.push(element);
        }
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    ///
    /// STEP 1: "Insert an HTML element for the token."
    /// STEP 2: "If the algorithm that was invoked is the generic raw text
    ///          element parsing algorithm, switch the tokenizer to the RAWTEXT
    ///          state; otherwise ... switch the tokenizer to the RCDATA state."
    /// STEP 3: "Set the original insertion mode to the current insertion mode."
    /// STEP 4: "Then, switch the insertion mode to "text"."
    fn insert_raw_text_element(&mut self, tag_name: &str, attrs: &AttributesMap) {
        let _ = self.insert_html_element(tag_name, attrs);
        self.pending_switch = raw_kind_for(tag_name);
        self.original_insertion_mode = Some(self.insertion_mode);
        self.switch_to(InsertionMode::Text);
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// Adjacent character data is merged into one text node.
    fn insert_text(&mut self, text: &str) {
        let parent = self.appropriate_insertion_place();
        self.tree.append_text(parent, text);
    }

    /// Insert the whitespace of `text`; every other character is dropped with
    /// the error `code`.
    fn insert_whitespace_only(&mut self, text: &str, code: &str) {
        let whitespace: String = text.chars().filter(|&c| is_whitespace(c)).collect();
        for _ in text.chars().filter(|&c| !is_whitespace(c)) {
            self.parse_error(code, None);
        }
        self.insert_text(&whitespace);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    fn insert_comment(&mut self, text: &str) {
        let parent = self.appropriate_insertion_place();
        self.insert_comment_at(parent, text);
    }

    fn insert_comment_at(&mut self, parent: NodeId, text: &str) {
        let comment = self.tree.alloc(NodeType::Comment(text.to_string()));
        self.tree.append_child(parent, comment);
    }

    /// "add the attribute and its corresponding value to that element" for
    /// each attribute the element does not already have.
    fn merge_attributes(&mut self, target: NodeId, attrs: &AttributesMap) {
        if let Some(element) = self.tree.as_element_mut(target) {
            for (name, value) in attrs {
                let _ = element
                    .attrs
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }
    }

    // ========== Foreign content ==========

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// The adjusted current node is the current node: a fragment's context
    /// element is the synthetic root itself.
    fn should_use_foreign_content_rules(&self, token: &Token) -> bool {
        let Some(node) = self.current_element() else {
            return false;
        };
        // "If the adjusted current node is an element in the HTML namespace"
        if node.namespace == Namespace::Html {
            return false;
        }
        let html_rules = match token {
            Token::EndOfInput => true,
            Token::CharacterRun { .. } => {
                is_mathml_text_integration_point(node) || is_html_integration_point(node)
            }
            Token::StartTag { name, .. } => {
                (is_mathml_text_integration_point(node)
                    && !matches!(name.as_str(), "mglyph" | "malignmark"))
                    || (node.namespace == Namespace::MathMl
                        && node.tag_name == "annotation-xml"
                        && name == "svg")
                    || is_html_integration_point(node)
            }
            _ => false,
        };
        !html_rules
    }

    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    fn handle_in_foreign_content(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL: Parse error. Insert a
            //  U+FFFD REPLACEMENT CHARACTER character."
            Token::CharacterRun { text } => self.insert_text(&text.replace('\0', "\u{FFFD}")),
            Token::Comment { text } => self.insert_comment(text),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype", None),
            Token::StartTag { name, attrs, .. } if is_breakout_start_tag(name, attrs) => {
                self.parse_error("unexpected-start-tag", Some(name));
                // "While the current node is not a MathML text integration
                //  point, an HTML integration point, or an element in the HTML
                //  namespace, pop elements from the stack of open elements."
                while self.stack_of_open_elements.len() > 1
                    && let Some(element) = self.current_element()
                    && element.namespace != Namespace::Html
                    && !is_mathml_text_integration_point(element)
                    && !is_html_integration_point(element)
                {
                    let _ = self.stack_of_open_elements.pop();
                }
                // "Reprocess the token according to the rules given in the
                //  section corresponding to the current insertion mode in HTML
                //  content."
                self.process_using_insertion_mode(token);
            }
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                let namespace = self
                    .current_element()
                    .map_or(Namespace::Html, |element| element.namespace);
                self.insert_foreign_element(name, attrs, namespace, *self_closing);
            }
            Token::EndTag { name } => self.handle_foreign_end_tag(name, token),
            Token::EndOfInput => self.process_using_insertion_mode(token),
        }
    }

    /// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    /// "Any other end tag"
    fn handle_foreign_end_tag(&mut self, name: &str, token: &Token) {
        let matches_token = |tree: &DomTree, id: NodeId| {
            tree.as_element(id)
                .is_some_and(|element| element.tag_name.eq_ignore_ascii_case(name))
        };

        // STEP 1: "Initialize node to be the current node"
        let Some(mut index) = self.stack_of_open_elements.len().checked_sub(1) else {
            return;
        };
        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not the
        //          same as the tag name of the token, then this is a parse error."
        if !matches_token(&self.tree, self.stack_of_open_elements[index]) {
            self.parse_error("unexpected-end-tag", Some(name));
        }
        loop {
            // STEP 3: "Loop: If node is the topmost element in the stack of
            //          open elements, then return."
            if index == 0 {
                return;
            }
            // STEP 4: "If node's tag name, converted to ASCII lowercase, is the
            //          same as the tag name of the token, pop elements from the
            //          stack of open elements until node has been popped from
            //          the stack, and then return."
            if matches_token(&self.tree, self.stack_of_open_elements[index]) {
                self.stack_of_open_elements.truncate(index);
                return;
            }
            // STEP 5: "Set node to the previous entry in the stack of open
            //          elements."
            index -= 1;
            // STEP 6: "If node is not an element in the HTML namespace, return
            //          to the step labeled loop."
            // STEP 7: "Otherwise, process the token according to the rules given
            //          in the section corresponding to the current insertion
            //          mode in HTML content."
            let is_html = self
                .tree
                .as_element(self.stack_of_open_elements[index])
                .is_some_and(|element| element.namespace == Namespace::Html);
            if is_html {
                self.process_using_insertion_mode(token);
                return;
            }
        }
    }

    // ========== Insertion modes ==========

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            //  U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            //  RETURN (CR), or U+0020 SPACE: Ignore the token."
            Token::CharacterRun { text } => {
                let (_, rest) = split_leading_whitespace(text);
                if !rest.is_empty() {
                    let rest = Token::CharacterRun {
                        text: rest.to_string(),
                    };
                    self.handle_initial_anything_else("expected-doctype-but-got-chars", &rest);
                }
            }
            // "A comment token: Insert a comment as the last child of the
            //  Document object."
            Token::Comment { text } => self.insert_comment_at(NodeId::ROOT, text),
            // "A DOCTYPE token: ... Append a DocumentType node to the Document
            //  node ... Then, switch the insertion mode to "before html"."
            Token::Doctype {
                name,
                public_id,
                system_id,
                force_quirks,
            } => {
                let doctype = self.tree.alloc(NodeType::Doctype(DoctypeData {
                    name: name.clone(),
                    public_id: public_id.clone(),
                    system_id: system_id.clone(),
                }));
                self.tree.append_child(NodeId::ROOT, doctype);

                let (error, quirks_mode) = doctype_error_and_quirks(
                    name.as_deref(),
                    public_id.as_deref(),
                    system_id.as_deref(),
                    *force_quirks,
                    self.opts.iframe_srcdoc,
                );
                if error {
                    self.parse_error("unknown-doctype", None);
                }
                self.quirks_mode = quirks_mode;
                self.switch_to(InsertionMode::BeforeHtml);
            }
            Token::StartTag { .. } | Token::EndTag { .. } => {
                self.handle_initial_anything_else("expected-doctype-but-got-start-tag", token);
            }
            Token::EndOfInput => {
                self.handle_initial_anything_else("expected-doctype-but-got-eof", token);
            }
        }
    }

    /// "Anything else: If the document is not an iframe srcdoc document, then
    /// this is a parse error; if the parser cannot change the mode flag is
    /// false, set the Document to quirks mode. In any case, switch the
    /// insertion mode to "before html", then reprocess the token."
    fn handle_initial_anything_else(&mut self, code: &str, token: &Token) {
        if !self.opts.iframe_srcdoc {
            self.parse_error(code, None);
            self.quirks_mode = QuirksMode::Quirks;
        }
        self.switch_to(InsertionMode::BeforeHtml);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            Token::Doctype { .. } => self.parse_error("unexpected-doctype", None),
            Token::Comment { text } => self.insert_comment_at(NodeId::ROOT, text),
            Token::CharacterRun { text } => {
                let (_, rest) = split_leading_whitespace(text);
                if !rest.is_empty() {
                    self.handle_before_html_anything_else(&Token::CharacterRun {
                        text: rest.to_string(),
                    });
                }
            }
            // "A start tag whose tag name is "html": Create an element for the
            //  token in the HTML namespace, with the Document as the intended
            //  parent. Append it to the Document object. Put this element in
            //  the stack of open elements."
            Token::StartTag { name, attrs, .. } if name == "html" => {
                let _ = self.insert_html_element(name, attrs);
                self.switch_to(InsertionMode::BeforeHead);
            }
            // "Any other end tag: Parse error. Ignore the token."
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error("unexpected-end-tag", Some(name));
            }
            _ => self.handle_before_html_anything_else(token),
        }
    }

    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object. Put this element in the stack of open
    /// elements. Switch the insertion mode to "before head", then reprocess
    /// the token."
    fn handle_before_html_anything_else(&mut self, token: &Token) {
        let _ = self.insert_html_element("html", &AttributesMap::new());
        self.switch_to(InsertionMode::BeforeHead);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            Token::CharacterRun { text } => {
                let (_, rest) = split_leading_whitespace(text);
                if !rest.is_empty() {
                    self.handle_before_head_anything_else(&Token::CharacterRun {
                        text: rest.to_string(),
                    });
                }
            }
            Token::Comment { text } => self.insert_comment(text),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype", None),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            // "A start tag whose tag name is "head": Insert an HTML element for
            //  the token. Set the head element pointer to the newly created
            //  head element. Switch the insertion mode to "in head"."
            Token::StartTag { name, attrs, .. } if name == "head" => {
                let head = self.insert_html_element(name, attrs);
                self.head_element_pointer = Some(head);
                self.switch_to(InsertionMode::InHead);
            }
            Token::EndTag { name } if !matches!(name.as_str(), "head" | "body" | "html" | "br") => {
                self.parse_error("unexpected-end-tag", Some(name));
            }
            _ => self.handle_before_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "head" start tag token with no
    /// attributes. Set the head element pointer to the newly created head
    /// element. Switch the insertion mode to "in head". Reprocess the current
    /// token."
    fn handle_before_head_anything_else(&mut self, token: &Token) {
        let head = self.insert_html_element("head", &AttributesMap::new());
        self.head_element_pointer = Some(head);
        self.switch_to(InsertionMode::InHead);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            // Whitespace: "Insert the character."
            Token::CharacterRun { text } => {
                let (whitespace, rest) = split_leading_whitespace(text);
                self.insert_text(whitespace);
                if !rest.is_empty() {
                    self.handle_in_head_anything_else(&Token::CharacterRun {
                        text: rest.to_string(),
                    });
                }
            }
            Token::Comment { text } => self.insert_comment(text),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype", None),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link": Insert an HTML element for the token.
            //  Immediately pop the current node off the stack of open elements."
            Token::StartTag { name, attrs, .. }
                if matches!(name.as_str(), "base" | "basefont" | "bgsound" | "link" | "meta") =>
            {
                self.insert_void_element(name, attrs);
            }
            // "A start tag whose tag name is "title": Follow the generic RCDATA
            //  element parsing algorithm."
            // "A start tag whose tag name is one of: "noframes", "style":
            //  Follow the generic raw text element parsing algorithm."
            Token::StartTag { name, attrs, .. }
                if matches!(name.as_str(), "title" | "noframes" | "style" | "script") =>
            {
                if name == "script" {
                    warn_once(
                        "Tree Builder",
                        "script content is tokenized as RAWTEXT; script data escapes are not recognized",
                    );
                }
                self.insert_raw_text_element(name, attrs);
            }
            // "A start tag whose tag name is "template": Insert an HTML element
            //  for the token." Its contents use the "in body" rules.
            Token::StartTag { name, attrs, .. } if name == "template" => {
                let _ = self.insert_html_element(name, attrs);
                self.switch_to(InsertionMode::InBody);
            }
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected-start-tag", Some(name));
            }
            // "An end tag whose tag name is "head": Pop the current node (which
            //  will be the head element) off the stack of open elements. Switch
            //  the insertion mode to "after head"."
            Token::EndTag { name } if name == "head" => {
                self.pop_current_node();
                self.switch_to(InsertionMode::AfterHead);
            }
            Token::EndTag { name } if name == "template" => self.close_template(),
            Token::EndTag { name } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.parse_error("unexpected-end-tag", Some(name));
            }
            _ => self.handle_in_head_anything_else(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack of
    /// open elements. Switch the insertion mode to "after head". Reprocess the
    /// token."
    fn handle_in_head_anything_else(&mut self, token: &Token) {
        self.pop_current_node();
        self.switch_to(InsertionMode::AfterHead);
        self.reprocess_token(token);
    }

    /// "An end tag whose tag name is "template""
    fn close_template(&mut self) {
        // "If there is no template element on the stack of open elements, then
        //  this is a parse error; ignore the token."
        if self.position_of_open_element("template").is_none() {
            self.parse_error("unexpected-end-tag", Some("template"));
            return;
        }
        // STEP 1: "Generate all implied end tags thoroughly."
        self.generate_implied_end_tags_excluding(None);
        // STEP 2: "If the current node is not a template element, then this is
        //          a parse error."
        if !self.current_node_is("template") {
            self.parse_error("unexpected-end-tag", Some("template"));
        }
        // STEP 3: "Pop elements from the stack of open elements until a
        //          template element has been popped from the stack."
        self.pop_until_tag("template");
        // STEP 6: "Reset the insertion mode appropriately."
        self.reset_insertion_mode_appropriately();
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            Token::CharacterRun { text } => {
                let (whitespace, rest) = split_leading_whitespace(text);
                self.insert_text(whitespace);
                if !rest.is_empty() {
                    self.handle_after_head_anything_else(&Token::CharacterRun {
                        text: rest.to_string(),
                    });
                }
            }
            Token::Comment { text } => self.insert_comment(text),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype", None),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            // "A start tag whose tag name is "body": Insert an HTML element for
            //  the token. Set the frameset-ok flag to "not ok". Switch the
            //  insertion mode to "in body"."
            Token::StartTag { name, attrs, .. } if name == "body" => {
                let _ = self.insert_html_element(name, attrs);
                self.switch_to(InsertionMode::InBody);
            }
            Token::StartTag { name, attrs, .. } if name == "frameset" => {
                let _ = self.insert_html_element(name, attrs);
                self.switch_to(InsertionMode::InFrameset);
            }
            // "A start tag whose tag name is one of: "base", "basefont",
            //  "bgsound", "link", "meta", "noframes", "script", "style",
            //  "template", "title": Parse error. Push the node pointed to by
            //  the head element pointer onto the stack of open elements.
            //  Process the token using the rules for the "in head" insertion
            //  mode. Remove the node pointed to by the head element pointer
            //  from the stack of open elements."
            Token::StartTag { name, .. } if HEAD_ELEMENTS.contains(&name.as_str()) => {
                self.parse_error("unexpected-start-tag", Some(name));
                if let Some(head) = self.head_element_pointer {
                    self.stack_of_open_elements.push(head);
                    self.handle_in_head_mode(token);
                    if let Some(position) = self
                        .stack_of_open_elements
                        .iter()
                        .rposition(|&id| id == head)
                    {
                        let _ = self.stack_of_open_elements.remove(position);
                    }
                }
            }
            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected-start-tag", Some(name));
            }
            Token::EndTag { name } if name == "template" => self.handle_in_head_mode(token),
            Token::EndTag { name } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.parse_error("unexpected-end-tag", Some(name));
            }
            _ => self.handle_after_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "body" start tag token with no
    /// attributes. Switch the insertion mode to "in body". Reprocess the
    /// current token."
    fn handle_after_head_anything_else(&mut self, token: &Token) {
        let _ = self.insert_html_element("body", &AttributesMap::new());
        self.switch_to(InsertionMode::InBody);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL: Parse error. Ignore the
            //  token." The tokenizer already reported it.
            Token::CharacterRun { text } if text.contains('\0') => {
                self.insert_text(&text.replace('\0', ""));
            }
            Token::CharacterRun { text } => self.insert_text(text),
            Token::Comment { text } => self.insert_comment(text),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype", None),
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => self.handle_in_body_start_tag(token, name, attrs, *self_closing),
            Token::EndTag { name } => self.handle_in_body_end_tag(token, name),
            // "An end-of-file token: ... Stop parsing."
            Token::EndOfInput => {}
        }
    }

    fn handle_in_body_start_tag(
        &mut self,
        token: &Token,
        name: &str,
        attrs: &AttributesMap,
        self_closing: bool,
    ) {
        match name {
            // "A start tag whose tag name is "html": Parse error. ... for each
            //  attribute on the token, check to see if the attribute is already
            //  present on the top element of the stack of open elements. If it
            //  is not, add the attribute and its corresponding value to that
            //  element."
            "html" => {
                self.parse_error("unexpected-start-tag", Some(name));
                if let Some(&html) = self.stack_of_open_elements.first() {
                    self.merge_attributes(html, attrs);
                }
            }
            _ if HEAD_ELEMENTS.contains(&name) => self.handle_in_head_mode(token),
            // "A start tag whose tag name is "body": Parse error. If the second
            //  element on the stack of open elements is not a body element ...
            //  ignore the token. Otherwise, ... add the attribute and its
            //  corresponding value to the body element."
            "body" => {
                self.parse_error("unexpected-start-tag", Some(name));
                if let Some(&body) = self.stack_of_open_elements.get(1)
                    && self
                        .tree
                        .as_element(body)
                        .is_some_and(|element| element.is_html("body"))
                {
                    self.merge_attributes(body, attrs);
                }
            }
            "frameset" | "frame" => self.parse_error("unexpected-start-tag-ignored", Some(name)),
            "head" => self.parse_error("unexpected-start-tag", Some(name)),
            // "A start tag whose tag name is one of: "address", "article",
            //  "aside", ... "ul": If the stack of open elements has a p element
            //  in button scope, then close a p element. Insert an HTML element
            //  for the token."
            _ if CLOSES_P_ELEMENTS.contains(&name) => {
                self.close_p_element_in_button_scope();
                self.insert_element_for_start_tag(name, attrs, self_closing);
            }
            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4",
            //  "h5", "h6""
            _ if HEADING_ELEMENTS.contains(&name) => {
                self.close_p_element_in_button_scope();
                // "If the current node is an HTML element whose tag name is one
                //  of "h1", "h2", "h3", "h4", "h5", or "h6", then this is a
                //  parse error; pop the current node off the stack of open
                //  elements."
                if HEADING_ELEMENTS.iter().any(|h| self.current_node_is(h)) {
                    self.parse_error("unexpected-start-tag", Some(name));
                    self.pop_current_node();
                }
                self.insert_element_for_start_tag(name, attrs, self_closing);
            }
            // "If the next token is a U+000A LINE FEED (LF) character token,
            //  then ignore that token and move on to the next one."
            "pre" | "listing" => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(name, attrs);
                self.skip_leading_newline = true;
            }
            "form" => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(name, attrs);
            }
            "li" => {
                self.close_open_list_item(&["li"]);
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(name, attrs);
            }
            "dd" | "dt" => {
                self.close_open_list_item(&["dd", "dt"]);
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(name, attrs);
            }
            // "A start tag whose tag name is "plaintext": ... Switch the
            //  tokenizer to the PLAINTEXT state."
            "plaintext" => {
                self.close_p_element_in_button_scope();
                let _ = self.insert_html_element(name, attrs);
                self.pending_switch = Some(RawKind::Plaintext);
            }
            // "A start tag whose tag name is "button": If the stack of open
            //  elements has a button element in scope, then ... Parse error.
            //  Generate implied end tags. Pop elements from the stack of open
            //  elements until a button element has been popped from the stack."
            "button" => {
                if self.has_element_in_scope("button") {
                    self.parse_error("unexpected-start-tag-implies-end-tag", Some(name));
                    self.generate_implied_end_tags_excluding(None);
                    self.pop_until_tag("button");
                }
                let _ = self.insert_html_element(name, attrs);
            }
            // "A start tag whose tag name is "table": If the Document is not set
            //  to quirks mode, and the stack of open elements has a p element in
            //  button scope, then close a p element. Insert an HTML element for
            //  the token. ... Switch the insertion mode to "in table"."
            "table" => {
                if self.quirks_mode != QuirksMode::Quirks {
                    self.close_p_element_in_button_scope();
                }
                let _ = self.insert_html_element(name, attrs);
                self.switch_to(InsertionMode::InTable);
            }
            "hr" => {
                self.close_p_element_in_button_scope();
                self.insert_void_element(name, attrs);
            }
            // "A start tag whose tag name is "image": Parse error. Change the
            //  token's tag name to "img" and reprocess it. (Don't ask.)"
            "image" => {
                self.parse_error("unexpected-start-tag", Some(name));
                self.insert_void_element("img", attrs);
            }
            "textarea" => {
                self.insert_raw_text_element(name, attrs);
                self.skip_leading_newline = true;
            }
            "xmp" => {
                self.close_p_element_in_button_scope();
                self.insert_raw_text_element(name, attrs);
            }
            "iframe" | "noembed" => self.insert_raw_text_element(name, attrs),
            // "If the current node is an option element, then pop the current
            //  node off the stack of open elements."
            "optgroup" | "option" => {
                if self.current_node_is("option") {
                    self.pop_current_node();
                }
                let _ = self.insert_html_element(name, attrs);
            }
            // "A start tag whose tag name is "math": ... Adjust MathML
            //  attributes for the token. ... Insert a foreign element for the
            //  token, with MathML namespace and false."
            "math" => self.insert_foreign_element(name, attrs, Namespace::MathMl, self_closing),
            "svg" => self.insert_foreign_element(name, attrs, Namespace::Svg, self_closing),
            _ => self.insert_element_for_start_tag(name, attrs, self_closing),
        }
    }

    fn handle_in_body_end_tag(&mut self, token: &Token, name: &str) {
        match name {
            "template" => self.handle_in_head_mode(token),
            // "An end tag whose tag name is "body" ... Switch the insertion mode
            //  to "after body"." Nothing is popped.
            "body" | "html" => self.switch_to(InsertionMode::AfterBody),
            // "An end tag whose tag name is "p": If the stack of open elements
            //  does not have a p element in button scope, then this is a parse
            //  error; insert an HTML element for a "p" start tag token with no
            //  attributes. Close a p element."
            "p" => {
                if !self.has_element_in_button_scope("p") {
                    self.parse_error("unexpected-end-tag", Some(name));
                    let _ = self.insert_html_element("p", &AttributesMap::new());
                }
                self.close_p_element();
            }
            // "An end tag whose tag name is "br": Parse error. Drop the
            //  attributes from the token, and act as described in the next
            //  entry; i.e. act as if this was a "br" start tag token with no
            //  attributes, rather than the end tag token that it actually is."
            "br" => {
                self.parse_error("unexpected-end-tag", Some(name));
                self.insert_void_element("br", &AttributesMap::new());
            }
            "table" => {
                if self.position_of_open_element("table").is_some() {
                    self.pop_until_tag("table");
                    self.reset_insertion_mode_appropriately();
                } else {
                    self.parse_error("unexpected-end-tag", Some(name));
                }
            }
            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4", "h5",
            //  "h6""
            _ if HEADING_ELEMENTS.contains(&name) => {
                if !HEADING_ELEMENTS.iter().any(|h| self.has_element_in_scope(h)) {
                    self.parse_error("unexpected-end-tag", Some(name));
                    return;
                }
                self.generate_implied_end_tags_excluding(None);
                if !self.current_node_is(name) {
                    self.parse_error("unexpected-end-tag", Some(name));
                }
                self.pop_until_one_of(HEADING_ELEMENTS);
            }
            // "An end tag whose tag name is "li": If the stack of open elements
            //  does not have an li element in list item scope, then this is a
            //  parse error; ignore the token."
            "li" if !self.has_element_in_list_item_scope(name) => {
                self.parse_error("unexpected-end-tag", Some(name));
            }
            "li" => self.close_element_generating_implied_end_tags(name),
            // "An end tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" if !self.has_element_in_scope(name) => {
                self.parse_error("unexpected-end-tag", Some(name));
            }
            "dd" | "dt" => self.close_element_generating_implied_end_tags(name),
            _ if FORMATTING_ELEMENTS.contains(&name) => self.run_simplified_adoption(name),
            // "An end tag whose tag name is one of: "address", "article", ...:
            //  If the stack of open elements does not have an element in scope
            //  that is an HTML element with the same tag name as that of the
            //  token, then this is a parse error; ignore the token."
            _ if SPECIAL_ELEMENTS.contains(&name) => {
                if self.has_element_in_scope(name) {
                    self.close_element_generating_implied_end_tags(name);
                    // Closing a cell or section from "in body" leaves the
                    // table modes behind.
                    if matches!(
                        name,
                        "caption" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                    ) {
                        self.reset_insertion_mode_appropriately();
                    }
                } else {
                    self.parse_error("unexpected-end-tag", Some(name));
                }
            }
            _ => self.any_other_end_tag(name),
        }
    }

    /// "Generate implied end tags, except for HTML elements with the same tag
    /// name as the token. If the current node is not an HTML element with the
    /// same tag name as that of the token, then this is a parse error. Pop
    /// elements from the stack of open elements until an HTML element with the
    /// same tag name as the token has been popped from the stack."
    fn close_element_generating_implied_end_tags(&mut self, name: &str) {
        self.generate_implied_end_tags_excluding(Some(name));
        if !self.current_node_is(name) {
            self.parse_error("unexpected-end-tag", Some(name));
        }
        self.pop_until_tag(name);
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// "Any other end tag": walk down the stack from the current node. A
    /// matching HTML element is closed along with everything opened after
    /// it; a special element met first means the token is ignored, so the
    /// walk never leaves the current table, cell or template.
    fn any_other_end_tag(&mut self, name: &str) {
        for index in (1..self.stack_of_open_elements.len()).rev() {
            let Some(element) = self.tree.as_element(self.stack_of_open_elements[index]) else {
                continue;
            };
            if element.is_html(name) {
                self.generate_implied_end_tags_excluding(Some(name));
                if !self.current_node_is(name) {
                    self.parse_error("unexpected-end-tag", Some(name));
                }
                self.stack_of_open_elements.truncate(index);
                return;
            }
            if Self::is_special(element) {
                break;
            }
        }
        self.parse_error("unexpected-end-tag", Some(name));
    }

    /// [§ 13.2.6.4.7 Adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// One-level approximation: when the formatting element is open but is
    /// not the current node, a `p` that is its direct child moves out to
    /// follow it, and a current node inside that `p` is rewrapped in a clone
    /// of the formatting element. There is no list of active formatting
    /// elements and no bookmark.
    fn run_simplified_adoption(&mut self, name: &str) {
        let Some(index) = self.position_of_open_element(name) else {
            self.parse_error("unexpected-end-tag", Some(name));
            return;
        };
        if index + 1 == self.stack_of_open_elements.len() {
            self.stack_of_open_elements.truncate(index);
            return;
        }

        self.parse_error("adoption-agency-1.3", Some(name));
        let formatting = self.stack_of_open_elements[index];
        let paragraph = self
            .position_of_open_element("p")
            .map(|p_index| self.stack_of_open_elements[p_index]);

        if let Some(paragraph) = paragraph {
            if self.tree.parent(paragraph) == Some(formatting)
                && let Some(grandparent) = self.tree.parent(formatting)
            {
                let after = self.tree.next_sibling(formatting);
                self.tree.insert_before(grandparent, paragraph, after);
            }
            if let Some(current) = self.current_node()
                && self.tree.parent(current) == Some(paragraph)
            {
                let clone = self.tree.clone_node(formatting, false);
                self.tree.append_child(paragraph, clone);
                self.tree.append_child(clone, current);
            }
        }

        self.stack_of_open_elements.truncate(index);
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    fn handle_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token: Insert the token's character."
            Token::CharacterRun { text } => self.insert_text(text),
            // "An end-of-file token: Parse error. ... Pop the current node off
            //  the stack of open elements. Switch the insertion mode to the
            //  original insertion mode and reprocess the token."
            Token::EndOfInput => {
                let name = self.current_element().map(|element| element.tag_name.clone());
                self.parse_error("expected-named-closing-tag-but-got-eof", name.as_deref());
                self.pop_current_node();
                self.restore_original_insertion_mode();
                self.reprocess_token(token);
            }
            // "Any other end tag: Pop the current node off the stack of open
            //  elements. Switch the insertion mode to the original insertion
            //  mode."
            Token::EndTag { .. } => {
                self.pop_current_node();
                self.restore_original_insertion_mode();
            }
            // The tokenizer is in a text state; nothing else arrives here.
            _ => {}
        }
    }

    fn restore_original_insertion_mode(&mut self) {
        let mode = self
            .original_insertion_mode
            .take()
            .unwrap_or(InsertionMode::InBody);
        self.switch_to(mode);
    }

    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    fn handle_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: "tbody", "tfoot", "thead":
            //  Clear the stack back to a table context. Insert an HTML element
            //  for the token, then switch the insertion mode to "in table body"."
            Token::StartTag { name, attrs, .. }
                if TABLE_SECTION_ELEMENTS.contains(&name.as_str()) =>
            {
                self.clear_stack_back_to_table_context();
                let _ = self.insert_html_element(name, attrs);
                self.switch_to(InsertionMode::InTableBody);
            }
            // "A start tag whose tag name is one of: "td", "th", "tr": Clear the
            //  stack back to a table context. Insert an HTML element for a
            //  "tbody" start tag token with no attributes, then switch the
            //  insertion mode to "in table body". Reprocess the current token."
            Token::StartTag { name, .. } if matches!(name.as_str(), "td" | "th" | "tr") => {
                self.clear_stack_back_to_table_context();
                let _ = self.insert_html_element("tbody", &AttributesMap::new());
                self.switch_to(InsertionMode::InTableBody);
                self.reprocess_token(token);
            }
            // "A start tag whose tag name is "table": Parse error. If the stack
            //  of open elements does not have a table element in table scope,
            //  ignore the token. Otherwise: Pop elements from this stack until a
            //  table element has been popped from the stack. Reset the insertion
            //  mode appropriately. Reprocess the token."
            Token::StartTag { name, .. } if name == "table" => {
                self.parse_error("unexpected-start-tag-implies-end-tag", Some(name));
                if self.has_element_in_table_scope("table") {
                    self.pop_until_tag("table");
                    self.reset_insertion_mode_appropriately();
                    self.reprocess_token(token);
                }
            }
            // "An end tag whose tag name is "table": If the stack of open
            //  elements does not have a table element in table scope, this is a
            //  parse error; ignore the token. Otherwise: Pop elements from this
            //  stack until a table element has been popped from the stack.
            //  Reset the insertion mode appropriately."
            Token::EndTag { name } if name == "table" => {
                if self.has_element_in_table_scope("table") {
                    self.pop_until_tag("table");
                    self.reset_insertion_mode_appropriately();
                } else {
                    self.parse_error("unexpected-end-tag", Some(name));
                }
            }
            Token::EndTag { name } if IGNORED_TABLE_END_TAGS.contains(&name.as_str()) => {
                self.parse_error("unexpected-end-tag", Some(name));
            }
            _ => self.handle_in_table_anything_else(token),
        }
    }

    /// "Anything else: Parse error. Enable foster parenting, process the token
    /// using the rules for the "in body" insertion mode, and then disable
    /// foster parenting."
    ///
    /// Content is inserted where it is, inside the table structure.
    fn handle_in_table_anything_else(&mut self, token: &Token) {
        let misplaced = match token {
            Token::CharacterRun { text } => text.chars().any(|c| !is_whitespace(c)),
            Token::StartTag { .. } => true,
            _ => false,
        };
        if misplaced && self.current_node_is_table_structure() {
            warn_once(
                "Tree Builder",
                "foster parenting is not implemented; misplaced table content is inserted in place",
            );
        }
        self.handle_in_body_mode(token);
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    fn handle_in_table_body_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is "tr": Clear the stack back to a
            //  table body context. Insert an HTML element for the token, then
            //  switch the insertion mode to "in row"."
            Token::StartTag { name, attrs, .. } if name == "tr" => {
                self.clear_stack_back_to_table_body_context();
                let _ = self.insert_html_element(name, attrs);
                self.switch_to(InsertionMode::InRow);
            }
            // "A start tag whose tag name is one of: "th", "td": Parse error.
            //  Clear the stack back to a table body context. Insert an HTML
            //  element for a "tr" start tag token with no attributes, then
            //  switch the insertion mode to "in row". Reprocess the current
            //  token."
            Token::StartTag { name, .. } if matches!(name.as_str(), "td" | "th") => {
                self.parse_error("unexpected-cell-in-table-body", Some(name));
                self.clear_stack_back_to_table_body_context();
                let _ = self.insert_html_element("tr", &AttributesMap::new());
                self.switch_to(InsertionMode::InRow);
                self.reprocess_token(token);
            }
            Token::EndTag { name } if TABLE_SECTION_ELEMENTS.contains(&name.as_str()) => {
                if self.has_element_in_table_scope(name) {
                    self.clear_stack_back_to_table_body_context();
                    self.pop_current_node();
                    self.switch_to(InsertionMode::InTable);
                } else {
                    self.parse_error("unexpected-end-tag", Some(name));
                }
            }
            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "tbody", "tfoot", "thead"; An end tag whose tag name
            //  is "table""
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                self.close_table_body_and_reprocess(token);
            }
            Token::EndTag { name } if name == "table" => self.close_table_body_and_reprocess(token),
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.parse_error("unexpected-end-tag", Some(name));
            }
            _ => self.handle_in_table_mode(token),
        }
    }

    /// "If the stack of open elements does not have a tbody, thead, or tfoot
    /// element in table scope, this is a parse error; ignore the token.
    /// Otherwise: Clear the stack back to a table body context. Pop the current
    /// node from the stack of open elements. Switch the insertion mode to "in
    /// table". Reprocess the token."
    fn close_table_body_and_reprocess(&mut self, token: &Token) {
        if !TABLE_SECTION_ELEMENTS
            .iter()
            .any(|section| self.has_element_in_table_scope(section))
        {
            self.unexpected_tag(token);
            return;
        }
        self.clear_stack_back_to_table_body_context();
        self.pop_current_node();
        self.switch_to(InsertionMode::InTable);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    fn handle_in_row_mode(&mut self, token: &Token) {
        match token {
            // "A start tag whose tag name is one of: "th", "td": Clear the stack
            //  back to a table row context. Insert an HTML element for the
            //  token, then switch the insertion mode to "in cell"."
            Token::StartTag { name, attrs, .. } if matches!(name.as_str(), "td" | "th") => {
                self.clear_stack_back_to_table_row_context();
                let _ = self.insert_html_element(name, attrs);
                self.switch_to(InsertionMode::InCell);
            }
            // "An end tag whose tag name is "tr""
            Token::EndTag { name } if name == "tr" => {
                if self.has_element_in_table_scope("tr") {
                    self.clear_stack_back_to_table_row_context();
                    self.pop_current_node();
                    self.switch_to(InsertionMode::InTableBody);
                } else {
                    self.parse_error("unexpected-end-tag", Some(name));
                }
            }
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                self.close_row_and_reprocess(token);
            }
            Token::EndTag { name } if name == "table" => self.close_row_and_reprocess(token),
            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead": If
            //  the stack of open elements does not have an element in table
            //  scope that is an HTML element with the same tag name as the
            //  token, this is a parse error; ignore the token."
            Token::EndTag { name } if TABLE_SECTION_ELEMENTS.contains(&name.as_str()) => {
                if self.has_element_in_table_scope(name) {
                    self.close_row_and_reprocess(token);
                } else {
                    self.parse_error("unexpected-end-tag", Some(name));
                }
            }
            Token::EndTag { name }
                if matches!(
                    name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.parse_error("unexpected-end-tag", Some(name));
            }
            _ => self.handle_in_table_mode(token),
        }
    }

    /// "If the stack of open elements does not have a tr element in table
    /// scope, this is a parse error; ignore the token. Otherwise: Clear the
    /// stack back to a table row context. Pop the current node (which will be a
    /// tr element) from the stack of open elements. Switch the insertion mode to
    /// "in table body". Reprocess the token."
    fn close_row_and_reprocess(&mut self, token: &Token) {
        if !self.has_element_in_table_scope("tr") {
            self.unexpected_tag(token);
            return;
        }
        self.clear_stack_back_to_table_row_context();
        self.pop_current_node();
        self.switch_to(InsertionMode::InTableBody);
        self.reprocess_token(token);
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    fn handle_in_cell_mode(&mut self, token: &Token) {
        match token {
            // "An end tag whose tag name is one of: "td", "th""
            Token::EndTag { name } if matches!(name.as_str(), "td" | "th") => {
                if !self.has_element_in_table_scope(name) {
                    self.parse_error("unexpected-end-tag", Some(name));
                    return;
                }
                self.generate_implied_end_tags_excluding(None);
                if !self.current_node_is(name) {
                    self.parse_error("unexpected-end-tag", Some(name));
                }
                self.pop_until_tag(name);
                self.switch_to(InsertionMode::InRow);
            }
            // "A start tag whose tag name is one of: "caption", "col",
            //  "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr": Assert:
            //  The stack of open elements has a td or th element in table scope.
            //  Close the cell and reprocess the token."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
                ) =>
            {
                if self.has_element_in_table_scope("td") || self.has_element_in_table_scope("th") {
                    self.close_the_cell();
                    self.reprocess_token(token);
                } else {
                    self.parse_error("unexpected-start-tag", Some(name));
                }
            }
            Token::EndTag { name }
                if matches!(name.as_str(), "body" | "caption" | "col" | "colgroup" | "html") =>
            {
                self.parse_error("unexpected-end-tag", Some(name));
            }
            // "An end tag whose tag name is one of: "table", "tbody", "tfoot",
            //  "thead", "tr": If the stack of open elements does not have an
            //  element in table scope that is an HTML element with the same tag
            //  name as that of the token, then this is a parse error; ignore the
            //  token. Otherwise, close the cell and reprocess the token."
            Token::EndTag { name }
                if matches!(name.as_str(), "table" | "tbody" | "tfoot" | "thead" | "tr") =>
            {
                if self.has_element_in_table_scope(name) {
                    self.close_the_cell();
                    self.reprocess_token(token);
                } else {
                    self.parse_error("unexpected-end-tag", Some(name));
                }
            }
            _ => self.handle_in_body_mode(token),
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            Token::CharacterRun { text } => {
                let (whitespace, rest) = split_leading_whitespace(text);
                self.insert_text(whitespace);
                if !rest.is_empty() {
                    self.parse_error("unexpected-char-after-body", None);
                    self.switch_to(InsertionMode::InBody);
                    self.reprocess_token(&Token::CharacterRun {
                        text: rest.to_string(),
                    });
                }
            }
            // "A comment token: Insert a comment as the last child of the first
            //  element in the stack of open elements (the html element)."
            Token::Comment { text } => {
                let html = self
                    .stack_of_open_elements
                    .first()
                    .copied()
                    .unwrap_or(NodeId::ROOT);
                self.insert_comment_at(html, text);
            }
            Token::Doctype { .. } => self.parse_error("unexpected-doctype", None),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            // "An end tag whose tag name is "html": ... Otherwise, switch the
            //  insertion mode to "after after body"."
            Token::EndTag { name } if name == "html" => {
                if self.opts.fragment_context.is_some() {
                    self.parse_error("unexpected-end-tag", Some(name));
                } else {
                    self.switch_to(InsertionMode::AfterAfterBody);
                }
            }
            Token::EndOfInput => {}
            // "Anything else: Parse error. Switch the insertion mode to "in
            //  body" and reprocess the token."
            _ => {
                self.parse_error("unexpected-token-after-body", token.tag_name());
                self.switch_to(InsertionMode::InBody);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    fn handle_in_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::CharacterRun { text } => {
                self.insert_whitespace_only(text, "unexpected-char-in-frameset");
            }
            Token::Comment { text } => self.insert_comment(text),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype", None),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::StartTag { name, attrs, .. } if name == "frameset" => {
                let _ = self.insert_html_element(name, attrs);
            }
            // "An end tag whose tag name is "frameset": If the current node is
            //  the root html element, then this is a parse error; ignore the
            //  token. Otherwise, pop the current node from the stack of open
            //  elements. If the parser was not created as part of the HTML
            //  fragment parsing algorithm (fragment case), and the current node
            //  is no longer a frameset element, then switch the insertion mode
            //  to "after frameset"."
            Token::EndTag { name } if name == "frameset" => {
                if self.stack_of_open_elements.len() <= 1 {
                    self.parse_error("unexpected-end-tag", Some(name));
                    return;
                }
                self.pop_current_node();
                if self.opts.fragment_context.is_none() && !self.current_node_is("frameset") {
                    self.switch_to(InsertionMode::AfterFrameset);
                }
            }
            Token::StartTag { name, attrs, .. } if name == "frame" => {
                self.insert_void_element(name, attrs);
            }
            Token::StartTag { name, .. } if name == "noframes" => self.handle_in_head_mode(token),
            // "An end-of-file token: If the current node is not the root html
            //  element, then this is a parse error."
            Token::EndOfInput => {
                if self.stack_of_open_elements.len() > 1 {
                    self.parse_error("eof-in-frameset", None);
                }
            }
            Token::StartTag { name, .. } => {
                self.parse_error("unexpected-start-tag-ignored", Some(name));
            }
            Token::EndTag { name } => self.parse_error("unexpected-end-tag", Some(name)),
        }
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    fn handle_after_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::CharacterRun { text } => {
                self.insert_whitespace_only(text, "unexpected-char-after-frameset");
            }
            Token::Comment { text } => self.insert_comment(text),
            Token::Doctype { .. } => self.parse_error("unexpected-doctype", None),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::EndTag { name } if name == "html" => {
                self.switch_to(InsertionMode::AfterAfterFrameset);
            }
            Token::StartTag { name, .. } if name == "noframes" => self.handle_in_head_mode(token),
            Token::EndOfInput => {}
            _ => self.parse_error("unexpected-token-after-frameset", token.tag_name()),
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            Token::Comment { text } => self.insert_comment_at(NodeId::ROOT, text),
            Token::CharacterRun { text } if text.chars().all(is_whitespace) => {
                self.handle_in_body_mode(token);
            }
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::EndOfInput => {}
            // "Anything else: Parse error. Switch the insertion mode to "in
            //  body" and reprocess the token."
            Token::CharacterRun { .. } => {
                self.parse_error("unexpected-char-after-body", None);
                self.switch_to(InsertionMode::InBody);
                self.reprocess_token(token);
            }
            _ => {
                self.parse_error("unexpected-token-after-body", token.tag_name());
                self.switch_to(InsertionMode::InBody);
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    fn handle_after_after_frameset_mode(&mut self, token: &Token) {
        let ignored = match token {
            Token::CharacterRun { text } => text.chars().all(is_whitespace),
            Token::EndTag { name } => name == "html",
            Token::EndOfInput => true,
            _ => false,
        };
        if ignored {
            return;
        }
        match token {
            Token::Comment { text } => self.insert_comment_at(NodeId::ROOT, text),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::StartTag { name, .. } if name == "noframes" => self.handle_in_head_mode(token),
            _ => self.parse_error("unexpected-token-after-frameset", token.tag_name()),
        }
    }
}

impl TokenSink for TreeBuilder {
    fn process(&mut self, token: Token) -> TokenSinkResult {
        if std::mem::take(&mut self.skip_leading_newline)
            && let Token::CharacterRun { text } = &token
            && let Some(rest) = text.strip_prefix('\n')
        {
            if !rest.is_empty() {
                self.process_token(&Token::CharacterRun {
                    text: rest.to_string(),
                });
            }
        } else {
            self.process_token(&token);
        }
        self.pending_switch
            .take()
            .map_or(TokenSinkResult::Continue, TokenSinkResult::SwitchTo)
    }

    fn in_foreign_content(&self) -> bool {
        self.current_element()
            .is_some_and(|element| element.namespace != Namespace::Html)
    }
}
