//! HTML selection and text extraction helpers built on `scraper`.

use ego_tree::NodeRef;
use scraper::{node::Node, ElementRef, Selector};

use super::text::collapse_whitespace;

/// Parse a selector known to be valid at compile time.
pub fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

/// Parse a list of selectors, skipping any that fail to parse.
pub fn css_list(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

/// All text below an element, concatenated as-is.
pub fn raw_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text below an element with whitespace collapsed.
pub fn element_text(element: &ElementRef<'_>) -> String {
    // Join text nodes with a space so adjacent block elements do not run together.
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// First element under `root` matching `selector`.
pub fn select_first<'a>(root: &ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    root.select(selector).next()
}

/// Parent element, if any.
pub fn parent_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Local tag name of an element (`div`, `h2`, ...).
pub fn tag_name<'a>(element: &ElementRef<'a>) -> &'a str {
    element.value().name()
}

/// Text of any node: a text node's content or an element's collapsed text.
pub fn node_text(node: &NodeRef<'_, Node>) -> String {
    match node.value() {
        Node::Text(text) => collapse_whitespace(text),
        Node::Element(_) => ElementRef::wrap(*node)
            .map(|e| element_text(&e))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Whether a node resolves to a single string: a text node, or an element
/// whose only descendant chain ends in one text node.
pub fn has_single_string(node: &NodeRef<'_, Node>) -> bool {
    match node.value() {
        Node::Text(_) => true,
        Node::Element(_) => {
            let mut children = node.children();
            match (children.next(), children.next()) {
                (Some(only), None) => has_single_string(&only),
                _ => false,
            }
        }
        _ => false,
    }
}
