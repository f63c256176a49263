//! Document-level helpers on [`DomTree`].
//!
//! [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)

use sift_common::validate::{ValidationError, not_empty};
use sift_common::warning::warn_once;

use crate::text::normalise_whitespace;
use crate::{Attributes, DomTree, ElementData, NodeId, NodeType, Tag};

impl DomTree {
    /// A document holding an empty `html` > (`head`, `body`) skeleton.
    #[must_use]
    pub fn create_shell(base_uri: &str) -> Self {
        let mut tree = Self::with_base_uri(base_uri);
        let html = tree.new_element("html");
        let head = tree.new_element("head");
        let body = tree.new_element("body");
        let assembled = tree
            .append_child(NodeId::ROOT, html)
            .and_then(|()| tree.append_child(html, head))
            .and_then(|()| tree.append_child(html, body));
        if let Err(err) = assembled {
            warn_once("DOM", &format!("document shell incomplete: {err}"));
        }
        tree
    }

    /// Allocate a detached HTML element named `tag_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Empty`] if `tag_name` is empty.
    pub fn create_element(&mut self, tag_name: &str) -> Result<NodeId, ValidationError> {
        not_empty(tag_name, "tag name")?;
        Ok(self.new_element(tag_name))
    }

    fn new_element(&mut self, tag_name: &str) -> NodeId {
        self.alloc(NodeType::Element(ElementData::new(
            Tag::html(tag_name),
            Attributes::new(),
        )))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeType::Text(text.to_string()))
    }

    /// [§ 3.1.3 The head element](https://html.spec.whatwg.org/multipage/dom.html#the-head-element-2)
    ///
    /// The first `head` child of the document element.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.html_child("head")
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// The first `body` or `frameset` child of the document element.
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.html_child("body").or_else(|| self.html_child("frameset"))
    }

    fn html_child(&self, name: &str) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|&child| self.tag_name(child) == Some(name))
    }

    /// [§ 3.1.3 document.title](https://html.spec.whatwg.org/multipage/dom.html#document.title)
    ///
    /// The text of the first `title` element, whitespace-collapsed and
    /// trimmed. Empty when there is no title.
    #[must_use]
    pub fn title(&self) -> String {
        self.first_element_by_tag("title", NodeId::ROOT)
            .map(|title| {
                let raw: String = self
                    .children(title)
                    .iter()
                    .filter_map(|&child| self.as_text(child))
                    .collect();
                normalise_whitespace(&raw).trim().to_string()
            })
            .unwrap_or_default()
    }

    /// The first element named `name` at or under `root`, in document order.
    #[must_use]
    pub fn first_element_by_tag(&self, name: &str, root: NodeId) -> Option<NodeId> {
        self.descendants(root)
            .find(|&id| self.tag_name(id) == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_has_head_and_body() {
        let tree = DomTree::create_shell("https://example.com/");
        let html = tree.document_element().unwrap();
        assert_eq!(tree.tag_name(html), Some("html"));
        assert_eq!(tree.children(html), &[tree.head().unwrap(), tree.body().unwrap()]);
        assert_eq!(tree.base_uri(), "https://example.com/");
        assert_eq!(tree.title(), "");
    }

    #[test]
    fn create_element_rejects_empty_name() {
        let mut tree = DomTree::new();
        assert!(tree.create_element("").is_err());
        let div = tree.create_element("DIV").unwrap();
        assert_eq!(tree.tag_name(div), Some("div"));
        assert_eq!(tree.parent(div), None);
    }

    #[test]
    fn title_collapses_whitespace() {
        let mut tree = DomTree::create_shell("");
        let head = tree.head().unwrap();
        let title = tree.create_element("title").unwrap();
        let text = tree.create_text("  Hello \n  world ");
        tree.append_child(head, title).unwrap();
        tree.append_child(title, text).unwrap();
        assert_eq!(tree.title(), "Hello world");
    }
}
