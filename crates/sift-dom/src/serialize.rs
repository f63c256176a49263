//! Plain HTML serializer.
//!
//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! No pretty-printing: the output is the tree's content written back in
//! source order with text escaped. Re-parsing valid HTML output yields the
//! same element structure.

use std::fmt::Write;

use crate::{DomTree, NodeId, NodeType};

/// Escape `&`, `<`, `>` and non-breaking spaces for text content.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

impl DomTree {
    /// `id` and its subtree as markup.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        if self.get(id).is_some() {
            self.write_subtree(&mut out, id);
        }
        out
    }

    /// The markup of `id`'s children.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_subtree(&mut out, child);
        }
        out
    }

    /// Write `root` and its descendants in document order, entering and
    /// leaving each node without recursion so depth is bounded only by memory.
    fn write_subtree(&self, out: &mut String, root: NodeId) {
        let mut node = root;
        loop {
            self.write_open(out, node);

            // STEP 1: Descend.
            if let Some(child) = self.first_child(node) {
                node = child;
                continue;
            }

            // STEP 2: Close nodes on the way up until a next sibling appears.
            loop {
                self.write_close(out, node);
                if node == root {
                    return;
                }
                if let Some(next) = self.next_sibling(node) {
                    node = next;
                    break;
                }
                let Some(parent) = self.parent(node) else {
                    return;
                };
                node = parent;
            }
        }
    }

    /// Start tags and every leaf node.
    fn write_open(&self, out: &mut String, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.node_type {
            NodeType::Document => {}
            NodeType::Element(el) => {
                let _ = write!(out, "<{}{}", el.tag_name(), el.attrs);
                if node.children().is_empty() && el.tag.is_self_closing() {
                    // Void elements take no end tag; other self-closed tags keep the slash.
                    out.push_str(if el.tag.is_empty() { ">" } else { " />" });
                } else {
                    out.push('>');
                }
            }
            NodeType::Text(text) => out.push_str(&escape_text(text)),
            NodeType::Data(data) => out.push_str(data),
            NodeType::Comment(data) => {
                let _ = write!(out, "<!--{data}-->");
            }
            NodeType::Doctype(doctype) => {
                let bare = doctype.public_id.is_empty() && doctype.system_id.is_empty();
                out.push_str(if bare { "<!doctype" } else { "<!DOCTYPE" });
                if !doctype.name.is_empty() {
                    let _ = write!(out, " {}", doctype.name);
                }
                if !doctype.public_id.is_empty() {
                    let _ = write!(out, " PUBLIC \"{}\"", doctype.public_id);
                }
                if !doctype.system_id.is_empty() {
                    if doctype.public_id.is_empty() {
                        out.push_str(" SYSTEM");
                    }
                    let _ = write!(out, " \"{}\"", doctype.system_id);
                }
                out.push('>');
            }
            NodeType::XmlDeclaration(decl) => {
                if decl.processing_instruction {
                    let _ = write!(out, "<?{}{}?>", decl.name, decl.attrs);
                } else {
                    let _ = write!(out, "<!{}{}>", decl.name, decl.attrs);
                }
            }
        }
    }

    /// End tags, for elements that were not written self-closed.
    fn write_close(&self, out: &mut String, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        if let NodeType::Element(el) = &node.node_type
            && !(node.children().is_empty() && el.tag.is_self_closing())
        {
            let _ = write!(out, "</{}>", el.tag_name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attributes, DoctypeData, ElementData, Tag};

    fn element(tree: &mut DomTree, name: &str) -> NodeId {
        tree.alloc(NodeType::Element(ElementData::new(
            Tag::html(name),
            Attributes::new(),
        )))
    }

    #[test]
    fn void_and_self_closing() {
        let mut tree = DomTree::new();
        let div = element(&mut tree, "div");
        let br = element(&mut tree, "br");
        let mut widget = Tag::html("widget");
        widget.set_self_closing();
        let widget = tree.alloc(NodeType::Element(ElementData::new(widget, Attributes::new())));
        tree.append_child(NodeId::ROOT, div).unwrap();
        tree.append_child(div, br).unwrap();
        tree.append_child(div, widget).unwrap();
        assert_eq!(tree.outer_html(div), "<div><br><widget /></div>");
    }

    #[test]
    fn text_is_escaped_data_is_not() {
        let mut tree = DomTree::new();
        let p = element(&mut tree, "p");
        let text = tree.alloc(NodeType::Text("a < b & c".into()));
        tree.append_child(p, text).unwrap();
        let script = element(&mut tree, "script");
        let data = tree.alloc(NodeType::Data("if (a < b) {}".into()));
        tree.append_child(script, data).unwrap();
        assert_eq!(tree.outer_html(p), "<p>a &lt; b &amp; c</p>");
        assert_eq!(tree.inner_html(script), "if (a < b) {}");
    }

    #[test]
    fn doctype_forms() {
        let mut tree = DomTree::new();
        let doctype = tree.alloc(NodeType::Doctype(DoctypeData {
            name: "html".into(),
            ..DoctypeData::default()
        }));
        assert_eq!(tree.outer_html(doctype), "<!doctype html>");
        let legacy = tree.alloc(NodeType::Doctype(DoctypeData {
            name: "html".into(),
            public_id: "-//W3C//DTD HTML 4.01//EN".into(),
            system_id: "http://www.w3.org/TR/html4/strict.dtd".into(),
        }));
        assert_eq!(
            tree.outer_html(legacy),
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\">"
        );
    }

    #[test]
    fn deep_nesting_serializes_without_recursion() {
        let mut tree = DomTree::new();
        let mut parent = NodeId::ROOT;
        for _ in 0..200_000 {
            let div = element(&mut tree, "div");
            tree.append_child(parent, div).unwrap();
            parent = div;
        }
        let html = tree.outer_html(NodeId::ROOT);
        assert_eq!(html.len(), 200_000 * "<div></div>".len());
        assert!(html.starts_with("<div><div>"));
        assert!(html.ends_with("</div></div>"));
    }
}
