//! Terminal and JSON renderings of a parsed tree.

use std::fmt::Write as _;

use owo_colors::OwoColorize;
use serde::Serialize;
use sift_dom::{Attributes, DomTree, NodeId, NodeType, QuirksMode};
use sift_html::ParseError;
use sift_select::{NodeVisitor, traverse};

// ====================================================================
// Terminal
// ====================================================================

/// Prints one indented, colored line per node.
pub struct TreePrinter {
    out: String,
}

impl TreePrinter {
    /// Render the subtree at `root`.
    pub fn render(tree: &DomTree, root: NodeId) -> String {
        let mut printer = Self { out: String::new() };
        traverse(&mut printer, tree, root);
        printer.out
    }
}

impl NodeVisitor for TreePrinter {
    fn head(&mut self, tree: &DomTree, node: NodeId, depth: usize) {
        let Some(node) = tree.get(node) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let line = match &node.node_type {
            NodeType::Document => "#document".bold().to_string(),
            NodeType::Element(data) => {
                let mut tag = format!("<{}", data.tag_name().cyan());
                for attr in data.attrs.iter() {
                    if attr.is_boolean() {
                        let _ = write!(tag, " {}", attr.key().yellow());
                    } else {
                        let _ = write!(
                            tag,
                            " {}={}",
                            attr.key().yellow(),
                            format!("\"{}\"", attr.value()).green()
                        );
                    }
                }
                tag.push('>');
                tag
            }
            NodeType::Text(text) => {
                format!("\"{}\"", text.replace('\n', "\\n").replace(' ', "\u{00B7}"))
            }
            NodeType::Data(data) => data.replace('\n', "\\n").magenta().to_string(),
            NodeType::Comment(text) => format!("<!--{text}-->").dimmed().to_string(),
            NodeType::Doctype(doctype) => format!("<!DOCTYPE {}>", doctype.name).dimmed().to_string(),
            NodeType::XmlDeclaration(decl) => {
                format!("<?{}{}?>", decl.name, decl.attrs).dimmed().to_string()
            }
        };
        let _ = writeln!(self.out, "{indent}{line}");
    }
}

/// One line per recorded parse error.
pub fn render_errors(errors: &[ParseError]) -> String {
    let mut out = format!("{}\n", format!("{} parse error(s)", errors.len()).red().bold());
    for error in errors {
        let _ = writeln!(out, "  {} {}", format!("{:>6}", error.position).dimmed(), error.message);
    }
    out
}

// ====================================================================
// JSON
// ====================================================================

/// A serializable copy of one node and its subtree.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeView<'a> {
    /// The document node.
    Document {
        /// Child nodes.
        children: Vec<NodeView<'a>>,
    },
    /// An element.
    Element {
        /// Tag name as written.
        name: &'a str,
        /// Namespace URI.
        namespace: &'a str,
        /// Attributes in source order.
        attributes: Vec<AttributeView<'a>>,
        /// Child nodes.
        children: Vec<NodeView<'a>>,
    },
    /// Character data.
    Text {
        /// The text.
        text: &'a str,
    },
    /// Raw script or style content.
    Data {
        /// The content.
        data: &'a str,
    },
    /// A comment.
    Comment {
        /// The comment body.
        text: &'a str,
    },
    /// A document type declaration.
    Doctype {
        /// Doctype name.
        name: &'a str,
        /// Public identifier.
        public_id: &'a str,
        /// System identifier.
        system_id: &'a str,
    },
    /// An XML declaration or processing instruction.
    XmlDeclaration {
        /// Target name.
        name: &'a str,
        /// Pseudo-attributes.
        attributes: Vec<AttributeView<'a>>,
    },
}

/// One attribute of a [`NodeView`].
#[derive(Debug, Serialize)]
pub struct AttributeView<'a> {
    /// Attribute name.
    pub name: &'a str,
    /// Attribute value.
    pub value: &'a str,
}

fn attribute_views(attrs: &Attributes) -> Vec<AttributeView<'_>> {
    attrs
        .iter()
        .map(|attr| AttributeView {
            name: attr.key(),
            value: attr.value(),
        })
        .collect()
}

impl<'a> NodeView<'a> {
    /// Copy the subtree at `id`.
    pub fn build(tree: &'a DomTree, id: NodeId) -> Option<Self> {
        let node = tree.get(id)?;
        let children = || -> Vec<NodeView<'a>> {
            tree.children(id)
                .iter()
                .filter_map(|&child| Self::build(tree, child))
                .collect()
        };
        Some(match &node.node_type {
            NodeType::Document => Self::Document {
                children: children(),
            },
            NodeType::Element(data) => Self::Element {
                name: data.tag_name(),
                namespace: data.namespace.as_ref(),
                attributes: attribute_views(&data.attrs),
                children: children(),
            },
            NodeType::Text(text) => Self::Text { text },
            NodeType::Data(data) => Self::Data { data },
            NodeType::Comment(text) => Self::Comment { text },
            NodeType::Doctype(doctype) => Self::Doctype {
                name: &doctype.name,
                public_id: &doctype.public_id,
                system_id: &doctype.system_id,
            },
            NodeType::XmlDeclaration(decl) => Self::XmlDeclaration {
                name: &decl.name,
                attributes: attribute_views(&decl.attrs),
            },
        })
    }
}

/// A selector match.
#[derive(Debug, Serialize)]
pub struct MatchView<'a> {
    /// Lowercased tag name.
    pub tag: &'a str,
    /// Normalised text content.
    pub text: String,
    /// Serialized element.
    pub html: String,
}

impl<'a> MatchView<'a> {
    /// Describe the element at `id`.
    pub fn build(tree: &'a DomTree, id: NodeId) -> Self {
        Self {
            tag: tree.tag_name(id).unwrap_or_default(),
            text: tree.text(id),
            html: tree.outer_html(id),
        }
    }
}

/// Everything `--json` prints.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Document mode derived from the doctype.
    pub quirks_mode: QuirksMode,
    /// The whole tree, when no selector was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<NodeView<'a>>,
    /// Selector matches, when a selector was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchView<'a>>>,
    /// Recorded parse errors, when tracking was on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a [ParseError]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_json_keeps_attribute_order() {
        let tree = sift_html::parse_body_fragment(r#"<a title="t" href="h">x</a>"#, "");
        let body = tree.body().unwrap();
        let anchor = tree.first_child(body).unwrap();
        let json = serde_json::to_value(NodeView::build(&tree, anchor).unwrap()).unwrap();

        assert_eq!(json["type"], "element");
        assert_eq!(json["name"], "a");
        assert_eq!(json["namespace"], "http://www.w3.org/1999/xhtml");
        assert_eq!(json["attributes"][0]["name"], "title");
        assert_eq!(json["attributes"][1]["name"], "href");
        assert_eq!(json["children"][0]["type"], "text");
        assert_eq!(json["children"][0]["text"], "x");
    }

    #[test]
    fn report_omits_absent_sections() {
        let tree = sift_html::parse_document("<!doctype html><p>hi", "");
        let report = Report {
            quirks_mode: tree.quirks_mode(),
            tree: None,
            matches: Some(vec![MatchView::build(&tree, tree.body().unwrap())]),
            errors: None,
        };
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["quirks_mode"], "no-quirks");
        assert!(json.get("tree").is_none());
        assert!(json.get("errors").is_none());
        assert_eq!(json["matches"][0]["tag"], "body");
        assert_eq!(json["matches"][0]["html"], "<body><p>hi</p></body>");
    }

    #[test]
    fn tree_printer_indents_by_depth() {
        let tree = sift_html::parse_document("<p>x</p>", "");
        let rendered = TreePrinter::render(&tree, tree.body().unwrap());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("  <"));
        assert!(lines[2].starts_with("    \"x\""));
    }
}
