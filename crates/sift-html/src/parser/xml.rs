//! XML tree construction.
//!
//! No implied structure and no recovery rules beyond closing elements: start
//! tags open elements, end tags close the nearest open element of the same
//! name, and everything else is inserted where it appears.

use sift_dom::{
    Attributes, DoctypeData, DomTree, ElementData, NodeId, NodeType, Tag, XmlDeclarationData,
};

use crate::errors::ParseErrorList;
use crate::settings::ParseSettings;
use crate::tokenizer::{Token, Tokenizer};

/// Builds a [`DomTree`] from markup without any HTML semantics.
pub struct XmlTreeBuilder {
    tokenizer: Tokenizer,
    settings: ParseSettings,
    tree: DomTree,
    /// Open elements; the Document node is the implicit bottom.
    stack: Vec<NodeId>,
}

impl XmlTreeBuilder {
    /// Create a builder over `input`. Errors go into `errors`.
    #[must_use]
    pub fn new(input: &str, base_uri: &str, settings: ParseSettings, errors: ParseErrorList) -> Self {
        let mut tokenizer = Tokenizer::with_errors(input, errors);
        tokenizer.set_allow_cdata(true);
        Self {
            tokenizer,
            settings,
            tree: DomTree::with_base_uri(base_uri),
            stack: Vec::new(),
        }
    }

    /// Parse the input. Top-level nodes become children of the Document node,
    /// which serves for whole documents and for fragments alike.
    #[must_use]
    pub fn parse(mut self) -> (DomTree, ParseErrorList) {
        loop {
            let token = self.tokenizer.next_token();
            if token.is_eof() {
                break;
            }
            self.process_token(token);
        }
        (self.tree, self.tokenizer.into_errors())
    }

    fn current_node(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId::ROOT)
    }

    fn process_token(&mut self, token: Token) {
        match token {
            Token::StartTag {
                name,
                attributes,
                self_closing,
                ..
            } => self.insert_start_tag(&name, attributes, self_closing),
            Token::EndTag { name, .. } => self.pop_to_close(&name),
            Token::Character { text } => self.insert_text(&text),
            Token::Comment { text, bogus } => {
                let node = if bogus && text.starts_with('?') {
                    self.declaration(&text)
                } else {
                    None
                };
                let node = node.unwrap_or_else(|| self.tree.alloc(NodeType::Comment(text)));
                self.append(node);
            }
            Token::Doctype {
                name,
                public_id,
                system_id,
                ..
            } => {
                let doctype = self.tree.alloc(NodeType::Doctype(DoctypeData {
                    name: name.map(|name| self.settings.normalize_tag(&name)).unwrap_or_default(),
                    public_id: public_id.unwrap_or_default(),
                    system_id: system_id.unwrap_or_default(),
                }));
                self.append(doctype);
            }
            Token::EndOfFile => {}
        }
    }

    fn insert_start_tag(&mut self, name: &str, attributes: Attributes, self_closing: bool) {
        let mut tag = Tag::value_of(name, self.settings.preserve_tag_case);
        if self_closing {
            tag.set_self_closing();
        }
        let attributes = self.settings.normalize_attributes(attributes);
        let element = self
            .tree
            .alloc(NodeType::Element(ElementData::new(tag, attributes)));
        self.append(element);
        if !self_closing {
            self.stack.push(element);
        }
    }

    /// Close the nearest open element named `name`. An end tag with no
    /// matching open element is dropped.
    fn pop_to_close(&mut self, name: &str) {
        let name = self.settings.normalize_tag(name);
        let Some(index) = self.stack.iter().rposition(|&id| {
            self.tree
                .as_element(id)
                .is_some_and(|element| element.tag_name() == name)
        }) else {
            self.tokenizer
                .record_error(format!("Unexpected end tag [{name}] with no open element"));
            return;
        };
        self.stack.truncate(index);
    }

    fn insert_text(&mut self, text: &str) {
        let parent = self.current_node();
        if let Some(last) = self.tree.last_child(parent)
            && let Some(node) = self.tree.get_mut(last)
            && let NodeType::Text(existing) = &mut node.node_type
        {
            existing.push_str(text);
            return;
        }
        let node = self.tree.alloc(NodeType::Text(text.to_string()));
        self.append(node);
    }

    /// Append `node` to the current element.
    fn append(&mut self, node: NodeId) {
        if let Err(err) = self.tree.append_child(self.current_node(), node) {
            self.tokenizer.record_error(err.to_string());
        }
    }

    /// Turn a `<?target a="b"?>` bogus comment into a declaration node. The
    /// body is re-tokenized as a start tag to read its pseudo-attributes.
    fn declaration(&mut self, text: &str) -> Option<NodeId> {
        let body = text.strip_prefix('?')?;
        let body = body.strip_suffix('?').unwrap_or(body);
        if body.trim().is_empty() {
            return None;
        }

        let mut tokenizer = Tokenizer::new(&format!("<{body}>"));
        let Token::StartTag {
            name, attributes, ..
        } = tokenizer.next_token()
        else {
            return None;
        };

        Some(self.tree.alloc(NodeType::XmlDeclaration(XmlDeclarationData {
            name: self.settings.normalize_tag(&name),
            attrs: self.settings.normalize_attributes(attributes),
            processing_instruction: true,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> DomTree {
        XmlTreeBuilder::new(input, "", ParseSettings::PRESERVE_CASE, ParseErrorList::no_tracking())
            .parse()
            .0
    }

    #[test]
    fn keeps_case_and_self_closing() {
        let tree = parse("<Feed><Entry id=\"1\"/><Entry id=\"2\">x</Entry></Feed>");
        assert_eq!(
            tree.outer_html(NodeId::ROOT),
            "<Feed><Entry id=\"1\" /><Entry id=\"2\">x</Entry></Feed>"
        );
    }

    #[test]
    fn stray_end_tag_is_dropped() {
        let tree = parse("<a><b>1</c>2</b></a>");
        assert_eq!(tree.outer_html(NodeId::ROOT), "<a><b>12</b></a>");
    }

    #[test]
    fn declaration_and_cdata() {
        let tree = parse("<?xml version=\"1.0\" encoding=\"UTF-8\"?><doc><![CDATA[a < b]]></doc>");
        let first = tree.first_child(NodeId::ROOT);
        let Some(NodeType::XmlDeclaration(decl)) = first.and_then(|id| tree.get(id)).map(|n| &n.node_type)
        else {
            panic!("expected a declaration");
        };
        assert_eq!(decl.name, "xml");
        assert_eq!(decl.attrs.get("version"), Some("1.0"));
        assert_eq!(decl.attrs.get("encoding"), Some("UTF-8"));
        assert_eq!(tree.outer_html(NodeId::ROOT), "<?xml version=\"1.0\" encoding=\"UTF-8\"?><doc>a &lt; b</doc>");
    }
}
