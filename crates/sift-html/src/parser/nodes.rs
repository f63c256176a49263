//! [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)

use sift_dom::{Attributes, ElementData, Namespace, NodeId, NodeType, Tag};

use super::core::HtmlTreeBuilder;
use super::foreign_content::{
    adjust_foreign_attributes, adjust_mathml_attributes, adjust_svg_attributes,
    adjust_svg_tag_name,
};
use crate::tokenizer::Token;

/// Where a node goes: inside `parent`, before `before` or at the end.
pub(super) type InsertionLocation = (NodeId, Option<NodeId>);

impl HtmlTreeBuilder {
    /// [§ 13.2.6.1 Appropriate place for inserting a node](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// `override_target` replaces the current node as the target, as the
    /// adoption agency algorithm does with its common ancestor.
    pub(super) fn appropriate_place(&self, override_target: Option<NodeId>) -> InsertionLocation {
        // STEP 1: "If there was an override target specified, then let target
        //          be the override target. Otherwise, let target be the
        //          current node."
        let target = override_target
            .or_else(|| self.current_node())
            .unwrap_or(NodeId::ROOT);

        // STEP 2: "If foster parenting is enabled and target is a table,
        //          tbody, tfoot, thead, or tr element"
        if self.foster_parenting
            && self.is_html_one_of(target, &["table", "tbody", "tfoot", "thead", "tr"])
        {
            return self.foster_parent_location();
        }

        // "Otherwise: Let adjusted insertion location be inside target, after
        //  its last child (if any)."
        (target, None)
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    fn foster_parent_location(&self) -> InsertionLocation {
        // STEP 2.1: "Let last template be the last template element in the
        //            stack of open elements, if any."
        let last_template = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.is_html_named(id, "template"));
        // STEP 2.2: "Let last table be the last table element in the stack of
        //            open elements, if any."
        let last_table = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.is_html_named(id, "table"));

        // STEP 2.3: "If there is a last template and either there is no last
        //            table, or there is one, but last template is lower
        //            (more recently added) than last table in the stack"
        if let Some(template) = last_template
            && last_table.is_none_or(|table| template > table)
        {
            return (self.stack_of_open_elements[template], None);
        }

        // STEP 2.4: "If there is no last table, then let adjusted insertion
        //            location be inside the first element in the stack of
        //            open elements (the html element), after its last child"
        let Some(table_index) = last_table else {
            let html = self
                .stack_of_open_elements
                .first()
                .copied()
                .unwrap_or(NodeId::ROOT);
            return (html, None);
        };

        // STEP 2.5: "If last table has a parent node, then let adjusted
        //            insertion location be inside last table's parent node,
        //            immediately before last table"
        let table = self.stack_of_open_elements[table_index];
        if let Some(parent) = self.tree.parent(table) {
            return (parent, Some(table));
        }

        // STEP 2.6-2.7: "Let previous element be the element immediately above
        //                last table in the stack of open elements." and insert
        //                inside it, after its last child.
        let previous = table_index
            .checked_sub(1)
            .map_or(NodeId::ROOT, |index| self.stack_of_open_elements[index]);
        (previous, None)
    }

    /// Insert `node` at `location`.
    pub(super) fn insert_at(&mut self, location: InsertionLocation, node: NodeId) {
        let inserted = match location {
            (parent, Some(before)) => self.tree.insert_before(parent, node, before),
            (parent, None) => self.tree.append_child(parent, node),
        };
        if let Err(err) = inserted {
            self.parse_error(&err.to_string());
        }
    }

    /// Append `node` as the last child of `parent`. A move the tree refuses
    /// is recorded as a parse error and changes nothing.
    pub(super) fn append_to(&mut self, parent: NodeId, node: NodeId) {
        if let Err(err) = self.tree.append_child(parent, node) {
            self.parse_error(&err.to_string());
        }
    }

    /// Move all children of `from` to the end of `to`.
    pub(super) fn move_children(&mut self, from: NodeId, to: NodeId) {
        if let Err(err) = self.tree.move_children(from, to) {
            self.parse_error(&err.to_string());
        }
    }

    /// [§ 13.2.6.1 Create an element for a token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// Names are normalised through the parse settings. SVG and MathML
    /// elements get their tag and attribute names adjusted:
    /// "adjust MathML attributes", "adjust SVG attributes" and "adjust foreign
    /// attributes".
    pub(super) fn create_element(
        &mut self,
        name: &str,
        attributes: &Attributes,
        namespace: Namespace,
    ) -> NodeId {
        let mut attributes = self.settings.normalize_attributes(attributes.clone());
        let preserve = self.settings.preserve_tag_case;
        let tag = match namespace {
            Namespace::Html => Tag::value_of(name, preserve),
            Namespace::Svg => {
                adjust_svg_attributes(&mut attributes);
                adjust_foreign_attributes(&mut attributes);
                adjust_svg_tag_name(&name.trim().to_ascii_lowercase())
                    .map_or_else(|| Tag::value_of(name, preserve), |adjusted| {
                        Tag::value_of(adjusted, true)
                    })
            }
            Namespace::MathMl => {
                adjust_mathml_attributes(&mut attributes);
                adjust_foreign_attributes(&mut attributes);
                Tag::value_of(name, preserve)
            }
        };

        let mut element = ElementData::new(tag, attributes);
        element.namespace = namespace;
        self.tree.alloc(NodeType::Element(element))
    }

    /// Create an element for a start tag token; other tokens give an element
    /// with the token's tag name and no attributes.
    pub(super) fn create_element_for_token(&mut self, token: &Token, namespace: Namespace) -> NodeId {
        match token {
            Token::StartTag {
                name, attributes, ..
            } => self.create_element(name, attributes, namespace),
            other => self.create_element(
                other.tag_name().unwrap_or_default(),
                &Attributes::new(),
                namespace,
            ),
        }
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "When the steps below require the user agent to insert an HTML element
    /// for a token, the user agent must insert a foreign element for the token,
    /// in the HTML namespace."
    pub(super) fn insert_html_element(&mut self, token: &Token) -> NodeId {
        self.insert_foreign_element(token, Namespace::Html)
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    pub(super) fn insert_foreign_element(&mut self, token: &Token, namespace: Namespace) -> NodeId {
        // STEP 1: "Let the adjusted insertion location be the appropriate
        //          place for inserting a node."
        let location = self.appropriate_place(None);

        // STEP 2: "Let element be the result of creating an element for the
        //          token in the given namespace"
        let element = self.create_element_for_token(token, namespace);

        // STEP 3: "If it is possible to insert element at the adjusted
        //          insertion location, then ... insert element at the adjusted
        //          insertion location."
        self.insert_at(location, element);

        // STEP 4: "Push element onto the stack of open elements so that it is
        //          the new current node."
        self.stack_of_open_elements.push(element);
        element
    }

    /// Insert an element for `token` and pop it straight away, for void
    /// elements and self-closing foreign elements.
    pub(super) fn insert_empty_element(&mut self, token: &Token, namespace: Namespace) -> NodeId {
        let element = self.insert_foreign_element(token, namespace);
        self.pop_current_node();
        element
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    ///
    /// Inserts a run of characters. Text inside `script` and `style` becomes a
    /// data node.
    pub(super) fn insert_characters(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        // STEP 2: "Let the adjusted insertion location be the appropriate
        //          place for inserting a node."
        let (parent, before) = self.appropriate_place(None);

        // STEP 3: "If the adjusted insertion location is in a Document node,
        //          then return."
        if parent == NodeId::ROOT {
            return;
        }

        let is_data = self.is_html_one_of(parent, &["script", "style"]);

        // STEP 4: "If there is a Text node immediately before the adjusted
        //          insertion location, then append data to that Text node's
        //          data."
        let previous = match before {
            Some(reference) => self.tree.prev_sibling(reference),
            None => self.tree.last_child(parent),
        };
        if let Some(previous) = previous
            && let Some(node) = self.tree.get_mut(previous)
        {
            match &mut node.node_type {
                NodeType::Text(existing) if !is_data => {
                    existing.push_str(text);
                    return;
                }
                NodeType::Data(existing) if is_data => {
                    existing.push_str(text);
                    return;
                }
                _ => {}
            }
        }

        // STEP 5: "Otherwise, create a new Text node whose data is data ...
        //          and insert the newly created node at the adjusted insertion
        //          location."
        let node = if is_data {
            self.tree.alloc(NodeType::Data(text.to_string()))
        } else {
            self.tree.alloc(NodeType::Text(text.to_string()))
        };
        self.insert_at((parent, before), node);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    ///
    /// "When the steps below require the user agent to insert a comment while
    /// processing a comment token, optionally with an explicitly insertion
    /// position position"
    pub(super) fn insert_comment(&mut self, text: &str, position: Option<NodeId>) {
        // STEP 2: "If position was specified, then let the adjusted insertion
        //          location be position. Otherwise, let adjusted insertion
        //          location be the appropriate place for inserting a node."
        let location = position.map_or_else(|| self.appropriate_place(None), |parent| (parent, None));
        let comment = self.tree.alloc(NodeType::Comment(text.to_string()));
        self.insert_at(location, comment);
    }
}
