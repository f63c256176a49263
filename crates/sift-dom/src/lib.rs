//! Document tree for the sift parser.
//!
//! This crate provides an arena-based tree following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/) closely enough for a
//! parser and a selector engine:
//! - [`DomTree`] owns every node; relationships are [`NodeId`] handles
//! - [`Tag`] describes an element's structural behaviour
//! - [`Attributes`] keeps an element's attributes in source order
//!
//! # Design
//!
//! Parents own their children through the `children` list. The parent link
//! is a plain handle, so there are no reference cycles. Each node caches its
//! index within its parent's children; every mutation below keeps that cache
//! and the parent links consistent. Detached nodes stay in the arena but are
//! unreachable from the root.

pub mod attributes;
pub mod document;
pub mod serialize;
pub mod tag;
pub mod text;

pub use attributes::{Attribute, Attributes};
pub use tag::{Tag, TagOptions};

use serde::Serialize;
use sift_common::validate::{ValidationError, is_true};
use strum_macros::{AsRefStr, Display};

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    children: Vec<NodeId>,

    /// Position of this node in its parent's `children`. Zero when detached.
    sibling_index: usize,
}

impl Node {
    const fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            sibling_index: 0,
        }
    }

    /// The parent handle, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The child handles in order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Cached index within the parent's children.
    #[must_use]
    pub const fn sibling_index(&self) -> usize {
        self.sibling_index
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// Raw content of a `script` or `style` element. Not escaped on output and
    /// not part of an element's text.
    Data(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    Doctype(DoctypeData),
    /// `<?xml version="1.0"?>` and other processing instructions.
    XmlDeclaration(XmlDeclarationData),
}

/// [§ 2.1.8 Namespaces](https://infra.spec.whatwg.org/#namespaces)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, AsRefStr)]
pub enum Namespace {
    /// "The HTML namespace is "http://www.w3.org/1999/xhtml"."
    #[default]
    #[strum(serialize = "http://www.w3.org/1999/xhtml")]
    Html,
    /// "The SVG namespace is "http://www.w3.org/2000/svg"."
    #[strum(serialize = "http://www.w3.org/2000/svg")]
    Svg,
    /// "The MathML namespace is "http://www.w3.org/1998/Math/MathML"."
    #[strum(serialize = "http://www.w3.org/1998/Math/MathML")]
    MathMl,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "Elements have an associated namespace, namespace prefix, local name, ..."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// The element's tag descriptor.
    pub tag: Tag,
    /// "An element has an associated attribute list"
    pub attrs: Attributes,
    /// The element's namespace.
    pub namespace: Namespace,
}

impl ElementData {
    /// An HTML-namespace element.
    #[must_use]
    pub const fn new(tag: Tag, attrs: Attributes) -> Self {
        Self {
            tag,
            attrs,
            namespace: Namespace::Html,
        }
    }

    /// The tag name as written on the element.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        self.tag.name()
    }

    /// The lowercased tag name.
    #[must_use]
    pub fn normal_name(&self) -> &str {
        self.tag.normal_name()
    }

    /// Whether this is an HTML-namespace element with the given normal name.
    #[must_use]
    pub fn is_html(&self, name: &str) -> bool {
        self.namespace == Namespace::Html && self.tag.normal_name() == name
    }

    /// Value of `key`, if set.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key)
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Class names from the class attribute, split on ASCII whitespace.
    #[must_use]
    pub fn classes(&self) -> Vec<&str> {
        self.attrs
            .get("class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether `name` is one of the element's classes, ignoring ASCII case.
    #[must_use]
    pub fn has_class(&self, name: &str) -> bool {
        self.attrs.get("class").is_some_and(|list| {
            list.split_ascii_whitespace()
                .any(|class| class.eq_ignore_ascii_case(name))
        })
    }
}

/// The name and identifiers of a `<!DOCTYPE>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctypeData {
    /// Doctype name, usually `html`.
    pub name: String,
    /// Public identifier, empty when missing.
    pub public_id: String,
    /// System identifier, empty when missing.
    pub system_id: String,
}

/// An XML declaration or processing instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclarationData {
    /// Target name (`xml` for `<?xml ...?>`).
    pub name: String,
    /// Pseudo-attributes such as `version` and `encoding`.
    pub attrs: Attributes,
    /// Written as `<?...?>` rather than `<!...>`.
    pub processing_instruction: bool,
}

/// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#concept-document-mode)
///
/// "Each document has an associated mode: "no-quirks", "quirks", or "limited-quirks"."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuirksMode {
    /// Standards mode.
    #[default]
    #[strum(serialize = "no-quirks")]
    NoQuirks,
    /// Full legacy rendering.
    #[strum(serialize = "quirks")]
    Quirks,
    /// Almost-standards mode.
    #[strum(serialize = "limited-quirks")]
    LimitedQuirks,
}

/// Arena-based DOM tree.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// The Document node is always at [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    base_uri: String,
    quirks_mode: QuirksMode,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_uri("")
    }

    /// Create an empty tree that resolves relative URLs against `base_uri`.
    #[must_use]
    pub fn with_base_uri(base_uri: &str) -> Self {
        Self {
            nodes: vec![Node::new(NodeType::Document)],
            base_uri: base_uri.to_string(),
            quirks_mode: QuirksMode::NoQuirks,
        }
    }

    /// The document's base URI.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#concept-document-mode) The document mode.
    #[must_use]
    pub const fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    /// Set the document mode.
    pub const fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of allocated nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the Document node exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new, detached node and return its ID.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node_type));
        id
    }

    // ===== Mutation =====

    /// Rewrite the cached sibling index of every child of `parent` from `from`.
    fn reindex(&mut self, parent: NodeId, from: usize) {
        let count = self.nodes[parent.0].children.len();
        for index in from..count {
            let child = self.nodes[parent.0].children[index];
            self.nodes[child.0].sibling_index = index;
        }
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Detach `node` from its parent, if any. The node and its subtree stay
    /// allocated and can be re-inserted.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node.0).and_then(|n| n.parent) else {
            return;
        };
        let index = self.nodes[node.0].sibling_index;
        let _ = self.nodes[parent.0].children.remove(index);
        self.nodes[node.0].parent = None;
        self.nodes[node.0].sibling_index = 0;
        self.reindex(parent, index);
    }

    /// Remove `child` from `parent`. Does nothing if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) == Some(parent) {
            self.detach(child);
        }
    }

    /// Fail unless `child` can be placed under `parent` without creating a
    /// cycle. A childless node is nobody's ancestor, so fresh nodes skip the
    /// ancestor walk.
    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), ValidationError> {
        let childless = self.children(child).is_empty();
        is_true(
            child != parent && (childless || !self.is_descendant_of(parent, child)),
            "cannot insert a node under itself or one of its descendants",
        )
    }

    /// Insert `child` into `parent`'s children at `index`, detaching it from
    /// any previous parent first. `index` is clamped to the child count.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Failed`] if `child` is `parent` or one of
    /// its ancestors. The tree is left unchanged.
    pub fn insert_child_at(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), ValidationError> {
        self.check_insertion(parent, child)?;
        self.detach(child);
        let index = index.min(self.nodes[parent.0].children.len());
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.reindex(parent, index);
        Ok(())
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// # Errors
    ///
    /// Same as [`insert_child_at`](Self::insert_child_at).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ValidationError> {
        let end = self.nodes[parent.0].children.len();
        self.insert_child_at(parent, end, child)
    }

    /// Insert `child` as the first child of `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`insert_child_at`](Self::insert_child_at).
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), ValidationError> {
        self.insert_child_at(parent, 0, child)
    }

    /// [§ 4.2.2 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Insert `child` into `parent` immediately before `reference`. Appends
    /// when `reference` is not a child of `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`insert_child_at`](Self::insert_child_at).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), ValidationError> {
        if self.parent(reference) != Some(parent) {
            return self.append_child(parent, child);
        }
        self.check_insertion(parent, child)?;
        // Detaching first may shift the reference left.
        self.detach(child);
        let index = self.nodes[reference.0].sibling_index;
        self.insert_child_at(parent, index, child)
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Failed`] if `to` is `from` or lies inside
    /// it. The tree is left unchanged.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), ValidationError> {
        is_true(
            from != to && !self.is_descendant_of(to, from),
            "cannot move children into their own subtree",
        )?;
        let children = std::mem::take(&mut self.nodes[from.0].children);
        let start = self.nodes[to.0].children.len();
        for &child in &children {
            self.nodes[child.0].parent = Some(to);
        }
        self.nodes[to.0].children.extend(children);
        self.reindex(to, start);
        Ok(())
    }

    // ===== Navigation =====

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Element children of a node, in order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.as_element(child).is_some())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Index of a node within its parent's children.
    #[must_use]
    pub fn sibling_index(&self, id: NodeId) -> usize {
        self.get(id).map_or(0, |n| n.sibling_index)
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        self.children(parent).get(self.sibling_index(id) + 1).copied()
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.sibling_index(id).checked_sub(1)?;
        self.children(parent).get(index).copied()
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
            forward: false,
        }
    }

    /// Iterate over following siblings (from immediately after to last child).
    #[must_use]
    pub fn following_siblings(&self, id: NodeId) -> SiblingIterator<'_> {
        SiblingIterator {
            tree: self,
            current: self.next_sibling(id),
            forward: true,
        }
    }

    /// Pre-order iteration over `id` and all of its descendants.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: vec![id],
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Lowercased tag name if this node is an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(ElementData::normal_name)
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over the siblings on one side of a node.
pub struct SiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
    forward: bool,
}

impl Iterator for SiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = if self.forward {
            self.tree.next_sibling(id)
        } else {
            self.tree.prev_sibling(id)
        };
        Some(id)
    }
}

/// Pre-order iterator over a subtree, root included.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
