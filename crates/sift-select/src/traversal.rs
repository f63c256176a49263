//! Depth-first tree walking with enter and leave callbacks.

use sift_dom::{DomTree, NodeId};

/// Callbacks for [`traverse`].
///
/// `head` runs when a node is first reached and `tail` once all of its
/// descendants have been visited. `depth` counts from zero at the root of the
/// walk.
pub trait NodeVisitor {
    /// Called on entering `node`.
    fn head(&mut self, tree: &DomTree, node: NodeId, depth: usize);

    /// Called on leaving `node`.
    fn tail(&mut self, tree: &DomTree, node: NodeId, depth: usize) {
        let _ = (tree, node, depth);
    }
}

/// Walk `root` and its descendants in document order without recursion.
pub fn traverse<V: NodeVisitor + ?Sized>(visitor: &mut V, tree: &DomTree, root: NodeId) {
    let mut node = root;
    let mut depth = 0_usize;

    loop {
        visitor.head(tree, node, depth);

        // STEP 1: Descend.
        if let Some(child) = tree.first_child(node) {
            node = child;
            depth += 1;
            continue;
        }

        // STEP 2: Climb until a next sibling appears, leaving nodes on the way.
        loop {
            visitor.tail(tree, node, depth);
            if node == root {
                return;
            }
            if let Some(next) = tree.next_sibling(node) {
                node = next;
                break;
            }
            let Some(parent) = tree.parent(node) else {
                return;
            };
            node = parent;
            depth = depth.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_dom::{Attributes, ElementData, NodeType, Tag};

    struct Recorder(Vec<String>);

    impl NodeVisitor for Recorder {
        fn head(&mut self, tree: &DomTree, node: NodeId, depth: usize) {
            let name = tree.tag_name(node).unwrap_or("#");
            self.0.push(format!("<{name}:{depth}"));
        }

        fn tail(&mut self, tree: &DomTree, node: NodeId, depth: usize) {
            let name = tree.tag_name(node).unwrap_or("#");
            self.0.push(format!(">{name}:{depth}"));
        }
    }

    fn element(tree: &mut DomTree, parent: NodeId, name: &str) -> NodeId {
        let id = tree.alloc(NodeType::Element(ElementData::new(
            Tag::html(name),
            Attributes::new(),
        )));
        tree.append_child(parent, id).unwrap();
        id
    }

    #[test]
    fn head_and_tail_bracket_each_subtree() {
        let mut tree = DomTree::new();
        let div = element(&mut tree, NodeId::ROOT, "div");
        let _ = element(&mut tree, div, "p");
        let _ = element(&mut tree, div, "span");

        let mut recorder = Recorder(Vec::new());
        traverse(&mut recorder, &tree, div);
        assert_eq!(
            recorder.0,
            ["<div:0", "<p:1", ">p:1", "<span:1", ">span:1", ">div:0"]
        );
    }

    #[test]
    fn walk_stays_inside_the_root() {
        let mut tree = DomTree::new();
        let first = element(&mut tree, NodeId::ROOT, "div");
        let _ = element(&mut tree, first, "p");
        let _ = element(&mut tree, NodeId::ROOT, "aside");

        let mut recorder = Recorder(Vec::new());
        traverse(&mut recorder, &tree, first);
        assert_eq!(recorder.0, ["<div:0", "<p:1", ">p:1", ">div:0"]);
    }
}
