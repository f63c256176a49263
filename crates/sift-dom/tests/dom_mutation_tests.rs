//! Tests for tree mutation and navigation: the sibling-index cache must
//! track every structural change.

use sift_dom::{Attributes, DomTree, ElementData, NodeId, NodeType, Tag};

fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(
        Tag::html(tag),
        Attributes::new(),
    )))
}

/// Parent `div` under the root with children `a`, `b`, `c`.
fn three_children(tree: &mut DomTree) -> (NodeId, [NodeId; 3]) {
    let parent = alloc_element(tree, "div");
    tree.append_child(NodeId::ROOT, parent).unwrap();
    let kids = [
        alloc_element(tree, "a"),
        alloc_element(tree, "b"),
        alloc_element(tree, "c"),
    ];
    for kid in kids {
        tree.append_child(parent, kid).unwrap();
    }
    (parent, kids)
}

/// Every child's cached index equals its position, and its parent link points back.
fn assert_consistent(tree: &DomTree, parent: NodeId) {
    for (index, &child) in tree.children(parent).iter().enumerate() {
        assert_eq!(tree.sibling_index(child), index);
        assert_eq!(tree.parent(child), Some(parent));
    }
}

// ========== remove_child ==========

#[test]
fn test_remove_only_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent).unwrap();
    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child).unwrap();

    tree.remove_child(parent, child);

    assert!(tree.children(parent).is_empty());
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.next_sibling(child), None);
    assert_eq!(tree.prev_sibling(child), None);
}

#[test]
fn test_remove_first_reindexes_rest() {
    let mut tree = DomTree::new();
    let (parent, [a, b, c]) = three_children(&mut tree);

    tree.remove_child(parent, a);

    assert_eq!(tree.children(parent), &[b, c]);
    assert_eq!(tree.sibling_index(b), 0);
    assert_eq!(tree.prev_sibling(b), None);
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_consistent(&tree, parent);
}

#[test]
fn test_remove_middle() {
    let mut tree = DomTree::new();
    let (parent, [a, b, c]) = three_children(&mut tree);

    tree.remove_child(parent, b);

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_consistent(&tree, parent);
}

#[test]
fn test_remove_from_wrong_parent_is_ignored() {
    let mut tree = DomTree::new();
    let (parent, [a, ..]) = three_children(&mut tree);
    let other = alloc_element(&mut tree, "span");

    tree.remove_child(other, a);

    assert_eq!(tree.parent(a), Some(parent));
    assert_eq!(tree.children(parent).len(), 3);
}

// ========== insert_before / prepend ==========

#[test]
fn test_insert_before_first() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent).unwrap();
    let existing = alloc_element(&mut tree, "b");
    tree.append_child(parent, existing).unwrap();

    let fresh = alloc_element(&mut tree, "a");
    tree.insert_before(parent, fresh, existing).unwrap();

    assert_eq!(tree.children(parent), &[fresh, existing]);
    assert_eq!(tree.prev_sibling(existing), Some(fresh));
    assert_consistent(&tree, parent);
}

#[test]
fn test_insert_before_moves_existing_sibling() {
    let mut tree = DomTree::new();
    let (parent, [a, b, c]) = three_children(&mut tree);

    // Moving `a` before `c` detaches it first, shifting `c` left.
    tree.insert_before(parent, a, c).unwrap();

    assert_eq!(tree.children(parent), &[b, a, c]);
    assert_consistent(&tree, parent);
}

#[test]
fn test_insert_before_unknown_reference_appends() {
    let mut tree = DomTree::new();
    let (parent, [a, b, c]) = three_children(&mut tree);
    let stranger = alloc_element(&mut tree, "i");
    let fresh = alloc_element(&mut tree, "u");

    tree.insert_before(parent, fresh, stranger).unwrap();

    assert_eq!(tree.children(parent), &[a, b, c, fresh]);
}

#[test]
fn test_prepend_child() {
    let mut tree = DomTree::new();
    let (parent, [a, b, c]) = three_children(&mut tree);
    let first = alloc_element(&mut tree, "em");

    tree.prepend_child(parent, first).unwrap();

    assert_eq!(tree.children(parent), &[first, a, b, c]);
    assert_eq!(tree.sibling_index(c), 3);
    assert_consistent(&tree, parent);
}

#[test]
fn test_append_reparents() {
    let mut tree = DomTree::new();
    let (parent, [a, b, c]) = three_children(&mut tree);
    let other = alloc_element(&mut tree, "section");
    tree.append_child(NodeId::ROOT, other).unwrap();

    tree.append_child(other, b).unwrap();

    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.children(other), &[b]);
    assert_consistent(&tree, parent);
    assert_consistent(&tree, other);
}

// ========== move_children ==========

#[test]
fn test_move_children_appends_in_order() {
    let mut tree = DomTree::new();
    let (from, [a, b, c]) = three_children(&mut tree);
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, to).unwrap();
    let existing = alloc_element(&mut tree, "x");
    tree.append_child(to, existing).unwrap();

    tree.move_children(from, to).unwrap();

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing, a, b, c]);
    assert_eq!(tree.next_sibling(existing), Some(a));
    assert_consistent(&tree, to);
}

#[test]
fn test_move_children_empty_source() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");

    tree.move_children(from, to).unwrap();

    assert!(tree.children(from).is_empty());
    assert!(tree.children(to).is_empty());
}

// ========== cycles ==========

#[test]
fn test_append_ancestor_under_descendant_is_rejected() {
    let mut tree = DomTree::new();
    let (parent, [a, _, _]) = three_children(&mut tree);
    let inner = alloc_element(&mut tree, "i");
    tree.append_child(a, inner).unwrap();

    assert!(tree.append_child(inner, parent).is_err());
    assert!(tree.append_child(parent, parent).is_err());
    assert!(tree.prepend_child(a, parent).is_err());
    assert!(tree.insert_before(a, parent, inner).is_err());

    // Nothing moved.
    assert_eq!(tree.parent(parent), Some(NodeId::ROOT));
    assert_eq!(tree.ancestors(inner).collect::<Vec<_>>(), vec![a, parent, NodeId::ROOT]);
    assert_consistent(&tree, parent);
}

#[test]
fn test_move_children_into_own_subtree_is_rejected() {
    let mut tree = DomTree::new();
    let (parent, [a, b, c]) = three_children(&mut tree);

    assert!(tree.move_children(parent, a).is_err());
    assert!(tree.move_children(parent, parent).is_err());
    assert_eq!(tree.children(parent), &[a, b, c]);
    assert!(tree.children(a).is_empty());
}

#[test]
fn test_moving_a_subtree_elsewhere_is_allowed() {
    let mut tree = DomTree::new();
    let (parent, [a, b, _]) = three_children(&mut tree);
    let inner = alloc_element(&mut tree, "i");
    tree.append_child(a, inner).unwrap();

    tree.append_child(b, a).unwrap();

    assert_eq!(tree.ancestors(inner).collect::<Vec<_>>(), vec![a, b, parent, NodeId::ROOT]);
    assert_consistent(&tree, parent);
    assert_consistent(&tree, b);
}

// ========== navigation ==========

#[test]
fn test_descendants_are_pre_order() {
    let mut tree = DomTree::new();
    let (parent, [a, b, c]) = three_children(&mut tree);
    let inner = alloc_element(&mut tree, "i");
    tree.append_child(a, inner).unwrap();

    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![NodeId::ROOT, parent, a, inner, b, c]);
}

#[test]
fn test_ancestors_and_siblings() {
    let mut tree = DomTree::new();
    let (parent, [a, b, c]) = three_children(&mut tree);
    let inner = alloc_element(&mut tree, "i");
    tree.append_child(b, inner).unwrap();

    assert_eq!(
        tree.ancestors(inner).collect::<Vec<_>>(),
        vec![b, parent, NodeId::ROOT]
    );
    assert!(tree.is_descendant_of(inner, parent));
    assert!(!tree.is_descendant_of(parent, inner));
    assert_eq!(tree.preceding_siblings(c).collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(tree.following_siblings(a).collect::<Vec<_>>(), vec![b, c]);
}

#[test]
fn test_element_children_skip_text() {
    let mut tree = DomTree::new();
    let (parent, [a, b, c]) = three_children(&mut tree);
    let text = tree.create_text("between");
    tree.insert_before(parent, text, b).unwrap();

    assert_eq!(tree.children(parent).len(), 4);
    assert_eq!(tree.element_children(parent).collect::<Vec<_>>(), vec![a, b, c]);
    assert_eq!(tree.document_element(), Some(parent));
}

// ========== text ==========

#[test]
fn test_text_separates_blocks_and_collapses() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, div).unwrap();
    let hello = tree.create_text("  Hello\n\n ");
    let p = alloc_element(&mut tree, "p");
    let world = tree.create_text("world  ");
    let span = alloc_element(&mut tree, "span");
    let tail = tree.create_text("again");
    tree.append_child(div, hello).unwrap();
    tree.append_child(div, p).unwrap();
    tree.append_child(p, world).unwrap();
    tree.append_child(div, span).unwrap();
    tree.append_child(span, tail).unwrap();

    assert_eq!(tree.text(div), "Hello world again");
    assert_eq!(tree.own_text(div), "Hello");
    assert!(tree.has_text(span));
}

#[test]
fn test_text_keeps_pre_whitespace() {
    let mut tree = DomTree::new();
    let pre = alloc_element(&mut tree, "pre");
    let code = tree.create_text("a  \n  b");
    tree.append_child(pre, code).unwrap();

    assert_eq!(tree.text(pre), "a  \n  b");
}

#[test]
fn test_data_is_not_text() {
    let mut tree = DomTree::new();
    let script = alloc_element(&mut tree, "script");
    let body = tree.alloc(NodeType::Data("var x = 1;".into()));
    tree.append_child(script, body).unwrap();

    assert_eq!(tree.text(script), "");
    assert_eq!(tree.data(script), "var x = 1;");
}
