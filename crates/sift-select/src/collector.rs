//! Running compiled selectors over a tree.

use std::collections::HashSet;

use sift_dom::{DomTree, NodeId};

use crate::error::SelectorParseError;
use crate::evaluator::{Evaluator, PositionCache};
use crate::query_parser::QueryParser;
use crate::traversal::{NodeVisitor, traverse};

/// Gathers the elements an evaluator accepts, in the order they are entered.
struct Accumulator<'e> {
    evaluator: &'e Evaluator,
    root: NodeId,
    positions: &'e PositionCache,
    found: Vec<NodeId>,
}

impl NodeVisitor for Accumulator<'_> {
    fn head(&mut self, tree: &DomTree, node: NodeId, _depth: usize) {
        if tree.as_element(node).is_some()
            && self
                .evaluator
                .matches_with(tree, self.root, node, self.positions)
        {
            self.found.push(node);
        }
    }
}

fn accumulate(
    evaluator: &Evaluator,
    tree: &DomTree,
    root: NodeId,
    positions: &PositionCache,
) -> Vec<NodeId> {
    let mut accumulator = Accumulator {
        evaluator,
        root,
        positions,
        found: Vec::new(),
    };
    traverse(&mut accumulator, tree, root);
    accumulator.found
}

/// Every element under `root`, `root` included, that `evaluator` matches.
/// Results are in document order. Sibling positions are worked out once per
/// parent for the whole walk.
#[must_use]
pub fn collect(evaluator: &Evaluator, tree: &DomTree, root: NodeId) -> Vec<NodeId> {
    accumulate(evaluator, tree, root, &PositionCache::new())
}

/// Compile `query` and [`collect`] its matches under `root`.
///
/// # Errors
///
/// Returns the [`SelectorParseError`] from compiling `query`.
pub fn select(query: &str, tree: &DomTree, root: NodeId) -> Result<Vec<NodeId>, SelectorParseError> {
    let evaluator = QueryParser::compile(query)?;
    Ok(collect(&evaluator, tree, root))
}

/// [`collect`] under each of `roots` in turn. An element reached from more
/// than one root is reported once, at its first sighting.
#[must_use]
pub fn select_all(evaluator: &Evaluator, tree: &DomTree, roots: &[NodeId]) -> Vec<NodeId> {
    let positions = PositionCache::new();
    let mut seen = HashSet::new();
    roots
        .iter()
        .flat_map(|&root| accumulate(evaluator, tree, root, &positions))
        .filter(|&element| seen.insert(element))
        .collect()
}

/// The members of `elements` that `evaluator` does not match from `root`.
#[must_use]
pub fn filter_out(
    evaluator: &Evaluator,
    tree: &DomTree,
    root: NodeId,
    elements: &[NodeId],
) -> Vec<NodeId> {
    let positions = PositionCache::new();
    elements
        .iter()
        .copied()
        .filter(|&element| !evaluator.matches_with(tree, root, element, &positions))
        .collect()
}

/// Whether `element` matches `evaluator`, evaluated from the top of the tree
/// `element` is attached to.
#[must_use]
pub fn is(evaluator: &Evaluator, tree: &DomTree, element: NodeId) -> bool {
    let top = tree.ancestors(element).last().unwrap_or(element);
    evaluator.matches(tree, top, element)
}
