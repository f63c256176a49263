//! Compiled selector predicates.
//!
//! A query compiles into a tree of [`Evaluator`]s. Leaves look at a single
//! element; structural variants walk to its parent, ancestors or preceding
//! siblings and test them with a nested evaluator. Every variant holds only
//! literal data, so a compiled tree can be shared freely between threads.

use std::cell::RefCell;
use std::collections::HashMap;

use regex::Regex;
use sift_dom::{DomTree, ElementData, NodeId, NodeType};

/// Which sibling position an `:nth-*` evaluator counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NthKind {
    /// `:nth-child`: position among all element siblings, from the first.
    Child,
    /// `:nth-last-child`: position among all element siblings, from the last.
    LastChild,
    /// `:nth-of-type`: position among same-tag siblings, from the first.
    OfType,
    /// `:nth-last-of-type`: position among same-tag siblings, from the last.
    LastOfType,
}

/// A compiled selector predicate.
#[derive(Debug, Clone)]
pub enum Evaluator {
    /// `*`
    AllElements,
    /// `tag`: normal name equals the lowercased name.
    Tag(String),
    /// `*|tag`: normal name ends with `:tag`.
    TagEndsWith(String),
    /// `#id`
    Id(String),
    /// `.class`, compared ignoring ASCII case.
    Class(String),
    /// `[key]`
    Attribute(String),
    /// `[^prefix]`: some attribute key starts with the prefix.
    AttributeStarting(String),
    /// `[key=value]`, value compared ignoring case.
    AttributeWithValue(String, String),
    /// `[key!=value]`. Also true when the attribute is missing.
    AttributeWithValueNot(String, String),
    /// `[key^=value]`
    AttributeWithValueStarting(String, String),
    /// `[key$=value]`
    AttributeWithValueEnding(String, String),
    /// `[key*=value]`
    AttributeWithValueContaining(String, String),
    /// `[key~=regex]`
    AttributeWithValueMatching(String, Regex),
    /// `:lt(n)`: zero-based element sibling index below `n`.
    IndexLessThan(usize),
    /// `:gt(n)`
    IndexGreaterThan(usize),
    /// `:eq(n)`
    IndexEquals(usize),
    /// `:root`
    IsRoot,
    /// `:first-child`
    IsFirstChild,
    /// `:last-child`
    IsLastChild,
    /// `:only-child`
    IsOnlyChild,
    /// `:only-of-type`
    IsOnlyOfType,
    /// `:empty`
    IsEmpty,
    /// `:nth-child(an+b)` and friends. `:first-of-type` is `OfType` with `(0, 1)`.
    Nth {
        /// What to count.
        kind: NthKind,
        /// Step.
        a: i32,
        /// Offset.
        b: i32,
    },
    /// `:contains(text)`, lowercased needle.
    ContainsText(String),
    /// `:containsOwn(text)`, lowercased needle.
    ContainsOwnText(String),
    /// `:containsData(text)`, lowercased needle.
    ContainsData(String),
    /// `:matches(regex)`
    Matches(Regex),
    /// `:matchesOwn(regex)`
    MatchesOwn(Regex),
    /// `:has(selector)`: some descendant matches, evaluated with the candidate
    /// as root.
    Has(Box<Evaluator>),
    /// `:not(selector)`
    Not(Box<Evaluator>),
    /// `A B`: some ancestor up to the evaluation root matches.
    Parent(Box<Evaluator>),
    /// `A > B`: the parent matches.
    ImmediateParent(Box<Evaluator>),
    /// `A ~ B`: some preceding element sibling matches.
    PreviousSibling(Box<Evaluator>),
    /// `A + B`: the previous element sibling matches.
    ImmediatePreviousSibling(Box<Evaluator>),
    /// The evaluation root itself. Anchors queries that open with a combinator.
    Root,
    /// Every child matches. Built through [`Evaluator::and`].
    And(Vec<Evaluator>),
    /// Any child matches.
    Or(Vec<Evaluator>),
}

impl Evaluator {
    /// Conjunction of `evaluators`, flattened and ordered cheapest first.
    #[must_use]
    pub fn and(evaluators: Vec<Self>) -> Self {
        let mut flat = Vec::with_capacity(evaluators.len());
        for evaluator in evaluators {
            match evaluator {
                Self::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1
            && let Some(only) = flat.pop()
        {
            return only;
        }
        flat.sort_by_key(Self::cost);
        Self::And(flat)
    }

    /// Relative cost of one evaluation. Lower runs first inside [`And`](Self::And).
    #[must_use]
    pub fn cost(&self) -> u32 {
        match self {
            Self::AllElements | Self::Tag(_) | Self::Root | Self::IsRoot => 1,
            Self::TagEndsWith(_)
            | Self::Id(_)
            | Self::Attribute(_)
            | Self::IndexLessThan(_)
            | Self::IndexGreaterThan(_)
            | Self::IndexEquals(_)
            | Self::Nth { .. } => 2,
            Self::AttributeWithValue(..)
            | Self::AttributeWithValueNot(..)
            | Self::AttributeWithValueStarting(..)
            | Self::AttributeWithValueEnding(..)
            | Self::IsFirstChild
            | Self::IsLastChild
            | Self::IsEmpty => 3,
            Self::IsOnlyChild | Self::IsOnlyOfType => 4,
            Self::Class(_)
            | Self::AttributeStarting(_)
            | Self::AttributeWithValueContaining(..) => 6,
            Self::AttributeWithValueMatching(..) | Self::Matches(_) | Self::MatchesOwn(_) => 8,
            Self::ContainsText(_) | Self::ContainsOwnText(_) | Self::ContainsData(_) => 10,
            Self::Not(inner) => 2 + inner.cost(),
            Self::ImmediateParent(inner) | Self::ImmediatePreviousSibling(inner) => 1 + inner.cost(),
            Self::Has(inner) | Self::Parent(inner) | Self::PreviousSibling(inner) => {
                10 * inner.cost()
            }
            Self::And(all) | Self::Or(all) => all.iter().map(Self::cost).sum(),
        }
    }

    /// Whether `element` matches, with `root` as the node the query runs
    /// from. Non-element nodes never match, except that [`Root`](Self::Root)
    /// accepts the root itself even when it is the Document.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, root: NodeId, element: NodeId) -> bool {
        self.matches_with(tree, root, element, &PositionCache::new())
    }

    /// [`matches`](Self::matches), reading sibling positions from `positions`.
    /// Share one cache across a whole run over an unchanged tree.
    #[must_use]
    pub fn matches_with(
        &self,
        tree: &DomTree,
        root: NodeId,
        element: NodeId,
        positions: &PositionCache,
    ) -> bool {
        if let Self::Root = self {
            return element == root;
        }
        let Some(data) = tree.as_element(element) else {
            return false;
        };

        match self {
            // [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
            Self::AllElements => true,

            // [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
            Self::Tag(name) => data.normal_name() == name,
            Self::TagEndsWith(suffix) => data.normal_name().ends_with(suffix.as_str()),

            // [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
            Self::Id(id) => data.id() == Some(id.as_str()),

            // [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
            Self::Class(class) => data.has_class(class),

            // [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
            Self::Attribute(key) => data.attrs.has_key_ignore_case(key),
            Self::AttributeStarting(prefix) => data
                .attrs
                .iter()
                .any(|attr| attr.key().to_ascii_lowercase().starts_with(prefix.as_str())),
            Self::AttributeWithValue(key, value) => {
                attr_value(data, key).is_some_and(|v| v.trim().to_lowercase() == *value)
            }
            Self::AttributeWithValueNot(key, value) => {
                !attr_value(data, key).is_some_and(|v| v.to_lowercase() == *value)
            }
            Self::AttributeWithValueStarting(key, value) => attr_value(data, key)
                .is_some_and(|v| v.to_lowercase().starts_with(value.as_str())),
            Self::AttributeWithValueEnding(key, value) => attr_value(data, key)
                .is_some_and(|v| v.to_lowercase().ends_with(value.as_str())),
            Self::AttributeWithValueContaining(key, value) => attr_value(data, key)
                .is_some_and(|v| v.to_lowercase().contains(value.as_str())),
            Self::AttributeWithValueMatching(key, pattern) => {
                attr_value(data, key).is_some_and(|v| pattern.is_match(v))
            }

            Self::IndexLessThan(index) => {
                root != element && positions.get(tree, element).index < *index
            }
            Self::IndexGreaterThan(index) => positions.get(tree, element).index > *index,
            Self::IndexEquals(index) => positions.get(tree, element).index == *index,

            // [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
            // "The :root pseudo-class represents an element that is the root of the document."
            // A query run from a subtree treats the subtree root as the document root.
            Self::IsRoot => {
                let document_root = if is_document(tree, root) {
                    tree.element_children(root).next()
                } else {
                    Some(root)
                };
                document_root == Some(element)
            }

            // [§ 14.4.1 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
            // "Same as :nth-child(1). The :first-child pseudo-class represents an
            // element that is first among its inclusive siblings."
            Self::IsFirstChild => {
                has_element_parent(tree, element) && positions.get(tree, element).index == 0
            }

            // [§ 14.4.2 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
            Self::IsLastChild => {
                has_element_parent(tree, element) && positions.get(tree, element).from_last == 0
            }

            // [§ 14.4.3 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
            // "Same as :first-child:last-child"
            Self::IsOnlyChild => {
                let position = positions.get(tree, element);
                has_element_parent(tree, element) && position.index == 0 && position.from_last == 0
            }

            // [§ 14.5.3 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
            Self::IsOnlyOfType => {
                let position = positions.get(tree, element);
                has_element_parent(tree, element)
                    && position.of_type == 0
                    && position.of_type_from_last == 0
            }

            // [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
            // "The :empty pseudo-class represents an element that has no children
            // except, optionally, document white space characters."
            // Any text node counts as content here, whitespace included.
            Self::IsEmpty => tree.children(element).iter().all(|&child| {
                matches!(
                    tree.get(child).map(|n| &n.node_type),
                    Some(NodeType::Comment(_) | NodeType::Doctype(_) | NodeType::XmlDeclaration(_))
                )
            }),

            // [§ 14.4.4 :nth-child()](https://www.w3.org/TR/selectors-4/#the-nth-child-pseudo)
            // "The :nth-child(An+B) pseudo-class notation represents elements that
            // are among An+Bth elements from the list composed of their inclusive
            // siblings"
            Self::Nth { kind, a, b } => {
                has_element_parent(tree, element)
                    && nth_matches(
                        i64::from(*a),
                        i64::from(*b),
                        positions.get(tree, element).nth(*kind),
                    )
            }

            Self::ContainsText(needle) => tree.text(element).to_lowercase().contains(needle.as_str()),
            Self::ContainsOwnText(needle) => {
                tree.own_text(element).to_lowercase().contains(needle.as_str())
            }
            Self::ContainsData(needle) => tree.data(element).to_lowercase().contains(needle.as_str()),
            Self::Matches(pattern) => pattern.is_match(&tree.text(element)),
            Self::MatchesOwn(pattern) => pattern.is_match(&tree.own_text(element)),

            // [§ 4.5 :has()](https://www.w3.org/TR/selectors-4/#relational)
            // "represents an element if any of the relative selectors ... would
            // match at least one element when anchored against this element."
            Self::Has(inner) => tree
                .descendants(element)
                .skip(1)
                .any(|descendant| inner.matches_with(tree, element, descendant, positions)),

            // [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
            Self::Not(inner) => !inner.matches_with(tree, root, element, positions),

            // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
            // "A selector of the form 'A B' represents an element B that is an
            // arbitrary descendant of some ancestor element A."
            Self::Parent(inner) => {
                if element == root {
                    return false;
                }
                for ancestor in tree.ancestors(element) {
                    if inner.matches_with(tree, root, ancestor, positions) {
                        return true;
                    }
                    if ancestor == root {
                        break;
                    }
                }
                false
            }

            // [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
            Self::ImmediateParent(inner) => {
                element != root
                    && tree
                        .parent(element)
                        .is_some_and(|parent| inner.matches_with(tree, root, parent, positions))
            }

            // [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
            Self::PreviousSibling(inner) => {
                element != root
                    && tree
                        .preceding_siblings(element)
                        .any(|sibling| inner.matches_with(tree, root, sibling, positions))
            }

            // [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
            Self::ImmediatePreviousSibling(inner) => {
                element != root
                    && previous_element_sibling(tree, element)
                        .is_some_and(|sibling| inner.matches_with(tree, root, sibling, positions))
            }

            Self::Root => element == root,

            Self::And(all) => all.iter().all(|e| e.matches_with(tree, root, element, positions)),
            Self::Or(any) => any.iter().any(|e| e.matches_with(tree, root, element, positions)),
        }
    }
}

fn attr_value<'a>(data: &'a ElementData, key: &str) -> Option<&'a str> {
    data.attrs
        .get(key)
        .or_else(|| data.attrs.get_ignore_case(key).ok().flatten())
}

fn is_document(tree: &DomTree, id: NodeId) -> bool {
    matches!(tree.get(id).map(|n| &n.node_type), Some(NodeType::Document))
}

/// Structural pseudo-classes only apply below the document element.
fn has_element_parent(tree: &DomTree, element: NodeId) -> bool {
    tree.parent(element).is_some_and(|parent| !is_document(tree, parent))
}

fn previous_element_sibling(tree: &DomTree, element: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(element)
        .find(|&sibling| tree.as_element(sibling).is_some())
}

// ====================================================================
// Sibling positions
// ====================================================================

/// Where an element sits among its element siblings. All counts are
/// zero-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Position {
    index: usize,
    from_last: usize,
    of_type: usize,
    of_type_from_last: usize,
}

impl Position {
    /// One-based position for an `:nth-*` evaluator.
    fn nth(self, kind: NthKind) -> i64 {
        let count = match kind {
            NthKind::Child => self.index,
            NthKind::LastChild => self.from_last,
            NthKind::OfType => self.of_type,
            NthKind::LastOfType => self.of_type_from_last,
        };
        i64::try_from(count).map_or(i64::MAX, |count| count + 1)
    }
}

/// Element-sibling positions for one run of a query.
///
/// The first lookup under a parent records the position of every element
/// child of that parent in one pass; later lookups are map reads. The cache
/// assumes the tree does not change while it is in use.
#[derive(Debug, Default)]
pub struct PositionCache {
    positions: RefCell<HashMap<NodeId, Position>>,
}

impl PositionCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, tree: &DomTree, element: NodeId) -> Position {
        let cached = self.positions.borrow().get(&element).copied();
        if let Some(position) = cached {
            return position;
        }
        let Some(parent) = tree.parent(element) else {
            return Position::default();
        };
        self.fill(tree, parent);
        self.positions.borrow().get(&element).copied().unwrap_or_default()
    }

    fn fill(&self, tree: &DomTree, parent: NodeId) {
        let siblings: Vec<(NodeId, &str)> = tree
            .element_children(parent)
            .filter_map(|id| tree.as_element(id).map(|el| (id, el.normal_name())))
            .collect();
        let mut totals: HashMap<&str, usize> = HashMap::new();
        for &(_, name) in &siblings {
            *totals.entry(name).or_default() += 1;
        }

        let last = siblings.len().saturating_sub(1);
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut positions = self.positions.borrow_mut();
        for (index, &(id, name)) in siblings.iter().enumerate() {
            let seen_of_type = seen.entry(name).or_default();
            let of_type = *seen_of_type;
            *seen_of_type += 1;
            let total = totals.get(name).copied().unwrap_or(1);
            let _ = positions.insert(
                id,
                Position {
                    index,
                    from_last: last - index,
                    of_type,
                    of_type_from_last: total.saturating_sub(of_type + 1),
                },
            );
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.positions.borrow().len()
    }
}

/// [§ 13 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// "The An+B notation defines an integer step (A) and offset (B), and
/// represents the An+Bth elements in a list, for every positive integer or
/// zero value of n"
const fn nth_matches(a: i64, b: i64, position: i64) -> bool {
    if a == 0 {
        return position == b;
    }
    let offset = position - b;
    (offset == 0 || (offset > 0) == (a > 0)) && offset % a == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nth_formula_positions() {
        let odd: Vec<i64> = (1..=6).filter(|&p| nth_matches(2, 1, p)).collect();
        assert_eq!(odd, vec![1, 3, 5]);

        let first_three: Vec<i64> = (1..=6).filter(|&p| nth_matches(-1, 3, p)).collect();
        assert_eq!(first_three, vec![1, 2, 3]);

        assert!((1..=10).all(|p| !nth_matches(0, 0, p)));
        assert!(nth_matches(0, 4, 4));
    }

    #[test]
    fn and_flattens_and_orders_by_cost() {
        let evaluator = Evaluator::and(vec![
            Evaluator::ContainsText("x".to_string()),
            Evaluator::and(vec![Evaluator::Class("a".to_string()), Evaluator::Tag("p".to_string())]),
        ]);
        let Evaluator::And(parts) = evaluator else {
            panic!("expected a conjunction");
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[0], Evaluator::Tag(_)));
        assert!(matches!(parts[2], Evaluator::ContainsText(_)));
    }

    #[test]
    fn single_child_and_unwraps() {
        assert!(matches!(
            Evaluator::and(vec![Evaluator::Id("x".to_string())]),
            Evaluator::Id(_)
        ));
    }

    #[test]
    fn one_lookup_records_every_sibling() {
        let tree = sift_html::parse_body_fragment("<p>a</p>text<span></span><p>b</p><p>c</p>", "");
        let body = tree.body().unwrap();
        let children: Vec<NodeId> = tree.element_children(body).collect();
        let cache = PositionCache::new();

        let middle = cache.get(&tree, children[2]);
        assert_eq!(cache.len(), 4);
        assert_eq!(
            middle,
            Position {
                index: 2,
                from_last: 1,
                of_type: 1,
                of_type_from_last: 1,
            }
        );
        let span = cache.get(&tree, children[1]);
        assert_eq!((span.of_type, span.of_type_from_last), (0, 0));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn positions_feed_nth_kinds() {
        let position = Position {
            index: 4,
            from_last: 0,
            of_type: 2,
            of_type_from_last: 0,
        };
        assert_eq!(position.nth(NthKind::Child), 5);
        assert_eq!(position.nth(NthKind::LastChild), 1);
        assert_eq!(position.nth(NthKind::OfType), 3);
        assert_eq!(position.nth(NthKind::LastOfType), 1);
    }

    #[test]
    fn root_matches_a_document_root() {
        let tree = sift_html::parse_document("<p>x</p>", "");
        assert!(Evaluator::Root.matches(&tree, tree.root(), tree.root()));
        let html = tree.document_element().unwrap();
        assert!(Evaluator::ImmediateParent(Box::new(Evaluator::Root)).matches(&tree, tree.root(), html));
    }
}
