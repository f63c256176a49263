//! Selector queries over sift trees.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector compiler** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, namespace, universal, ID and class selectors
//!   - Attribute presence, prefix-of-key, equality, inequality, prefix, suffix,
//!     substring and regex matches
//!   - Descendant, child, next-sibling and subsequent-sibling combinators and
//!     selector lists
//!   - Structural pseudo-classes with the `An+B` microsyntax, index
//!     pseudo-classes, `:has`, `:not` and text and regex matches
//!
//! - **Collector**: document-order evaluation over a subtree
//!
//! # Usage
//!
//! ```
//! let tree = sift_html::parse_document("<div><p class=note>a</p><p>b</p></div>", "");
//! let notes = sift_select::select("div > p.note", &tree, tree.root()).unwrap();
//! assert_eq!(notes.len(), 1);
//! assert_eq!(tree.text(notes[0]), "a");
//! ```
//!
//! A compiled [`Evaluator`] holds no mutable state and can be reused across
//! trees and threads:
//!
//! ```
//! let odd = sift_select::compile_selector("li:nth-child(odd)").unwrap();
//! let tree = sift_html::parse_document("<ul><li>1<li>2<li>3</ul>", "");
//! assert_eq!(sift_select::collect(&odd, &tree, tree.root()).len(), 2);
//! ```

/// Running compiled selectors over a tree.
pub mod collector;
/// Selector compilation errors.
pub mod error;
/// Compiled selector predicates.
pub mod evaluator;
/// The selector compiler.
pub mod query_parser;
mod token_queue;
/// Depth-first tree walking.
pub mod traversal;

pub use collector::{collect, filter_out, is, select, select_all};
pub use error::SelectorParseError;
pub use evaluator::{Evaluator, NthKind, PositionCache};
pub use query_parser::QueryParser;
pub use traversal::{NodeVisitor, traverse};

/// Compile `query` into an [`Evaluator`].
///
/// # Errors
///
/// Returns a [`SelectorParseError`] describing the first syntax problem.
pub fn compile_selector(query: &str) -> Result<Evaluator, SelectorParseError> {
    QueryParser::compile(query)
}
