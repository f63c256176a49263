//! HTML and XML parsing for sift.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Every tokenizer state, including script data escapes, DOCTYPE
//!     identifiers and CDATA sections
//!   - Named and numeric character references
//!
//! - **HTML Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All 23 insertion modes and the rules for foreign content
//!   - Foster parenting, the adoption agency algorithm and reconstruction of
//!     active formatting elements
//!   - Quirks mode detection and fragment parsing
//!
//! - **XML Tree Builder**: the same tokenizer with no implied structure.
//!
//! # Usage
//!
//! ```
//! let tree = sift_html::parse_document("<p>Hello<p>World", "");
//! assert_eq!(tree.text(tree.root()), "Hello World");
//! ```
//!
//! Parsing never fails. Errors are recorded only when asked for:
//!
//! ```
//! let mut parser = sift_html::Parser::html();
//! let _ = parser.set_track_errors(10);
//! let _tree = parser.parse_input("<p></b>", "");
//! assert!(!parser.errors().is_empty());
//! ```

/// Parse error tracking.
pub mod errors;
/// HTML and XML tree construction.
pub mod parser;
/// Tag and attribute name normalisation.
pub mod settings;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use errors::{ParseError, ParseErrorList};
pub use parser::{HtmlTreeBuilder, InsertionMode, XmlTreeBuilder};
pub use settings::ParseSettings;
pub use tokenizer::{Token, Tokenizer, unescape};

use sift_common::warning::warn_once;
use sift_dom::{Attributes, DomTree, ElementData, NodeId, NodeType, Tag};

/// Which tree builder a [`Parser`] drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavor {
    Html,
    Xml,
}

/// Top-level nodes parsed from a fragment.
///
/// The nodes live in `tree` as children of its Document node, in source order.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// The tree owning the parsed nodes.
    pub tree: DomTree,
    /// The parsed top-level nodes.
    pub nodes: Vec<NodeId>,
}

impl Fragment {
    fn from_tree(tree: DomTree) -> Self {
        let nodes = tree.children(NodeId::ROOT).to_vec();
        Self { tree, nodes }
    }
}

/// A configured parser: which builder to use, how to normalise names and how
/// many errors to keep.
///
/// The errors of the most recent parse stay available through
/// [`errors`](Self::errors) until the next parse.
#[derive(Debug, Clone)]
pub struct Parser {
    flavor: Flavor,
    settings: ParseSettings,
    max_errors: usize,
    verbose: bool,
    errors: ParseErrorList,
}

impl Parser {
    /// An HTML parser with [`ParseSettings::HTML_DEFAULT`].
    #[must_use]
    pub const fn html() -> Self {
        Self::with_flavor(Flavor::Html, ParseSettings::HTML_DEFAULT)
    }

    /// An XML parser with [`ParseSettings::PRESERVE_CASE`].
    #[must_use]
    pub const fn xml() -> Self {
        Self::with_flavor(Flavor::Xml, ParseSettings::PRESERVE_CASE)
    }

    const fn with_flavor(flavor: Flavor, settings: ParseSettings) -> Self {
        Self {
            flavor,
            settings,
            max_errors: 0,
            verbose: false,
            errors: ParseErrorList::no_tracking(),
        }
    }

    /// Replace the name normalisation settings.
    #[must_use]
    pub const fn settings(mut self, settings: ParseSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Print every recorded parse error as a warning after each parse.
    /// Only has an effect while tracking is on.
    #[must_use]
    pub const fn with_verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Keep up to `max` errors per parse; `0` turns tracking off.
    pub const fn set_track_errors(&mut self, max: usize) -> &mut Self {
        self.max_errors = max;
        self
    }

    /// Whether errors are being tracked.
    #[must_use]
    pub const fn is_track_errors(&self) -> bool {
        self.max_errors > 0
    }

    /// The errors from the last parse.
    #[must_use]
    pub const fn errors(&self) -> &ParseErrorList {
        &self.errors
    }

    /// Parse `input` as a complete document.
    pub fn parse_input(&mut self, input: &str, base_uri: &str) -> DomTree {
        let errors = ParseErrorList::tracking(self.max_errors);
        let (tree, errors) = match self.flavor {
            Flavor::Html => HtmlTreeBuilder::new(input, base_uri, self.settings, errors).parse_document(),
            Flavor::Xml => XmlTreeBuilder::new(input, base_uri, self.settings, errors).parse(),
        };
        self.finish(errors);
        tree
    }

    /// Parse `input` as the contents of `context`. HTML uses `body` when no
    /// context is given; XML ignores the context.
    pub fn parse_fragment_input(
        &mut self,
        input: &str,
        context: Option<&ElementData>,
        base_uri: &str,
    ) -> Fragment {
        let errors = ParseErrorList::tracking(self.max_errors);
        let (tree, errors) = match self.flavor {
            Flavor::Html => {
                HtmlTreeBuilder::new(input, base_uri, self.settings, errors).parse_fragment(context)
            }
            Flavor::Xml => XmlTreeBuilder::new(input, base_uri, self.settings, errors).parse(),
        };
        self.finish(errors);
        Fragment::from_tree(tree)
    }

    fn finish(&mut self, errors: ParseErrorList) {
        if self.verbose {
            let component = match self.flavor {
                Flavor::Html => "HTML Parser",
                Flavor::Xml => "XML Parser",
            };
            for error in errors.iter() {
                warn_once(component, &error.to_string());
            }
        }
        self.errors = errors;
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::html()
    }
}

// ====================================================================
// Entry points
// ====================================================================

/// Parse `html` into a document. Never fails; malformed input is repaired the
/// way browsers repair it.
#[must_use]
pub fn parse_document(html: &str, base_uri: &str) -> DomTree {
    Parser::html().parse_input(html, base_uri)
}

/// Parse `html` as the contents of `context`, or of a `body` element when
/// `context` is `None`.
#[must_use]
pub fn parse_fragment(html: &str, context: Option<&ElementData>, base_uri: &str) -> Fragment {
    Parser::html().parse_fragment_input(html, context, base_uri)
}

/// Parse `body_html` as body content and wrap it in an `html` > (`head`,
/// `body`) document shell.
#[must_use]
pub fn parse_body_fragment(body_html: &str, base_uri: &str) -> DomTree {
    let Fragment { mut tree, .. } = parse_fragment(body_html, None, base_uri);

    let html = new_element(&mut tree, "html");
    let head = new_element(&mut tree, "head");
    let body = new_element(&mut tree, "body");
    let wrapped = tree
        .move_children(NodeId::ROOT, body)
        .and_then(|()| tree.append_child(NodeId::ROOT, html))
        .and_then(|()| tree.append_child(html, head))
        .and_then(|()| tree.append_child(html, body));
    if let Err(err) = wrapped {
        warn_once("HTML Parser", &format!("body fragment shell incomplete: {err}"));
    }
    tree
}

fn new_element(tree: &mut DomTree, name: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(
        Tag::html(name),
        Attributes::new(),
    )))
}

/// Parse `xml` into a document with the XML builder.
#[must_use]
pub fn parse_xml_document(xml: &str, base_uri: &str) -> DomTree {
    Parser::xml().parse_input(xml, base_uri)
}

/// Parse `xml` into a list of top-level nodes with the XML builder.
#[must_use]
pub fn parse_xml_fragment(xml: &str, base_uri: &str) -> Fragment {
    Parser::xml().parse_fragment_input(xml, None, base_uri)
}
