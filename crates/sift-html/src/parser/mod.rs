//! Tree construction.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! [`HtmlTreeBuilder`] runs the HTML insertion modes; the mode handlers are
//! split across the files below by the section of the standard they follow.
//! [`XmlTreeBuilder`] is the HTML-unaware builder used for XML input.

mod core;
mod foreign;
/// SVG and MathML name adjustment and integration points.
pub mod foreign_content;
mod formatting;
mod head_modes;
mod in_body;
mod nodes;
mod other_modes;
/// Document mode detection from the DOCTYPE.
pub mod quirks;
mod stack;
mod table_modes;
/// The XML tree builder.
pub mod xml;

pub use self::core::{ActiveFormattingElement, HtmlTreeBuilder, InsertionMode};
pub use xml::XmlTreeBuilder;
