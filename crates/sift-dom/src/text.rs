//! Text extraction.
//!
//! `text` gathers the visible text of a subtree the way a reader would see
//! it: runs of whitespace collapse to one space, block elements and `br`
//! separate words, and content of whitespace-preserving elements (`pre`,
//! `textarea`) is kept as written. `Data` nodes (script and style bodies)
//! never contribute.

use crate::{DomTree, NodeId, NodeType};

/// HTML whitespace: space, tab, LF, FF, CR.
#[must_use]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\u{000C}' | '\r')
}

/// Whether `s` is empty or entirely HTML whitespace.
#[must_use]
pub fn is_blank(s: &str) -> bool {
    s.chars().all(is_whitespace)
}

/// Collapse every run of whitespace to a single space. Not trimmed.
#[must_use]
pub fn normalise_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    append_normalised(&mut out, s, false);
    out
}

/// Append `s` to `accum` with whitespace runs collapsed. With
/// `strip_leading`, leading whitespace is dropped entirely.
fn append_normalised(accum: &mut String, s: &str, strip_leading: bool) {
    let mut last_was_white = false;
    let mut reached_non_white = false;
    for c in s.chars() {
        if is_whitespace(c) {
            if (strip_leading && !reached_non_white) || last_was_white {
                continue;
            }
            accum.push(' ');
            last_was_white = true;
        } else {
            accum.push(c);
            last_was_white = false;
            reached_non_white = true;
        }
    }
}

fn ends_with_whitespace(s: &str) -> bool {
    s.ends_with(' ')
}

impl DomTree {
    /// Whether whitespace in a text child of `id` should be kept verbatim.
    fn preserves_whitespace(&self, id: NodeId) -> bool {
        let keeps = |node: NodeId| {
            self.as_element(node)
                .is_some_and(|el| el.tag.preserve_whitespace())
        };
        keeps(id) || self.parent(id).is_some_and(keeps)
    }

    fn append_text_node(&self, accum: &mut String, parent: NodeId, text: &str) {
        if self.preserves_whitespace(parent) {
            accum.push_str(text);
        } else {
            let strip = accum.is_empty() || ends_with_whitespace(accum);
            append_normalised(accum, text, strip);
        }
    }

    /// The combined, normalised text of `id` and all its descendants.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        let mut accum = String::new();
        for node in self.descendants(id) {
            match self.get(node).map(|n| &n.node_type) {
                Some(NodeType::Text(text)) => {
                    let parent = self.parent(node).unwrap_or(id);
                    self.append_text_node(&mut accum, parent, text);
                }
                Some(NodeType::Element(el)) => {
                    if !accum.is_empty()
                        && (el.tag.is_block() || el.normal_name() == "br")
                        && !ends_with_whitespace(&accum)
                    {
                        accum.push(' ');
                    }
                }
                _ => {}
            }
        }
        accum.trim().to_string()
    }

    /// The normalised text of `id`'s direct text children only.
    #[must_use]
    pub fn own_text(&self, id: NodeId) -> String {
        let mut accum = String::new();
        for &child in self.children(id) {
            match self.get(child).map(|n| &n.node_type) {
                Some(NodeType::Text(text)) => self.append_text_node(&mut accum, id, text),
                Some(NodeType::Element(el))
                    if el.normal_name() == "br" && !ends_with_whitespace(&accum) =>
                {
                    accum.push(' ');
                }
                _ => {}
            }
        }
        accum.trim().to_string()
    }

    /// Whether `id` has any non-blank text in its subtree.
    #[must_use]
    pub fn has_text(&self, id: NodeId) -> bool {
        self.descendants(id)
            .filter_map(|node| self.as_text(node))
            .any(|text| !is_blank(text))
    }

    /// Concatenated content of the `Data` children of `id` (script and style bodies).
    #[must_use]
    pub fn data(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|&child| match self.get(child).map(|n| &n.node_type) {
                Some(NodeType::Data(data)) => Some(data.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs() {
        assert_eq!(normalise_whitespace(" a \t\n b  "), " a b ");
        assert!(is_blank(" \n\t"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn nbsp_is_content() {
        assert_eq!(normalise_whitespace("a\u{a0}\u{a0}b"), "a\u{a0}\u{a0}b");
    }
}
