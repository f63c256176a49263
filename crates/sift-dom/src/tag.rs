//! The tag registry.
//!
//! Every element carries a [`Tag`] describing how it behaves structurally:
//! whether it is a block, whether it may contain block or inline content,
//! whether it is void, and so on. Known HTML tags are described once in a
//! process-wide table built lazily on first use; unknown names get a generic
//! descriptor that is not a block but may contain one.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use bitflags::bitflags;

bitflags! {
    /// Structural properties of a tag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TagOptions: u16 {
        /// Block-level element (`div`, `p`, `table`).
        const BLOCK = 1 << 0;
        /// Formatted on its own line when pretty-printed.
        const FORMAT_AS_BLOCK = 1 << 1;
        /// May contain block-level children.
        const CAN_CONTAIN_BLOCK = 1 << 2;
        /// May contain inline children.
        const CAN_CONTAIN_INLINE = 1 << 3;
        /// Void element: never has content (`br`, `img`).
        const EMPTY = 1 << 4;
        /// Written with a trailing `/>` in the source.
        const SELF_CLOSING = 1 << 5;
        /// Whitespace inside is significant (`pre`, `textarea`).
        const PRESERVE_WHITESPACE = 1 << 6;
        /// Listed form-associated element.
        const FORM_LIST = 1 << 7;
        /// Value is submitted with its form.
        const FORM_SUBMIT = 1 << 8;
        /// Present in the known-tag registry.
        const KNOWN = 1 << 9;
    }
}

impl TagOptions {
    /// Options of a freshly described block tag, before per-list adjustments.
    const DEFAULT_BLOCK: Self = Self::BLOCK
        .union(Self::FORMAT_AS_BLOCK)
        .union(Self::CAN_CONTAIN_BLOCK)
        .union(Self::CAN_CONTAIN_INLINE);

    /// Options of a name that is not in the registry.
    const UNKNOWN: Self = Self::CAN_CONTAIN_BLOCK
        .union(Self::CAN_CONTAIN_INLINE)
        .union(Self::FORMAT_AS_BLOCK);
}

/// A tag name plus its structural options.
///
/// Equality is by name and options, so two lookups of the same known name
/// always produce equal tags, while an unknown tag that was marked
/// self-closing differs from a plain one of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    name: String,
    normal_name: String,
    options: TagOptions,
}

const BLOCK_TAGS: &[&str] = &[
    "html", "head", "body", "frameset", "script", "noscript", "style", "meta", "link", "title",
    "frame", "noframes", "section", "nav", "aside", "hgroup", "header", "footer", "p", "h1", "h2",
    "h3", "h4", "h5", "h6", "ul", "ol", "pre", "div", "blockquote", "hr", "address", "figure",
    "figcaption", "form", "fieldset", "ins", "del", "s", "dl", "dt", "dd", "li", "table",
    "caption", "thead", "tfoot", "tbody", "colgroup", "col", "tr", "th", "td", "video", "audio",
    "canvas", "details", "menu", "plaintext", "template", "article", "main", "svg", "math",
];

const INLINE_TAGS: &[&str] = &[
    "object", "base", "font", "tt", "i", "b", "u", "big", "small", "em", "strong", "dfn", "code",
    "samp", "kbd", "var", "cite", "abbr", "time", "acronym", "mark", "ruby", "rt", "rp", "a", "img",
    "br", "wbr", "map", "q", "sub", "sup", "bdo", "iframe", "embed", "span", "input", "select",
    "textarea", "label", "button", "optgroup", "option", "legend", "datalist", "keygen", "output",
    "progress", "meter", "area", "param", "source", "track", "summary", "command", "device",
    "basefont", "bgsound", "menuitem", "data", "bdi",
];

const EMPTY_TAGS: &[&str] = &[
    "meta", "link", "base", "frame", "img", "br", "wbr", "embed", "hr", "input", "keygen", "col",
    "command", "device", "area", "basefont", "bgsound", "menuitem", "param", "source", "track",
];

const FORMAT_AS_INLINE_TAGS: &[&str] = &[
    "title", "a", "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "address", "li", "th", "td",
    "script", "style", "ins", "del", "s",
];

// script is absent: its content is a data node, which always keeps whitespace
const PRESERVE_WHITESPACE_TAGS: &[&str] = &["pre", "plaintext", "title", "textarea"];

const FORM_LISTED_TAGS: &[&str] = &[
    "button", "fieldset", "input", "keygen", "object", "output", "select", "textarea",
];

const FORM_SUBMIT_TAGS: &[&str] = &["input", "keygen", "object", "select", "textarea"];

static REGISTRY: LazyLock<HashMap<&'static str, Tag>> = LazyLock::new(|| {
    let mut options: HashMap<&'static str, TagOptions> = HashMap::new();
    for &name in BLOCK_TAGS {
        let _ = options.insert(name, TagOptions::DEFAULT_BLOCK | TagOptions::KNOWN);
    }
    for &name in INLINE_TAGS {
        let _ = options.insert(name, TagOptions::CAN_CONTAIN_INLINE | TagOptions::KNOWN);
    }

    let mut adjust = |names: &[&'static str], set: TagOptions, clear: TagOptions| {
        for name in names {
            if let Some(opts) = options.get_mut(name) {
                opts.insert(set);
                opts.remove(clear);
            }
        }
    };
    adjust(
        EMPTY_TAGS,
        TagOptions::EMPTY,
        TagOptions::CAN_CONTAIN_BLOCK | TagOptions::CAN_CONTAIN_INLINE,
    );
    adjust(FORMAT_AS_INLINE_TAGS, TagOptions::empty(), TagOptions::FORMAT_AS_BLOCK);
    adjust(PRESERVE_WHITESPACE_TAGS, TagOptions::PRESERVE_WHITESPACE, TagOptions::empty());
    adjust(FORM_LISTED_TAGS, TagOptions::FORM_LIST, TagOptions::empty());
    adjust(FORM_SUBMIT_TAGS, TagOptions::FORM_SUBMIT, TagOptions::empty());

    options
        .into_iter()
        .map(|(name, options)| {
            let tag = Tag {
                name: name.to_string(),
                normal_name: name.to_string(),
                options,
            };
            (name, tag)
        })
        .collect()
});

impl Tag {
    /// Look up a tag by name.
    ///
    /// The name is trimmed; lookup in the registry uses its ASCII-lowercased
    /// form. When `preserve_case` is false the returned tag's name is the
    /// lowercased form too. Unknown names produce an unregistered tag.
    #[must_use]
    pub fn value_of(name: &str, preserve_case: bool) -> Self {
        let trimmed = name.trim();
        let normal = trimmed.to_ascii_lowercase();
        let written = if preserve_case { trimmed.to_string() } else { normal.clone() };

        if let Some(known) = REGISTRY.get(normal.as_str()) {
            if written == known.name {
                return known.clone();
            }
            return Self {
                name: written,
                normal_name: normal,
                options: known.options,
            };
        }

        Self {
            name: written,
            normal_name: normal,
            options: TagOptions::UNKNOWN,
        }
    }

    /// Look up a tag by name, lowercasing it.
    #[must_use]
    pub fn html(name: &str) -> Self {
        Self::value_of(name, false)
    }

    /// Check whether `name` is a registered tag.
    #[must_use]
    pub fn is_known_tag(name: &str) -> bool {
        REGISTRY.contains_key(name.to_ascii_lowercase().as_str())
    }

    /// The tag name as it will appear on the element.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ASCII-lowercased tag name, used for matching.
    #[must_use]
    pub fn normal_name(&self) -> &str {
        &self.normal_name
    }

    /// The raw option bits.
    #[must_use]
    pub const fn options(&self) -> TagOptions {
        self.options
    }

    /// Block-level tag.
    #[must_use]
    pub const fn is_block(&self) -> bool {
        self.options.contains(TagOptions::BLOCK)
    }

    /// Not a block-level tag.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        !self.options.contains(TagOptions::BLOCK)
    }

    /// Should be formatted as a block when pretty-printing.
    #[must_use]
    pub const fn format_as_block(&self) -> bool {
        self.options.contains(TagOptions::FORMAT_AS_BLOCK)
    }

    /// May contain block content.
    #[must_use]
    pub const fn can_contain_block(&self) -> bool {
        self.options.contains(TagOptions::CAN_CONTAIN_BLOCK)
    }

    /// Void element.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.options.contains(TagOptions::EMPTY)
    }

    /// Void, or written self-closing in the source.
    #[must_use]
    pub const fn is_self_closing(&self) -> bool {
        self.options.intersects(TagOptions::EMPTY.union(TagOptions::SELF_CLOSING))
    }

    /// Registered in the known-tag table.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        self.options.contains(TagOptions::KNOWN)
    }

    /// Whitespace inside this tag is preserved.
    #[must_use]
    pub const fn preserve_whitespace(&self) -> bool {
        self.options.contains(TagOptions::PRESERVE_WHITESPACE)
    }

    /// Listed form-associated element.
    #[must_use]
    pub const fn is_form_listed(&self) -> bool {
        self.options.contains(TagOptions::FORM_LIST)
    }

    /// Submitted with a form.
    #[must_use]
    pub const fn is_form_submittable(&self) -> bool {
        self.options.contains(TagOptions::FORM_SUBMIT)
    }

    /// Mark an unknown tag as having been written self-closing.
    ///
    /// Known tags are left untouched so they stay equal to the registry entry.
    pub fn set_self_closing(&mut self) {
        if !self.is_known() {
            self.options.insert(TagOptions::SELF_CLOSING);
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tags_share_options() {
        assert_eq!(Tag::html("DIV"), Tag::html("div"));
        assert!(Tag::html("div").is_block());
        assert!(Tag::html("span").is_inline());
        assert!(Tag::html("br").is_empty());
        assert!(Tag::html("br").is_self_closing());
        assert!(!Tag::html("br").can_contain_block());
        assert!(Tag::html("textarea").preserve_whitespace());
        assert!(Tag::html("input").is_form_submittable());
        assert!(Tag::html("fieldset").is_form_listed());
        assert!(!Tag::html("fieldset").is_form_submittable());
    }

    #[test]
    fn unknown_tags_can_contain_block() {
        let tag = Tag::html("custom-widget");
        assert!(!tag.is_known());
        assert!(!tag.is_block());
        assert!(tag.can_contain_block());
        assert!(!Tag::is_known_tag("custom-widget"));
    }

    #[test]
    fn preserve_case_keeps_written_name() {
        let tag = Tag::value_of("FooBar", true);
        assert_eq!(tag.name(), "FooBar");
        assert_eq!(tag.normal_name(), "foobar");
        assert_eq!(Tag::value_of("  P ", false).name(), "p");
    }

    #[test]
    fn self_closing_only_marks_unknown_tags() {
        let mut unknown = Tag::html("thing");
        unknown.set_self_closing();
        assert!(unknown.is_self_closing());
        assert_ne!(unknown, Tag::html("thing"));

        let mut known = Tag::html("div");
        known.set_self_closing();
        assert_eq!(known, Tag::html("div"));
    }
}
