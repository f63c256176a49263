use core::fmt;

use sift_dom::{Attribute, Attributes};

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the
/// following tokens: DOCTYPE, start tag, end tag, comment, character,
/// end-of-file."
///
/// Consecutive characters are emitted as one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// "DOCTYPE tokens have a name, a public identifier, a system identifier,
    /// and a force-quirks flag."
    ///
    /// Missing identifiers are `None`, which is distinct from the empty string.
    Doctype {
        /// "a name"
        name: Option<String>,
        /// "a public identifier"
        public_id: Option<String>,
        /// "a system identifier"
        system_id: Option<String>,
        /// "a force-quirks flag"
        force_quirks: bool,
    },

    /// "Start and end tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes"
    StartTag {
        /// The tag name as written.
        name: String,
        /// ASCII-lowercased name, used for all matching.
        normal_name: String,
        /// "a list of attributes", in source order, first occurrence wins.
        attributes: Attributes,
        /// "a self-closing flag"
        self_closing: bool,
    },

    /// End tag. Attributes on end tags are a parse error and are dropped.
    EndTag {
        /// The tag name as written.
        name: String,
        /// ASCII-lowercased name.
        normal_name: String,
    },

    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        text: String,
        /// Produced by the bogus comment state (`<?xml ...>`, `<!foo>`).
        bogus: bool,
    },

    /// A run of characters.
    Character {
        /// "data"
        text: String,
    },

    /// End-of-file token signals the end of input.
    EndOfFile,
}

impl Token {
    /// Start tag with no attributes.
    #[must_use]
    pub fn start_tag(name: &str) -> Self {
        Self::StartTag {
            name: name.to_string(),
            normal_name: name.to_ascii_lowercase(),
            attributes: Attributes::new(),
            self_closing: false,
        }
    }

    /// End tag.
    #[must_use]
    pub fn end_tag(name: &str) -> Self {
        Self::EndTag {
            name: name.to_string(),
            normal_name: name.to_ascii_lowercase(),
        }
    }

    /// Character run.
    #[must_use]
    pub fn character(text: &str) -> Self {
        Self::Character {
            text: text.to_string(),
        }
    }

    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    /// Whether this is a start tag whose normal name is `tag`.
    #[must_use]
    pub fn is_start_tag(&self, tag: &str) -> bool {
        matches!(self, Self::StartTag { normal_name, .. } if normal_name == tag)
    }

    /// Whether this is an end tag whose normal name is `tag`.
    #[must_use]
    pub fn is_end_tag(&self, tag: &str) -> bool {
        matches!(self, Self::EndTag { normal_name, .. } if normal_name == tag)
    }

    /// Normal name of a start or end tag.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { normal_name, .. } | Self::EndTag { normal_name, .. } => {
                Some(normal_name)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype { name, .. } => {
                write!(f, "<!doctype {}>", name.as_deref().unwrap_or_default())
            }
            Self::StartTag {
                name, attributes, ..
            } => write!(f, "<{name}{attributes}>"),
            Self::EndTag { name, .. } => write!(f, "</{name}>"),
            Self::Comment { text, .. } => write!(f, "<!--{text}-->"),
            Self::Character { text } => f.write_str(text),
            Self::EndOfFile => f.write_str("EOF"),
        }
    }
}

/// Tag under construction by the tokenizer.
#[derive(Debug, Default)]
pub(crate) struct PendingTag {
    pub(crate) name: String,
    pub(crate) is_end: bool,
    pub(crate) self_closing: bool,
    pub(crate) attributes: Attributes,
    attr_name: Option<String>,
    attr_value: String,
    attr_has_value: bool,
}

impl PendingTag {
    pub(crate) fn new(is_end: bool) -> Self {
        Self {
            is_end,
            ..Self::default()
        }
    }

    /// Whether any attribute, committed or in progress, has been started.
    pub(crate) fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
            || self
                .attr_name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty())
    }

    /// "Start a new attribute in the current tag token."
    ///
    /// Commits the previous attribute first; see [`Self::finish_attribute`].
    pub(crate) fn new_attribute(&mut self) -> bool {
        let unique = self.finish_attribute();
        self.attr_name = Some(String::new());
        unique
    }

    pub(crate) fn append_attribute_name(&mut self, c: char) {
        self.attr_name.get_or_insert_with(String::new).push(c);
    }

    pub(crate) fn append_attribute_value(&mut self, c: char) {
        self.attr_has_value = true;
        self.attr_value.push(c);
    }

    pub(crate) fn append_attribute_value_str(&mut self, s: &str) {
        self.attr_has_value = true;
        self.attr_value.push_str(s);
    }

    /// Marks an attribute written as `name=""`, which is not boolean.
    pub(crate) const fn set_empty_attribute_value(&mut self) {
        self.attr_has_value = true;
    }

    /// Commit the attribute in progress.
    ///
    /// Returns false when an attribute of the same name already exists; the
    /// new one is dropped.
    pub(crate) fn finish_attribute(&mut self) -> bool {
        let Some(name) = self.attr_name.take() else {
            return true;
        };
        let value = std::mem::take(&mut self.attr_value);
        let has_value = std::mem::take(&mut self.attr_has_value);
        let name = name.trim().to_string();
        if name.is_empty() {
            return true;
        }
        if self.attributes.has_key_ignore_case(&name) {
            return false;
        }
        let attribute = if has_value {
            Attribute::new(name, value)
        } else {
            Attribute::boolean(name)
        };
        self.attributes.put_attribute(attribute);
        true
    }

    pub(crate) fn into_token(mut self) -> (Token, bool) {
        let unique = self.finish_attribute();
        let normal_name = self.name.to_ascii_lowercase();
        let token = if self.is_end {
            Token::EndTag {
                name: self.name,
                normal_name,
            }
        } else {
            Token::StartTag {
                name: self.name,
                normal_name,
                attributes: self.attributes,
                self_closing: self.self_closing,
            }
        };
        (token, unique)
    }
}

/// DOCTYPE under construction.
#[derive(Debug, Default)]
pub(crate) struct PendingDoctype {
    pub(crate) name: Option<String>,
    pub(crate) public_id: Option<String>,
    pub(crate) system_id: Option<String>,
    pub(crate) force_quirks: bool,
}

impl PendingDoctype {
    pub(crate) fn into_token(self) -> Token {
        Token::Doctype {
            name: self.name,
            public_id: self.public_id,
            system_id: self.system_id,
            force_quirks: self.force_quirks,
        }
    }
}
