//! Case normalisation settings for tag and attribute names.

use sift_dom::{Attribute, Attributes};

/// Controls whether tag and attribute names keep the case they were written in.
///
/// HTML lowercases both; XML preserves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSettings {
    /// Keep tag names as written.
    pub preserve_tag_case: bool,
    /// Keep attribute names as written.
    pub preserve_attribute_case: bool,
}

impl ParseSettings {
    /// Lowercase tag and attribute names.
    pub const HTML_DEFAULT: Self = Self {
        preserve_tag_case: false,
        preserve_attribute_case: false,
    };

    /// Keep tag and attribute names exactly as written.
    pub const PRESERVE_CASE: Self = Self {
        preserve_tag_case: true,
        preserve_attribute_case: true,
    };

    /// Normalise a tag name.
    #[must_use]
    pub fn normalize_tag(&self, name: &str) -> String {
        let name = name.trim();
        if self.preserve_tag_case {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }

    /// Normalise an attribute name.
    #[must_use]
    pub fn normalize_attribute(&self, name: &str) -> String {
        let name = name.trim();
        if self.preserve_attribute_case {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }

    /// Normalise every attribute name in `attributes`, keeping order and values.
    #[must_use]
    pub fn normalize_attributes(&self, attributes: Attributes) -> Attributes {
        if self.preserve_attribute_case {
            return attributes;
        }
        attributes
            .iter()
            .map(|attribute| {
                let key = self.normalize_attribute(attribute.key());
                if attribute.is_boolean() {
                    Attribute::boolean(key)
                } else {
                    Attribute::new(key, attribute.value())
                }
            })
            .collect()
    }
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self::HTML_DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_lowercases() {
        let settings = ParseSettings::HTML_DEFAULT;
        assert_eq!(settings.normalize_tag(" DIV "), "div");
        assert_eq!(settings.normalize_attribute("onClick"), "onclick");

        let mut attributes = Attributes::new();
        attributes.put("ID", "a");
        attributes.put_attribute(Attribute::boolean("Hidden"));
        let normalised = settings.normalize_attributes(attributes);
        assert_eq!(normalised.get("id"), Some("a"));
        assert!(normalised.as_slice()[1].is_boolean());
        assert_eq!(normalised.as_slice()[1].key(), "hidden");
    }

    #[test]
    fn preserve_case_keeps_names() {
        let settings = ParseSettings::PRESERVE_CASE;
        assert_eq!(settings.normalize_tag("svgFoo"), "svgFoo");
        assert_eq!(settings.normalize_attribute("viewBox"), "viewBox");
    }
}
