//! Element attributes.
//!
//! [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
//!
//! Attributes are an ordered map: one value per key, insertion order kept for
//! serialization. Lookups are case-sensitive; the `*_ignore_case` variants
//! scan the list comparing ASCII case-insensitively.

use std::fmt;

use sift_common::validate::{ValidationError, not_empty};

/// Prefix of custom data attributes.
pub const DATA_PREFIX: &str = "data-";

/// A single attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    key: String,
    value: String,
    boolean: bool,
}

impl Attribute {
    /// Create a key/value attribute.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            boolean: false,
        }
    }

    /// Create a boolean attribute (`<input disabled>`), whose value is empty.
    #[must_use]
    pub fn boolean(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: String::new(),
            boolean: true,
        }
    }

    /// The attribute key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Rename the attribute, keeping its value.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// The attribute value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this was written as a bare boolean attribute.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        self.boolean
    }

    /// Whether the key starts with `data-` and has a name after it.
    #[must_use]
    pub fn is_data_attribute(&self) -> bool {
        self.key.starts_with(DATA_PREFIX) && self.key.len() > DATA_PREFIX.len()
    }

    /// Replace the value, which also clears the boolean flag.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.boolean = false;
    }
}

/// Ordered attribute map of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    list: Vec<Attribute>,
}

impl Attributes {
    /// An empty attribute map.
    #[must_use]
    pub const fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Value for `key`, or `None` if unset. Case-sensitive.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.list
            .iter()
            .find(|attr| attr.key == key)
            .map(Attribute::value)
    }

    /// Value of the first attribute whose key matches ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Empty`] if `key` is empty.
    pub fn get_ignore_case(&self, key: &str) -> Result<Option<&str>, ValidationError> {
        not_empty(key, "attribute key")?;
        Ok(self
            .list
            .iter()
            .find(|attr| attr.key.eq_ignore_ascii_case(key))
            .map(Attribute::value))
    }

    /// Set `key` to `value`, replacing the existing value in place.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put_attribute(Attribute::new(key, value));
    }

    /// Set a boolean attribute, or remove it when `value` is false.
    pub fn put_bool(&mut self, key: &str, value: bool) {
        if value {
            self.put_attribute(Attribute::boolean(key));
        } else {
            self.list.retain(|attr| attr.key != key);
        }
    }

    /// Insert or replace an attribute, keeping the original position on replace.
    pub fn put_attribute(&mut self, attribute: Attribute) {
        if let Some(existing) = self.list.iter_mut().find(|a| a.key == attribute.key) {
            *existing = attribute;
        } else {
            self.list.push(attribute);
        }
    }

    /// Remove `key`. Case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Empty`] if `key` is empty.
    pub fn remove(&mut self, key: &str) -> Result<(), ValidationError> {
        not_empty(key, "attribute key")?;
        self.list.retain(|attr| attr.key != key);
        Ok(())
    }

    /// Remove every attribute whose key matches ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Empty`] if `key` is empty.
    pub fn remove_ignore_case(&mut self, key: &str) -> Result<(), ValidationError> {
        not_empty(key, "attribute key")?;
        self.list.retain(|attr| !attr.key.eq_ignore_ascii_case(key));
        Ok(())
    }

    /// Whether `key` is set. Case-sensitive.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.list.iter().any(|attr| attr.key == key)
    }

    /// Whether a key matching `key` ignoring ASCII case is set.
    #[must_use]
    pub fn has_key_ignore_case(&self, key: &str) -> bool {
        self.list.iter().any(|attr| attr.key.eq_ignore_ascii_case(key))
    }

    /// Whether `key` is set to exactly `value`.
    #[must_use]
    pub fn has_key_with_value(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.list.iter()
    }

    /// Mutable iteration in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Attribute> {
        self.list.iter_mut()
    }

    /// The attributes as a slice, in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Attribute] {
        &self.list
    }

    /// Copy every attribute of `other` that is not already set here.
    ///
    /// Used when a second `<html>` or `<body>` start tag contributes attributes.
    pub fn add_missing(&mut self, other: &Self) {
        for attr in &other.list {
            if !self.has_key(&attr.key) {
                self.list.push(attr.clone());
            }
        }
    }

    /// The `data-*` attributes as `(name without prefix, value)` pairs.
    #[must_use]
    pub fn dataset(&self) -> Vec<(&str, &str)> {
        self.list
            .iter()
            .filter(|attr| attr.is_data_attribute())
            .map(|attr| (&attr.key[DATA_PREFIX.len()..], attr.value.as_str()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for attr in iter {
            attrs.put_attribute(attr);
        }
        attrs
    }
}

impl fmt::Display for Attributes {
    /// Attributes in HTML form, each preceded by a space.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for attr in &self.list {
            write!(f, " {}", attr.key)?;
            if !attr.boolean || !attr.value.is_empty() {
                f.write_str("=\"")?;
                for c in attr.value.chars() {
                    match c {
                        '&' => f.write_str("&amp;")?,
                        '"' => f.write_str("&quot;")?,
                        '\u{a0}' => f.write_str("&nbsp;")?,
                        _ => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_overwrites_in_place() {
        let mut attrs = Attributes::new();
        attrs.put("id", "a");
        attrs.put("class", "x");
        attrs.put("id", "b");
        let keys: Vec<&str> = attrs.iter().map(Attribute::key).collect();
        assert_eq!(keys, ["id", "class"]);
        assert_eq!(attrs.get("id"), Some("b"));
    }

    #[test]
    fn ignore_case_lookup_and_removal() {
        let mut attrs = Attributes::new();
        attrs.put("Href", "/x");
        assert_eq!(attrs.get("href"), None);
        assert_eq!(attrs.get_ignore_case("HREF"), Ok(Some("/x")));
        assert!(attrs.get_ignore_case("").is_err());
        attrs.remove_ignore_case("href").unwrap();
        assert!(attrs.is_empty());
    }

    #[test]
    fn dataset_strips_prefix() {
        let attrs: Attributes = [
            Attribute::new("data-name", "sift"),
            Attribute::new("data-", "ignored"),
            Attribute::new("title", "t"),
        ]
        .into_iter()
        .collect();
        assert_eq!(attrs.dataset(), vec![("name", "sift")]);
    }

    #[test]
    fn boolean_attributes_render_bare() {
        let mut attrs = Attributes::new();
        attrs.put_bool("hidden", true);
        attrs.put("title", "a \"b\"");
        assert_eq!(attrs.to_string(), " hidden title=\"a &quot;b&quot;\"");
        attrs.put_bool("hidden", false);
        assert!(!attrs.has_key("hidden"));
    }
}
