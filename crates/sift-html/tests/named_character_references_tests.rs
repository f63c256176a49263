//! Integration tests for named character reference lookup and `unescape`.

use sift_html::tokenizer::named_character_references::{
    is_legacy_entity, is_named_entity, longest_legacy_prefix, lookup_entity,
};
use sift_html::unescape;

#[test]
fn test_lookup_common_entities() {
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("lt"), Some("<"));
    assert_eq!(lookup_entity("gt"), Some(">"));
    assert_eq!(lookup_entity("quot"), Some("\""));
    assert_eq!(lookup_entity("nbsp"), Some("\u{00A0}"));
    assert_eq!(lookup_entity("hellip"), Some("\u{2026}"));
}

#[test]
fn test_legacy_entities() {
    assert!(is_legacy_entity("amp"));
    assert!(is_legacy_entity("copy"));
    assert!(!is_legacy_entity("hellip"));
    assert!(is_named_entity("hellip"));
}

#[test]
fn test_lookup_unknown_entity() {
    assert_eq!(lookup_entity("notarealentity"), None);
    assert_eq!(lookup_entity(""), None);
}

#[test]
fn test_longest_legacy_prefix() {
    assert_eq!(longest_legacy_prefix("notit"), Some(("not", "\u{AC}")));
    assert_eq!(longest_legacy_prefix("ampx"), Some(("amp", "&")));
    assert_eq!(longest_legacy_prefix("xyz"), None);
}

// ====================================================================
// unescape
// ====================================================================

#[test]
fn test_unescape_mixed_references() {
    assert_eq!(unescape("&amp;&#65;&#x41;", false), "&AA");
}

#[test]
fn test_unescape_keeps_unknown_references() {
    assert_eq!(unescape("&foo;", false), "&foo;");
    assert_eq!(unescape("a & b", false), "a & b");
    assert_eq!(unescape("trailing &", false), "trailing &");
}

#[test]
fn test_unescape_attribute_mode() {
    assert_eq!(unescape("x=1&copy=2", true), "x=1&copy=2");
    assert_eq!(unescape("x=1&copy=2", false), "x=1\u{A9}=2");
    assert_eq!(unescape("&copy;", true), "\u{A9}");
}

#[test]
fn test_unescape_numeric_edge_cases() {
    assert_eq!(unescape("&#128;", false), "\u{20AC}");
    assert_eq!(unescape("&#0;", false), "\u{FFFD}");
    assert_eq!(unescape("&#x110000;", false), "\u{FFFD}");
}
