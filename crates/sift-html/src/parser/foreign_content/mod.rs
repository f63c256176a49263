//! Foreign content parsing support for SVG and MathML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

pub mod mathml;
pub mod svg;

pub use mathml::adjust_mathml_attributes;
pub use svg::{adjust_svg_attributes, adjust_svg_tag_name};

use sift_dom::{Attributes, ElementData, Namespace};

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// "if any of the attributes on the token match the strings in the first
/// column of the following table, let the attribute be a namespaced attribute,
/// with the prefix being the string in the second column, the local name being
/// the string in the third column"
///
/// Attributes carry no namespace here, so the prefixed spelling is kept as
/// the key. Format: (`attribute_name`, prefix, `local_name`).
const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, &str, &str)] = &[
    ("xlink:actuate", "xlink", "actuate"),
    ("xlink:arcrole", "xlink", "arcrole"),
    ("xlink:href", "xlink", "href"),
    ("xlink:role", "xlink", "role"),
    ("xlink:show", "xlink", "show"),
    ("xlink:title", "xlink", "title"),
    ("xlink:type", "xlink", "type"),
    ("xml:lang", "xml", "lang"),
    ("xml:space", "xml", "space"),
    ("xmlns", "", "xmlns"),
    ("xmlns:xlink", "xmlns", "xlink"),
];

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
pub fn adjust_foreign_attributes(attributes: &mut Attributes) {
    for attribute in attributes.iter_mut() {
        let lowered = attribute.key().to_ascii_lowercase();
        if let Some(&(_, prefix, local_name)) = FOREIGN_ATTRIBUTE_ADJUSTMENTS
            .iter()
            .find(|(from, _, _)| *from == lowered)
        {
            if prefix.is_empty() {
                attribute.set_key(local_name);
            } else {
                attribute.set_key(format!("{prefix}:{local_name}"));
            }
        }
    }
}

/// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
///
/// Start tags that break out of foreign content back into HTML:
/// "b", "big", "blockquote", "body", "br", "center", "code", "dd", "div",
/// "dl", "dt", "em", "embed", "h1" through "h6", "head", "hr", "i", "img",
/// "li", "listing", "menu", "meta", "nobr", "ol", "p", "pre", "ruby", "s",
/// "small", "span", "strong", "strike", "sub", "sup", "table", "tt", "u",
/// "ul", "var". A "font" start tag breaks out only when it has a color, face
/// or size attribute.
#[must_use]
pub fn is_breakout_tag(name: &str, attributes: &Attributes) -> bool {
    match name {
        "b" | "big" | "blockquote" | "body" | "br" | "center" | "code" | "dd" | "div" | "dl"
        | "dt" | "em" | "embed" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "head" | "hr"
        | "i" | "img" | "li" | "listing" | "menu" | "meta" | "nobr" | "ol" | "p" | "pre"
        | "ruby" | "s" | "small" | "span" | "strong" | "strike" | "sub" | "sup" | "table"
        | "tt" | "u" | "ul" | "var" => true,
        "font" => ["color", "face", "size"]
            .iter()
            .any(|key| attributes.has_key_ignore_case(key)),
        _ => false,
    }
}

/// [§ 13.2.6 MathML text integration point](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
///
/// "A node is a MathML text integration point if it is one of the following
/// elements: A MathML mi element, A MathML mo element, A MathML mn element,
/// A MathML ms element, A MathML mtext element"
#[must_use]
pub fn is_mathml_text_integration_point(element: &ElementData) -> bool {
    element.namespace == Namespace::MathMl
        && matches!(element.normal_name(), "mi" | "mo" | "mn" | "ms" | "mtext")
}

/// [§ 13.2.6 HTML integration point](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
///
/// "A MathML annotation-xml element whose start tag token had an attribute
/// with the name "encoding" whose value was an ASCII case-insensitive match
/// for the string "text/html"", the same for "application/xhtml+xml", and the
/// SVG foreignObject, desc and title elements.
#[must_use]
pub fn is_html_integration_point(element: &ElementData) -> bool {
    match element.namespace {
        Namespace::MathMl => {
            element.normal_name() == "annotation-xml"
                && element.attrs.iter().any(|attribute| {
                    attribute.key().eq_ignore_ascii_case("encoding")
                        && (attribute.value().eq_ignore_ascii_case("text/html")
                            || attribute
                                .value()
                                .eq_ignore_ascii_case("application/xhtml+xml"))
                })
        }
        Namespace::Svg => matches!(element.normal_name(), "foreignobject" | "desc" | "title"),
        Namespace::Html => false,
    }
}

#[cfg(test)]
mod tests {
    use sift_dom::{Attribute, Tag};

    use super::*;

    #[test]
    fn svg_names_regain_case() {
        assert_eq!(adjust_svg_tag_name("foreignobject"), Some("foreignObject"));
        assert_eq!(adjust_svg_tag_name("circle"), None);

        let mut attributes = Attributes::new();
        attributes.put("viewbox", "0 0 10 10");
        attributes.put("xlink:href", "#a");
        adjust_svg_attributes(&mut attributes);
        adjust_foreign_attributes(&mut attributes);
        assert_eq!(attributes.get("viewBox"), Some("0 0 10 10"));
        assert_eq!(attributes.get("xlink:href"), Some("#a"));
    }

    #[test]
    fn font_breaks_out_only_with_presentation_attributes() {
        let mut attributes = Attributes::new();
        assert!(!is_breakout_tag("font", &attributes));
        attributes.put_attribute(Attribute::new("size", "3"));
        assert!(is_breakout_tag("font", &attributes));
        assert!(is_breakout_tag("p", &Attributes::new()));
        assert!(!is_breakout_tag("circle", &Attributes::new()));
    }

    #[test]
    fn integration_points() {
        let mut annotation = ElementData::new(Tag::value_of("annotation-xml", false), {
            let mut attributes = Attributes::new();
            attributes.put("encoding", "Text/HTML");
            attributes
        });
        annotation.namespace = Namespace::MathMl;
        assert!(is_html_integration_point(&annotation));

        let mut mi = ElementData::new(Tag::value_of("mi", false), Attributes::new());
        mi.namespace = Namespace::MathMl;
        assert!(is_mathml_text_integration_point(&mi));
        assert!(!is_html_integration_point(&mi));
    }
}
