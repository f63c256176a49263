//! MathML attribute adjustment.
//!
//! [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)

use sift_dom::Attributes;

/// [§ 13.2.6.3 Adjust MathML attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-mathml-attributes)
///
/// "if the token has an attribute named definitionurl, change its name to
/// definitionURL (note the case difference)."
pub fn adjust_mathml_attributes(attributes: &mut Attributes) {
    for attribute in attributes.iter_mut() {
        if attribute.key().eq_ignore_ascii_case("definitionurl") {
            attribute.set_key("definitionURL");
        }
    }
}
