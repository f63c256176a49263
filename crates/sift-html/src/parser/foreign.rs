//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

use sift_dom::Namespace;

use super::core::{HtmlTreeBuilder, is_whitespace};
use super::foreign_content::{
    is_breakout_tag, is_html_integration_point, is_mathml_text_integration_point,
};
use crate::tokenizer::Token;

impl HtmlTreeBuilder {
    /// Process `token` while the adjusted current node is an SVG or MathML
    /// element.
    pub(super) fn process_in_foreign_content(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL: Parse error. Insert a
            //  U+FFFD REPLACEMENT CHARACTER character."
            // "Any other character token: Insert the token's character. If
            //  the token is not ... ASCII whitespace, set the frameset-ok flag
            //  to "not ok"."
            Token::Character { text } => {
                if text.contains('\0') {
                    self.parse_error("Unexpected null character in foreign content");
                }
                if text.chars().any(|c| c != '\0' && !is_whitespace(c)) {
                    self.frameset_ok = false;
                }
                self.insert_characters(&text.replace('\0', "\u{FFFD}"));
            }

            Token::Comment { text, .. } => self.insert_comment(text, None),

            Token::Doctype { .. } => self.unexpected_token(token),

            // "Parse error. While the current node is not a MathML text
            //  integration point, an HTML integration point, or an element in
            //  the HTML namespace, pop elements from the stack of open
            //  elements. Reprocess the token according to the rules given in
            //  the section corresponding to the current insertion mode in HTML
            //  content."
            Token::StartTag {
                normal_name,
                attributes,
                ..
            } if is_breakout_tag(normal_name, attributes) => {
                self.unexpected_token(token);
                while let Some(current) = self.current_node()
                    && self.stack_of_open_elements.len() > 1
                    && self.element(current).is_some_and(|element| {
                        element.namespace != Namespace::Html
                            && !is_mathml_text_integration_point(element)
                            && !is_html_integration_point(element)
                    })
                {
                    self.pop_current_node();
                }
                self.process_using_rules_for(self.insertion_mode, token);
            }

            // "Any other start tag: ... Insert a foreign element for the token,
            //  with adjusted current node's namespace and false. If the token
            //  has its self-closing flag set, pop the current node off the
            //  stack of open elements and acknowledge the token's self-closing
            //  flag."
            Token::StartTag { self_closing, .. } => {
                let namespace = self
                    .adjusted_current_node()
                    .and_then(|id| self.element(id))
                    .map_or(Namespace::Html, |element| element.namespace);
                if *self_closing {
                    let _ = self.insert_empty_element(token, namespace);
                } else {
                    let _ = self.insert_foreign_element(token, namespace);
                }
            }

            // "An end tag whose tag name is "script", if the current node is an
            //  SVG script element: Pop the current node off the stack of open
            //  elements."
            Token::EndTag { normal_name, .. }
                if normal_name == "script"
                    && self
                        .current_node()
                        .and_then(|id| self.element(id))
                        .is_some_and(|element| {
                            element.namespace == Namespace::Svg && element.normal_name() == "script"
                        }) =>
            {
                self.pop_current_node();
            }

            Token::EndTag { normal_name, .. } => self.foreign_end_tag(token, normal_name),

            // End of file is always handled by the insertion mode rules.
            Token::EndOfFile => self.process_using_rules_for(self.insertion_mode, token),
        }
    }

    /// "Any other end tag"
    fn foreign_end_tag(&mut self, token: &Token, name: &str) {
        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        let Some(mut index) = self.stack_of_open_elements.len().checked_sub(1) else {
            return;
        };

        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not the
        //          same as the tag name of the token, then this is a parse
        //          error."
        let matches = |builder: &Self, index: usize| {
            builder
                .element(builder.stack_of_open_elements[index])
                .is_some_and(|element| element.normal_name().eq_ignore_ascii_case(name))
        };
        if !matches(self, index) {
            self.unexpected_token(token);
        }

        loop {
            // STEP 3: "Loop: If node is the topmost element in the stack of
            //          open elements, then return. (fragment case)"
            if index == 0 {
                return;
            }

            // STEP 4: "If node's tag name, converted to ASCII lowercase, is the
            //          same as the tag name of the token, pop elements from the
            //          stack of open elements until node has been popped from
            //          the stack, and then return."
            if matches(self, index) {
                self.stack_of_open_elements.truncate(index);
                return;
            }

            // STEP 5: "Set node to the previous entry in the stack of open
            //          elements."
            index -= 1;

            // STEP 6: "If node is not an element in the HTML namespace, return
            //          to the step labeled loop."
            // STEP 7: "Otherwise, process the token according to the rules
            //          given in the section corresponding to the current
            //          insertion mode in HTML content."
            let is_html = self
                .element(self.stack_of_open_elements[index])
                .is_some_and(|element| element.namespace == Namespace::Html);
            if is_html {
                self.process_using_rules_for(self.insertion_mode, token);
                return;
            }
        }
    }
}
