//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)

use sift_dom::{Attributes, Namespace, QuirksMode, Tag};

use super::core::{HtmlTreeBuilder, InsertionMode, is_all_whitespace};
use super::formatting::{Adoption, is_formatting_element};
use super::stack::Scope;
use crate::tokenizer::{Token, TokenizerState};

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

impl HtmlTreeBuilder {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(super) fn handle_in_body_mode(&mut self, token: &Token) {
        match token {
            Token::Character { text } => self.in_body_characters(text),

            // "A comment token: Insert a comment."
            Token::Comment { text, .. } => self.insert_comment(text, None),

            // "A DOCTYPE token: Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag {
                normal_name,
                attributes,
                self_closing,
                ..
            } => self.in_body_start_tag(token, normal_name, attributes, *self_closing),

            Token::EndTag { normal_name, .. } => self.in_body_end_tag(token, normal_name),

            // "An end-of-file token: If the stack of template insertion modes
            //  is not empty, then process the token using the rules for the
            //  "in template" insertion mode. Otherwise ... Stop parsing."
            Token::EndOfFile => {
                if !self.template_insertion_modes.is_empty() {
                    self.handle_in_template_mode(token);
                }
            }
        }
    }

    /// "A character token that is U+0000 NULL: Parse error. Ignore the token."
    /// "A character token that is one of U+0009 CHARACTER TABULATION, U+000A
    /// LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE RETURN (CR), or
    /// U+0020 SPACE: Reconstruct the active formatting elements, if any. Insert
    /// the token's character."
    /// "Any other character token: Reconstruct the active formatting elements,
    /// if any. Insert the token's character. Set the frameset-ok flag to "not
    /// ok"."
    fn in_body_characters(&mut self, text: &str) {
        let stripped;
        let text = if text.contains('\0') {
            self.parse_error("Unexpected null character");
            stripped = text.replace('\0', "");
            stripped.as_str()
        } else {
            text
        };
        if text.is_empty() {
            return;
        }

        self.reconstruct_active_formatting_elements();
        self.insert_characters(text);
        if !is_all_whitespace(text) {
            self.frameset_ok = false;
        }
    }

    fn in_body_start_tag(
        &mut self,
        token: &Token,
        name: &str,
        attributes: &Attributes,
        self_closing: bool,
    ) {
        match name {
            // "A start tag whose tag name is "html": Parse error. If there is a
            //  template element on the stack of open elements, then ignore the
            //  token. Otherwise, for each attribute on the token, check to see
            //  if the attribute is already present on the top element of the
            //  stack of open elements. If it is not, add the attribute and its
            //  corresponding value to that element."
            "html" => {
                self.unexpected_token(token);
                if self.stack_has("template") {
                    return;
                }
                self.add_missing_attributes(0, attributes);
            }

            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
            | "style" | "template" | "title" => self.handle_in_head_mode(token),

            // "A start tag whose tag name is "body""
            "body" => {
                self.unexpected_token(token);
                if self.stack_of_open_elements.len() == 1
                    || !self.is_html_named(self.stack_of_open_elements[1], "body")
                    || self.stack_has("template")
                {
                    return;
                }
                self.frameset_ok = false;
                self.add_missing_attributes(1, attributes);
            }

            // "A start tag whose tag name is "frameset""
            "frameset" => {
                self.unexpected_token(token);
                if self.stack_of_open_elements.len() == 1
                    || !self.is_html_named(self.stack_of_open_elements[1], "body")
                    || !self.frameset_ok
                {
                    return;
                }
                // STEP 1: "Remove the second element on the stack of open
                //          elements from its parent node, if it has one."
                self.tree.detach(self.stack_of_open_elements[1]);
                // STEP 2: "Pop all the nodes from the bottom of the stack of
                //          open elements, from the current node up to, but not
                //          including, the root html element."
                self.stack_of_open_elements.truncate(1);
                // STEP 3: "Insert an HTML element for the token."
                let _ = self.insert_html_element(token);
                // STEP 4: "Switch the insertion mode to "in frameset"."
                self.insertion_mode = InsertionMode::InFrameset;
            }

            "address" | "article" | "aside" | "blockquote" | "center" | "details" | "dialog"
            | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure" | "footer"
            | "header" | "hgroup" | "main" | "menu" | "nav" | "ol" | "p" | "search"
            | "section" | "summary" | "ul" => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(token);
            }

            // "If the current node is an HTML element whose tag name is one of
            //  "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
            //  error; pop the current node off the stack of open elements."
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.close_p_if_in_button_scope();
                if self.current_node_is_one_of(HEADINGS) {
                    self.unexpected_token(token);
                    self.pop_current_node();
                }
                let _ = self.insert_html_element(token);
            }

            // "If the next token is a U+000A LINE FEED (LF) character token,
            //  then ignore that token and move on to the next one."
            "pre" | "listing" => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(token);
                self.ignore_next_line_feed = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "form""
            "form" => {
                let has_template = self.stack_has("template");
                if self.form_element_pointer.is_some() && !has_template {
                    self.unexpected_token(token);
                    return;
                }
                self.close_p_if_in_button_scope();
                let form = self.insert_html_element(token);
                if !has_template {
                    self.form_element_pointer = Some(form);
                }
            }

            "li" => self.in_body_list_item(token, &["li"]),
            "dd" | "dt" => self.in_body_list_item(token, &["dd", "dt"]),

            "plaintext" => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_html_element(token);
                self.tokenizer.transition(TokenizerState::PLAINTEXT);
            }

            "button" => {
                if self.has_element_in_scope("button", Scope::Default) {
                    self.unexpected_token(token);
                    self.generate_implied_end_tags(None);
                    self.pop_until("button");
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
            }

            // "If the list of active formatting elements contains an a element
            //  between the end of the list and the last marker on the list (or
            //  the start of the list if there is no marker on the list), then
            //  this is a parse error; run the adoption agency algorithm for the
            //  token, then remove that element from the list of active
            //  formatting elements and the stack of open elements if the
            //  adoption agency algorithm didn't already remove it"
            "a" => {
                if let Some(previous) = self.formatting_element_after_last_marker("a") {
                    self.unexpected_token(token);
                    let _ = self.run_adoption_agency("a");
                    self.remove_from_active_formatting_elements(previous);
                    self.remove_from_stack(previous);
                }
                self.insert_formatting_element(token);
            }

            "nobr" => {
                self.reconstruct_active_formatting_elements();
                if self.has_element_in_scope("nobr", Scope::Default) {
                    self.unexpected_token(token);
                    let _ = self.run_adoption_agency("nobr");
                }
                self.insert_formatting_element(token);
            }

            _ if is_formatting_element(name) => self.insert_formatting_element(token),

            "applet" | "marquee" | "object" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.push_marker();
                self.frameset_ok = false;
            }

            "table" => {
                if self.tree.quirks_mode() != QuirksMode::Quirks {
                    self.close_p_if_in_button_scope();
                }
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::InTable;
            }

            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_empty_element(token, Namespace::Html);
                self.frameset_ok = false;
            }

            // "If the token does not have an attribute with the name "type", or
            //  if it does, but that attribute's value is not an ASCII
            //  case-insensitive match for the string "hidden", then: set the
            //  frameset-ok flag to "not ok"."
            "input" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_empty_element(token, Namespace::Html);
                let hidden = attributes
                    .get_ignore_case("type")
                    .ok()
                    .flatten()
                    .is_some_and(|value| value.eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.frameset_ok = false;
                }
            }

            "param" | "source" | "track" => {
                let _ = self.insert_empty_element(token, Namespace::Html);
            }

            "hr" => {
                self.close_p_if_in_button_scope();
                let _ = self.insert_empty_element(token, Namespace::Html);
                self.frameset_ok = false;
            }

            // "Parse error. Change the token's tag name to "img" and reprocess
            //  it. (Don't ask.)"
            "image" => {
                self.unexpected_token(token);
                let img = Token::StartTag {
                    name: "img".to_string(),
                    normal_name: "img".to_string(),
                    attributes: attributes.clone(),
                    self_closing,
                };
                self.process_token(&img);
            }

            "textarea" => {
                let _ = self.insert_html_element(token);
                self.ignore_next_line_feed = true;
                self.tokenizer.transition(TokenizerState::RCDATA);
                self.original_insertion_mode = self.insertion_mode;
                self.frameset_ok = false;
                self.insertion_mode = InsertionMode::Text;
            }

            "xmp" => {
                self.close_p_if_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.parse_generic_text_element(token, TokenizerState::RAWTEXT);
            }

            "iframe" => {
                self.frameset_ok = false;
                self.parse_generic_text_element(token, TokenizerState::RAWTEXT);
            }

            "noembed" => self.parse_generic_text_element(token, TokenizerState::RAWTEXT),

            "select" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
                self.frameset_ok = false;
                self.insertion_mode = match self.insertion_mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
            }

            "optgroup" | "option" => {
                if self.current_node_is("option") {
                    self.pop_current_node();
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(token);
            }

            "rb" | "rtc" => {
                if self.has_element_in_scope("ruby", Scope::Default) {
                    self.generate_implied_end_tags(None);
                    if !self.current_node_is("ruby") {
                        self.unexpected_token(token);
                    }
                }
                let _ = self.insert_html_element(token);
            }

            "rp" | "rt" => {
                if self.has_element_in_scope("ruby", Scope::Default) {
                    self.generate_implied_end_tags(Some("rtc"));
                    if !self.current_node_is_one_of(&["rtc", "ruby"]) {
                        self.unexpected_token(token);
                    }
                }
                let _ = self.insert_html_element(token);
            }

            // "Reconstruct the active formatting elements, if any. Adjust
            //  MathML attributes for the token. Adjust foreign attributes for
            //  the token. Insert a foreign element for the token, with MathML
            //  namespace. If the token has its self-closing flag set, pop the
            //  current node off the stack of open elements"
            "math" | "svg" => {
                self.reconstruct_active_formatting_elements();
                let namespace = if name == "math" {
                    Namespace::MathMl
                } else {
                    Namespace::Svg
                };
                let _ = self.insert_foreign_element(token, namespace);
                if self_closing {
                    self.pop_current_node();
                }
            }

            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot"
            | "th" | "thead" | "tr" => self.unexpected_token(token),

            // "Any other start tag: Reconstruct the active formatting elements,
            //  if any. Insert an HTML element for the token."
            _ => {
                self.reconstruct_active_formatting_elements();
                let element = self.insert_html_element(token);
                if self_closing {
                    if Tag::is_known_tag(name) {
                        self.unexpected_token(token);
                    } else {
                        // Unknown elements written as `<x/>` stay empty and
                        // keep the self-closing form on output.
                        if let Some(data) = self.tree.as_element_mut(element) {
                            data.tag.set_self_closing();
                        }
                        self.pop_current_node();
                    }
                }
            }
        }
    }

    /// Add attributes from a stray `html` or `body` start tag to the element
    /// at `index` on the stack, keeping existing values.
    fn add_missing_attributes(&mut self, index: usize, attributes: &Attributes) {
        let normalized = self.settings.normalize_attributes(attributes.clone());
        let Some(&target) = self.stack_of_open_elements.get(index) else {
            return;
        };
        if let Some(element) = self.tree.as_element_mut(target) {
            element.attrs.add_missing(&normalized);
        }
    }

    /// Start tags for a, b, big, code, em, font, i, nobr, s, small, strike,
    /// strong, tt and u: "Reconstruct the active formatting elements, if any.
    /// Insert an HTML element for the token. Push onto the list of active
    /// formatting elements that element."
    fn insert_formatting_element(&mut self, token: &Token) {
        self.reconstruct_active_formatting_elements();
        let element = self.insert_html_element(token);
        self.push_active_formatting_element(element, token);
    }

    /// "A start tag whose tag name is "li"" and "A start tag whose tag name is
    /// one of: "dd", "dt"". `closes` lists the elements an open one of which
    /// is implicitly closed.
    fn in_body_list_item(&mut self, token: &Token, closes: &[&str]) {
        // STEP 1: "Set the frameset-ok flag to "not ok"."
        self.frameset_ok = false;

        // STEP 2-5: "Initialize node to be the current node (the bottommost
        //            node of the stack)." Walk up until a matching item or a
        //            special element other than address, div and p.
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            if self.is_html_one_of(node, closes) {
                let Some(name) = self.element(node).map(|element| element.normal_name().to_string())
                else {
                    break;
                };
                // "Generate implied end tags, except for" elements with the
                // same tag name as node.
                self.generate_implied_end_tags(Some(&name));
                if !self.current_node_is(&name) {
                    self.unexpected_token(token);
                }
                self.pop_until(&name);
                break;
            }
            if self.is_special(node) && !self.is_html_one_of(node, &["address", "div", "p"]) {
                break;
            }
        }

        // STEP 6: "Done: If the stack of open elements has a p element in
        //          button scope, then close a p element."
        self.close_p_if_in_button_scope();
        // STEP 7: "Finally, insert an HTML element for the token."
        let _ = self.insert_html_element(token);
    }

    fn in_body_end_tag(&mut self, token: &Token, name: &str) {
        match name {
            "template" => self.handle_in_head_mode(token),

            // "An end tag whose tag name is "body": If the stack of open
            //  elements does not have a body element in scope, this is a parse
            //  error; ignore the token. ... Switch the insertion mode to "after
            //  body"."
            "body" => {
                if !self.has_element_in_scope("body", Scope::Default) {
                    self.unexpected_token(token);
                    return;
                }
                self.insertion_mode = InsertionMode::AfterBody;
            }

            // "An end tag whose tag name is "html"": as for body, then
            // "Reprocess the token."
            "html" => {
                if !self.has_element_in_scope("body", Scope::Default) {
                    self.unexpected_token(token);
                    return;
                }
                self.reprocess_in(InsertionMode::AfterBody, token);
            }

            "address" | "article" | "aside" | "blockquote" | "button" | "center" | "details"
            | "dialog" | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure"
            | "footer" | "header" | "hgroup" | "listing" | "main" | "menu" | "nav" | "ol"
            | "pre" | "search" | "section" | "summary" | "ul" => {
                self.close_block_in_scope(token, name, Scope::Default, None);
            }

            "form" => self.in_body_form_end_tag(token),

            // "If the stack of open elements does not have a p element in
            //  button scope, then this is a parse error; insert an HTML element
            //  for a "p" start tag token with no attributes. Close a p element."
            "p" => {
                if !self.has_element_in_scope("p", Scope::Button) {
                    self.unexpected_token(token);
                    let _ = self.insert_html_element(&Token::start_tag("p"));
                }
                self.close_p_element();
            }

            "li" => self.close_block_in_scope(token, "li", Scope::ListItem, Some("li")),
            "dd" | "dt" => self.close_block_in_scope(token, name, Scope::Default, Some(name)),

            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                if !self.has_any_in_scope(HEADINGS, Scope::Default) {
                    self.unexpected_token(token);
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_node_is(name) {
                    self.unexpected_token(token);
                }
                self.pop_until_one_of(HEADINGS);
            }

            _ if is_formatting_element(name) => {
                if self.run_adoption_agency(name) == Adoption::AnyOtherEndTag {
                    self.any_other_end_tag(token, name);
                }
            }

            "applet" | "marquee" | "object" => {
                if !self.has_element_in_scope(name, Scope::Default) {
                    self.unexpected_token(token);
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_node_is(name) {
                    self.unexpected_token(token);
                }
                self.pop_until(name);
                self.clear_active_formatting_elements_to_last_marker();
            }

            // "An end tag whose tag name is "br": Parse error. Drop the
            //  attributes from the token, and act as described in the next
            //  entry; i.e. act as if this was a "br" start tag token with no
            //  attributes, rather than the end tag token that it actually is."
            "br" => {
                self.unexpected_token(token);
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_empty_element(&Token::start_tag("br"), Namespace::Html);
                self.frameset_ok = false;
            }

            _ => self.any_other_end_tag(token, name),
        }
    }

    /// "If the stack of open elements does not have an element in scope that is
    /// an HTML element with the same tag name as that of the token, then this
    /// is a parse error; ignore the token. Otherwise: Generate implied end
    /// tags. If the current node is not an HTML element with the same tag name
    /// as that of the token, then this is a parse error. Pop elements from the
    /// stack of open elements until an HTML element with the same tag name as
    /// the token has been popped from the stack."
    fn close_block_in_scope(
        &mut self,
        token: &Token,
        name: &str,
        scope: Scope,
        except: Option<&str>,
    ) {
        if !self.has_element_in_scope(name, scope) {
            self.unexpected_token(token);
            return;
        }
        self.generate_implied_end_tags(except);
        if !self.current_node_is(name) {
            self.unexpected_token(token);
        }
        self.pop_until(name);
    }

    /// "An end tag whose tag name is "form""
    fn in_body_form_end_tag(&mut self, token: &Token) {
        // "If there is no template element on the stack of open elements"
        if !self.stack_has("template") {
            // STEP 1: "Let node be the element that the form element pointer
            //          is set to, or null if it is not set to an element."
            // STEP 2: "Set the form element pointer to null."
            let node = self.form_element_pointer.take();
            // STEP 3: "If node is null or if the stack of open elements does
            //          not have node in scope, then this is a parse error;
            //          return and ignore the token."
            let Some(node) = node.filter(|&node| self.has_node_in_scope(node)) else {
                self.unexpected_token(token);
                return;
            };
            // STEP 4: "Generate implied end tags."
            self.generate_implied_end_tags(None);
            // STEP 5: "If the current node is not node, then this is a parse
            //          error."
            if self.current_node() != Some(node) {
                self.unexpected_token(token);
            }
            // STEP 6: "Remove node from the stack of open elements."
            self.remove_from_stack(node);
            return;
        }

        // "If there is a template element on the stack of open elements"
        self.close_block_in_scope(token, "form", Scope::Default, None);
    }

    /// "Any other end tag"
    pub(super) fn any_other_end_tag(&mut self, token: &Token, name: &str) {
        // STEP 1: "Initialize node to be the current node (the bottommost node
        //          of the stack)."
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];

            // STEP 2: "Loop: If node is an HTML element with the same tag name
            //          as the token, then: Generate implied end tags, except
            //          for HTML elements with the same tag name as the token.
            //          If node is not the current node, then this is a parse
            //          error. Pop all the nodes from the current node up to
            //          node, including node, then stop these steps."
            if self.is_html_named(node, name) {
                self.generate_implied_end_tags(Some(name));
                if self.current_node() != Some(node) {
                    self.unexpected_token(token);
                }
                self.pop_until_node(node);
                return;
            }

            // STEP 3: "Otherwise, if node is in the special category, then this
            //          is a parse error; ignore the token, and return."
            if self.is_special(node) {
                self.unexpected_token(token);
                return;
            }
            // STEP 4: "Set node to the previous entry in the stack of open
            //          elements." STEP 5: "Return to the step labeled loop."
        }
    }
}
