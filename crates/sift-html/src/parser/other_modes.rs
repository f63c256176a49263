//! Select, template, after-body and frameset insertion modes.

use sift_dom::{Namespace, NodeId};

use super::core::{HtmlTreeBuilder, InsertionMode, is_whitespace, split_leading_whitespace};
use super::stack::Scope;
use crate::tokenizer::Token;

impl HtmlTreeBuilder {
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(super) fn handle_in_select_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is U+0000 NULL: Parse error. Ignore the
            //  token." / "Any other character token: Insert the token's
            //  character."
            Token::Character { text } => {
                if text.contains('\0') {
                    self.parse_error("Unexpected null character");
                    self.insert_characters(&text.replace('\0', ""));
                } else {
                    self.insert_characters(text);
                }
            }
            Token::Comment { text, .. } => self.insert_comment(text, None),
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { normal_name, .. } => match normal_name.as_str() {
                "html" => self.handle_in_body_mode(token),
                "option" => {
                    if self.current_node_is("option") {
                        self.pop_current_node();
                    }
                    let _ = self.insert_html_element(token);
                }
                "optgroup" => {
                    if self.current_node_is("option") {
                        self.pop_current_node();
                    }
                    if self.current_node_is("optgroup") {
                        self.pop_current_node();
                    }
                    let _ = self.insert_html_element(token);
                }
                "hr" => {
                    if self.current_node_is("option") {
                        self.pop_current_node();
                    }
                    if self.current_node_is("optgroup") {
                        self.pop_current_node();
                    }
                    let _ = self.insert_empty_element(token, Namespace::Html);
                }
                // "Parse error. If the stack of open elements does not have a
                //  select element in select scope, ignore the token. (fragment
                //  case) Otherwise: Pop elements from the stack of open
                //  elements until a select element has been popped from the
                //  stack. Reset the insertion mode appropriately."
                "select" => {
                    self.unexpected_token(token);
                    if self.has_element_in_scope("select", Scope::Select) {
                        self.pop_until("select");
                        self.reset_insertion_mode_appropriately();
                    }
                }
                // The same, then "Reprocess the token."
                "input" | "keygen" | "textarea" => {
                    self.unexpected_token(token);
                    if self.has_element_in_scope("select", Scope::Select) {
                        self.pop_until("select");
                        self.reset_insertion_mode_appropriately();
                        self.process_token(token);
                    }
                }
                "script" | "template" => self.handle_in_head_mode(token),
                _ => self.unexpected_token(token),
            },

            Token::EndTag { normal_name, .. } => match normal_name.as_str() {
                // "First, if the current node is an option element, and the node
                //  immediately before it in the stack of open elements is an
                //  optgroup element, then pop the current node from the stack of
                //  open elements. If the current node is an optgroup element,
                //  then pop that node from the stack of open elements.
                //  Otherwise, this is a parse error; ignore the token."
                "optgroup" => {
                    let length = self.stack_of_open_elements.len();
                    if self.current_node_is("option")
                        && length >= 2
                        && self.is_html_named(self.stack_of_open_elements[length - 2], "optgroup")
                    {
                        self.pop_current_node();
                    }
                    if self.current_node_is("optgroup") {
                        self.pop_current_node();
                    } else {
                        self.unexpected_token(token);
                    }
                }
                "option" => {
                    if self.current_node_is("option") {
                        self.pop_current_node();
                    } else {
                        self.unexpected_token(token);
                    }
                }
                "select" => {
                    if !self.has_element_in_scope("select", Scope::Select) {
                        self.unexpected_token(token);
                        return;
                    }
                    self.pop_until("select");
                    self.reset_insertion_mode_appropriately();
                }
                "template" => self.handle_in_head_mode(token),
                _ => self.unexpected_token(token),
            },

            Token::EndOfFile => self.handle_in_body_mode(token),
        }
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(super) fn handle_in_select_in_table_mode(&mut self, token: &Token) {
        const TABLE_TAGS: &[&str] = &["caption", "table", "tbody", "tfoot", "thead", "tr", "td", "th"];

        match token {
            // "Parse error. Pop elements from the stack of open elements until a
            //  select element has been popped from the stack. Reset the
            //  insertion mode appropriately. Reprocess the token."
            Token::StartTag { normal_name, .. } if TABLE_TAGS.contains(&normal_name.as_str()) => {
                self.unexpected_token(token);
                self.pop_until("select");
                self.reset_insertion_mode_appropriately();
                self.process_token(token);
            }

            // "Parse error. If the stack of open elements does not have an
            //  element in table scope that is an HTML element with the same tag
            //  name as that of the token, then ignore the token." Otherwise as
            //  for the start tags.
            Token::EndTag { normal_name, .. } if TABLE_TAGS.contains(&normal_name.as_str()) => {
                self.unexpected_token(token);
                if !self.has_element_in_scope(normal_name, Scope::Table) {
                    return;
                }
                self.pop_until("select");
                self.reset_insertion_mode_appropriately();
                self.process_token(token);
            }

            _ => self.handle_in_select_mode(token),
        }
    }

    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    pub(super) fn handle_in_template_mode(&mut self, token: &Token) {
        match token {
            Token::Character { .. } | Token::Comment { .. } | Token::Doctype { .. } => {
                self.handle_in_body_mode(token);
            }

            Token::StartTag { normal_name, .. } => match normal_name.as_str() {
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "template" | "title" => self.handle_in_head_mode(token),
                "caption" | "colgroup" | "tbody" | "tfoot" | "thead" => {
                    self.switch_template_mode(InsertionMode::InTable, token);
                }
                "col" => self.switch_template_mode(InsertionMode::InColumnGroup, token),
                "tr" => self.switch_template_mode(InsertionMode::InTableBody, token),
                "td" | "th" => self.switch_template_mode(InsertionMode::InRow, token),
                _ => self.switch_template_mode(InsertionMode::InBody, token),
            },

            Token::EndTag { normal_name, .. } => {
                if normal_name == "template" {
                    self.handle_in_head_mode(token);
                } else {
                    self.unexpected_token(token);
                }
            }

            // "If there is no template element on the stack of open elements,
            //  then stop parsing. (fragment case) Otherwise, this is a parse
            //  error. Pop elements from the stack of open elements until a
            //  template element has been popped from the stack. Clear the list
            //  of active formatting elements up to the last marker. Pop the
            //  current template insertion mode off the stack of template
            //  insertion modes. Reset the insertion mode appropriately.
            //  Reprocess the token."
            Token::EndOfFile => {
                if !self.stack_has("template") {
                    return;
                }
                self.unexpected_token(token);
                self.pop_until("template");
                self.clear_active_formatting_elements_to_last_marker();
                let _ = self.template_insertion_modes.pop();
                self.reset_insertion_mode_appropriately();
                self.process_token(token);
            }
        }
    }

    /// "Pop the current template insertion mode off the stack of template
    /// insertion modes. Push `mode` onto the stack of template insertion modes
    /// so that it is the new current template insertion mode. Switch the
    /// insertion mode to `mode`, and reprocess the token."
    fn switch_template_mode(&mut self, mode: InsertionMode, token: &Token) {
        let _ = self.template_insertion_modes.pop();
        self.template_insertion_modes.push(mode);
        self.reprocess_in(mode, token);
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(super) fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            // Whitespace: "Process the token using the rules for the "in body"
            // insertion mode."
            Token::Character { text } => {
                let (whitespace, rest) = split_leading_whitespace(text);
                if !whitespace.is_empty() {
                    self.handle_in_body_mode(&Token::character(whitespace));
                }
                if !rest.is_empty() {
                    self.after_body_anything_else(&Token::character(rest));
                }
            }

            // "A comment token: Insert a comment as the last child of the first
            //  element in the stack of open elements (the html element)."
            Token::Comment { text, .. } => {
                let html = self
                    .stack_of_open_elements
                    .first()
                    .copied()
                    .unwrap_or(NodeId::ROOT);
                self.insert_comment(text, Some(html));
            }

            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { normal_name, .. } if normal_name == "html" => {
                self.handle_in_body_mode(token);
            }

            // "An end tag whose tag name is "html": If the parser was created
            //  as part of the HTML fragment parsing algorithm, this is a parse
            //  error; ignore the token. (fragment case) Otherwise, switch the
            //  insertion mode to "after after body"."
            Token::EndTag { normal_name, .. } if normal_name == "html" => {
                if self.context_element.is_some() {
                    self.unexpected_token(token);
                    return;
                }
                self.insertion_mode = InsertionMode::AfterAfterBody;
            }

            // "An end-of-file token: Stop parsing."
            Token::EndOfFile => {}

            _ => self.after_body_anything_else(token),
        }
    }

    /// "Parse error. Switch the insertion mode to "in body" and reprocess the
    /// token."
    fn after_body_anything_else(&mut self, token: &Token) {
        self.unexpected_token(token);
        self.reprocess_in(InsertionMode::InBody, token);
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(super) fn handle_in_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Character { text } => self.insert_frameset_whitespace(token, text),
            Token::Comment { text, .. } => self.insert_comment(text, None),
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { normal_name, .. } => match normal_name.as_str() {
                "html" => self.handle_in_body_mode(token),
                "frameset" => {
                    let _ = self.insert_html_element(token);
                }
                "frame" => {
                    let _ = self.insert_empty_element(token, Namespace::Html);
                }
                "noframes" => self.handle_in_head_mode(token),
                _ => self.unexpected_token(token),
            },

            // "If the current node is the root html element, then this is a
            //  parse error; ignore the token. (fragment case) Otherwise, pop the
            //  current node from the stack of open elements. If the parser was
            //  not created as part of the HTML fragment parsing algorithm
            //  (fragment case), and the current node is no longer a frameset
            //  element, then switch the insertion mode to "after frameset"."
            Token::EndTag { normal_name, .. } if normal_name == "frameset" => {
                if self.stack_of_open_elements.len() <= 1 {
                    self.unexpected_token(token);
                    return;
                }
                self.pop_current_node();
                if self.context_element.is_none() && !self.current_node_is("frameset") {
                    self.insertion_mode = InsertionMode::AfterFrameset;
                }
            }

            // "An end-of-file token: If the current node is not the root html
            //  element, then this is a parse error. Stop parsing."
            Token::EndOfFile => {
                if self.stack_of_open_elements.len() > 1 {
                    self.unexpected_token(token);
                }
            }

            Token::EndTag { .. } => self.unexpected_token(token),
        }
    }

    /// Frameset modes keep only whitespace characters: "Insert the character"
    /// for whitespace, "Parse error. Ignore the token." for anything else.
    fn insert_frameset_whitespace(&mut self, token: &Token, text: &str) {
        let whitespace: String = text.chars().filter(|&c| is_whitespace(c)).collect();
        if whitespace.len() != text.len() {
            self.unexpected_token(token);
        }
        self.insert_characters(&whitespace);
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(super) fn handle_after_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Character { text } => self.insert_frameset_whitespace(token, text),
            Token::Comment { text, .. } => self.insert_comment(text, None),
            Token::StartTag { normal_name, .. } if normal_name == "html" => {
                self.handle_in_body_mode(token);
            }
            Token::EndTag { normal_name, .. } if normal_name == "html" => {
                self.insertion_mode = InsertionMode::AfterAfterFrameset;
            }
            Token::StartTag { normal_name, .. } if normal_name == "noframes" => {
                self.handle_in_head_mode(token);
            }
            Token::EndOfFile => {}
            _ => self.unexpected_token(token),
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(super) fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            // "A comment token: Insert a comment as the last child of the
            //  Document object."
            Token::Comment { text, .. } => self.insert_comment(text, Some(NodeId::ROOT)),

            // "A DOCTYPE token", whitespace, "A start tag whose tag name is
            // "html"": "Process the token using the rules for the "in body"
            // insertion mode."
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::StartTag { normal_name, .. } if normal_name == "html" => {
                self.handle_in_body_mode(token);
            }
            Token::Character { text } => {
                let (whitespace, rest) = split_leading_whitespace(text);
                if !whitespace.is_empty() {
                    self.handle_in_body_mode(&Token::character(whitespace));
                }
                if !rest.is_empty() {
                    self.after_body_anything_else(&Token::character(rest));
                }
            }

            Token::EndOfFile => {}

            _ => self.after_body_anything_else(token),
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(super) fn handle_after_after_frameset_mode(&mut self, token: &Token) {
        match token {
            Token::Comment { text, .. } => self.insert_comment(text, Some(NodeId::ROOT)),
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::StartTag { normal_name, .. } if normal_name == "html" => {
                self.handle_in_body_mode(token);
            }
            Token::Character { text } => {
                let (whitespace, rest) = split_leading_whitespace(text);
                if !whitespace.is_empty() {
                    self.handle_in_body_mode(&Token::character(whitespace));
                }
                if !rest.is_empty() {
                    self.unexpected_token(token);
                }
            }
            Token::StartTag { normal_name, .. } if normal_name == "noframes" => {
                self.handle_in_head_mode(token);
            }
            Token::EndOfFile => {}
            _ => self.unexpected_token(token),
        }
    }
}
