//! Table insertion modes, [§ 13.2.6.4.9](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
//! to [§ 13.2.6.4.15](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell).

use sift_dom::Namespace;

use super::core::{HtmlTreeBuilder, InsertionMode, is_all_whitespace, split_leading_whitespace};
use super::stack::Scope;
use crate::tokenizer::Token;

const TABLE_SECTIONS: &[&str] = &["tbody", "tfoot", "thead"];

impl HtmlTreeBuilder {
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    pub(super) fn handle_in_table_mode(&mut self, token: &Token) {
        match token {
            // "A character token, if the current node is table, tbody,
            //  template, tfoot, thead, or tr element: Let the pending table
            //  character tokens be an empty list of tokens. Set the original
            //  insertion mode to the current insertion mode. Switch the
            //  insertion mode to "in table text" and reprocess the token."
            Token::Character { .. }
                if self.current_node_is_one_of(&[
                    "table", "tbody", "template", "tfoot", "thead", "tr",
                ]) =>
            {
                self.pending_table_character_tokens.clear();
                self.original_insertion_mode = self.insertion_mode;
                self.reprocess_in(InsertionMode::InTableText, token);
            }

            Token::Comment { text, .. } => self.insert_comment(text, None),
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag {
                normal_name,
                attributes,
                ..
            } => match normal_name.as_str() {
                "caption" => {
                    self.clear_stack_back_to(&["table"]);
                    self.push_marker();
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InCaption;
                }
                "colgroup" => {
                    self.clear_stack_back_to(&["table"]);
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InColumnGroup;
                }
                "col" => {
                    self.clear_stack_back_to(&["table"]);
                    let _ = self.insert_html_element(&Token::start_tag("colgroup"));
                    self.reprocess_in(InsertionMode::InColumnGroup, token);
                }
                "tbody" | "tfoot" | "thead" => {
                    self.clear_stack_back_to(&["table"]);
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InTableBody;
                }
                "td" | "th" | "tr" => {
                    self.clear_stack_back_to(&["table"]);
                    let _ = self.insert_html_element(&Token::start_tag("tbody"));
                    self.reprocess_in(InsertionMode::InTableBody, token);
                }

                // "A start tag whose tag name is "table": Parse error. If the
                //  stack of open elements does not have a table element in
                //  table scope, ignore the token. Otherwise: Pop elements from
                //  this stack until a table element has been popped from the
                //  stack. Reset the insertion mode appropriately. Reprocess the
                //  token."
                "table" => {
                    self.unexpected_token(token);
                    if !self.has_element_in_scope("table", Scope::Table) {
                        return;
                    }
                    self.pop_until("table");
                    self.reset_insertion_mode_appropriately();
                    self.process_token(token);
                }

                "style" | "script" | "template" => self.handle_in_head_mode(token),

                // "A start tag whose tag name is "input": If the token does not
                //  have an attribute with the name "type", or if it does, but
                //  that attribute's value is not an ASCII case-insensitive match
                //  for the string "hidden", then: act as described in the
                //  "anything else" entry below."
                "input"
                    if attributes
                        .get_ignore_case("type")
                        .ok()
                        .flatten()
                        .is_some_and(|value| value.eq_ignore_ascii_case("hidden")) =>
                {
                    self.unexpected_token(token);
                    let _ = self.insert_empty_element(token, Namespace::Html);
                }

                // "A start tag whose tag name is "form": Parse error. If there
                //  is a template element on the stack of open elements, or if
                //  the form element pointer is not null, ignore the token."
                "form" => {
                    self.unexpected_token(token);
                    if self.stack_has("template") || self.form_element_pointer.is_some() {
                        return;
                    }
                    let form = self.insert_empty_element(token, Namespace::Html);
                    self.form_element_pointer = Some(form);
                }

                _ => self.in_table_anything_else(token),
            },

            Token::EndTag { normal_name, .. } => match normal_name.as_str() {
                "table" => {
                    if !self.has_element_in_scope("table", Scope::Table) {
                        self.unexpected_token(token);
                        return;
                    }
                    self.pop_until("table");
                    self.reset_insertion_mode_appropriately();
                }
                "body" | "caption" | "col" | "colgroup" | "html" | "tbody" | "td" | "tfoot"
                | "th" | "thead" | "tr" => self.unexpected_token(token),
                "template" => self.handle_in_head_mode(token),
                _ => self.in_table_anything_else(token),
            },

            Token::EndOfFile => self.handle_in_body_mode(token),

            Token::Character { .. } => self.in_table_anything_else(token),
        }
    }

    /// "Anything else: Parse error. Enable foster parenting, process the token
    /// using the rules for the "in body" insertion mode, and then disable
    /// foster parenting."
    fn in_table_anything_else(&mut self, token: &Token) {
        self.unexpected_token(token);
        self.foster_parenting = true;
        self.handle_in_body_mode(token);
        self.foster_parenting = false;
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(super) fn handle_in_table_text_mode(&mut self, token: &Token) {
        if let Token::Character { text } = token {
            // "A character token that is U+0000 NULL: Parse error. Ignore the
            //  token." / "Any other character token: Append the character
            //  token to the pending table character tokens list."
            if text.contains('\0') {
                self.parse_error("Unexpected null character");
            }
            self.pending_table_character_tokens
                .extend(text.chars().filter(|&c| c != '\0'));
            return;
        }

        // "Anything else: If any of the tokens in the pending table character
        //  tokens list are character tokens that are not ASCII whitespace,
        //  then this is a parse error: reprocess the character tokens in the
        //  pending table character tokens list using the rules given in the
        //  "anything else" entry in the "in table" insertion mode. Otherwise,
        //  insert the characters given by the pending table character tokens
        //  list."
        let pending = std::mem::take(&mut self.pending_table_character_tokens);
        if is_all_whitespace(&pending) {
            self.insert_characters(&pending);
        } else {
            self.in_table_anything_else(&Token::character(&pending));
        }

        // "Switch the insertion mode to the original insertion mode and
        //  reprocess the token."
        self.reprocess_in(self.original_insertion_mode, token);
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(super) fn handle_in_caption_mode(&mut self, token: &Token) {
        match token {
            Token::EndTag { normal_name, .. } if normal_name == "caption" => {
                let _ = self.close_caption(token);
            }

            Token::StartTag { normal_name, .. }
                if matches!(
                    normal_name.as_str(),
                    "caption"
                        | "col"
                        | "colgroup"
                        | "tbody"
                        | "td"
                        | "tfoot"
                        | "th"
                        | "thead"
                        | "tr"
                ) =>
            {
                if self.close_caption(token) {
                    self.process_token(token);
                }
            }
            Token::EndTag { normal_name, .. } if normal_name == "table" => {
                if self.close_caption(token) {
                    self.process_token(token);
                }
            }

            Token::EndTag { normal_name, .. }
                if matches!(
                    normal_name.as_str(),
                    "body"
                        | "col"
                        | "colgroup"
                        | "html"
                        | "tbody"
                        | "td"
                        | "tfoot"
                        | "th"
                        | "thead"
                        | "tr"
                ) =>
            {
                self.unexpected_token(token);
            }

            _ => self.handle_in_body_mode(token),
        }
    }

    /// "If the stack of open elements does not have a caption element in table
    /// scope, this is a parse error; ignore the token. Otherwise: Generate
    /// implied end tags. Now, if the current node is not a caption element,
    /// then this is a parse error. Pop elements from this stack until a caption
    /// element has been popped from the stack. Clear the list of active
    /// formatting elements up to the last marker. Switch the insertion mode to
    /// "in table"."
    ///
    /// Returns whether the caption was closed.
    fn close_caption(&mut self, token: &Token) -> bool {
        if !self.has_element_in_scope("caption", Scope::Table) {
            self.unexpected_token(token);
            return false;
        }
        self.generate_implied_end_tags(None);
        if !self.current_node_is("caption") {
            self.unexpected_token(token);
        }
        self.pop_until("caption");
        self.clear_active_formatting_elements_to_last_marker();
        self.insertion_mode = InsertionMode::InTable;
        true
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    pub(super) fn handle_in_column_group_mode(&mut self, token: &Token) {
        match token {
            Token::Character { text } => {
                let (whitespace, rest) = split_leading_whitespace(text);
                self.insert_characters(whitespace);
                if !rest.is_empty() {
                    self.in_column_group_anything_else(&Token::character(rest));
                }
            }
            Token::Comment { text, .. } => self.insert_comment(text, None),
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { normal_name, .. } => match normal_name.as_str() {
                "html" => self.handle_in_body_mode(token),
                // "Insert an HTML element for the token. Immediately pop the
                //  current node off the stack of open elements."
                "col" => {
                    let _ = self.insert_empty_element(token, Namespace::Html);
                }
                "template" => self.handle_in_head_mode(token),
                _ => self.in_column_group_anything_else(token),
            },

            Token::EndTag { normal_name, .. } => match normal_name.as_str() {
                // "If the current node is not a colgroup element, then this is
                //  a parse error; ignore the token. Otherwise, pop the current
                //  node from the stack of open elements. Switch the insertion
                //  mode to "in table"."
                "colgroup" => {
                    if !self.current_node_is("colgroup") {
                        self.unexpected_token(token);
                        return;
                    }
                    self.pop_current_node();
                    self.insertion_mode = InsertionMode::InTable;
                }
                "col" => self.unexpected_token(token),
                "template" => self.handle_in_head_mode(token),
                _ => self.in_column_group_anything_else(token),
            },

            Token::EndOfFile => self.handle_in_body_mode(token),
        }
    }

    fn in_column_group_anything_else(&mut self, token: &Token) {
        if !self.current_node_is("colgroup") {
            self.unexpected_token(token);
            return;
        }
        self.pop_current_node();
        self.reprocess_in(InsertionMode::InTable, token);
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    pub(super) fn handle_in_table_body_mode(&mut self, token: &Token) {
        match token {
            Token::StartTag { normal_name, .. } => match normal_name.as_str() {
                "tr" => {
                    self.clear_stack_back_to(TABLE_SECTIONS);
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InRow;
                }
                "th" | "td" => {
                    self.unexpected_token(token);
                    self.clear_stack_back_to(TABLE_SECTIONS);
                    let _ = self.insert_html_element(&Token::start_tag("tr"));
                    self.reprocess_in(InsertionMode::InRow, token);
                }
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" => {
                    self.leave_table_body(token);
                }
                _ => self.handle_in_table_mode(token),
            },

            Token::EndTag { normal_name, .. } => match normal_name.as_str() {
                "tbody" | "tfoot" | "thead" => {
                    if !self.has_element_in_scope(normal_name, Scope::Table) {
                        self.unexpected_token(token);
                        return;
                    }
                    self.clear_stack_back_to(TABLE_SECTIONS);
                    self.pop_current_node();
                    self.insertion_mode = InsertionMode::InTable;
                }
                "table" => self.leave_table_body(token),
                "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr" => {
                    self.unexpected_token(token);
                }
                _ => self.handle_in_table_mode(token),
            },

            _ => self.handle_in_table_mode(token),
        }
    }

    /// "If the stack of open elements does not have a tbody, thead, or tfoot
    /// element in table scope, this is a parse error; ignore the token.
    /// Otherwise: Clear the stack back to a table body context. Pop the current
    /// node from the stack of open elements. Switch the insertion mode to "in
    /// table". Reprocess the token."
    fn leave_table_body(&mut self, token: &Token) {
        if !self.has_any_in_scope(TABLE_SECTIONS, Scope::Table) {
            self.unexpected_token(token);
            return;
        }
        self.clear_stack_back_to(TABLE_SECTIONS);
        self.pop_current_node();
        self.reprocess_in(InsertionMode::InTable, token);
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    pub(super) fn handle_in_row_mode(&mut self, token: &Token) {
        match token {
            Token::StartTag { normal_name, .. } => match normal_name.as_str() {
                // "Clear the stack back to a table row context. Insert an HTML
                //  element for the token, then switch the insertion mode to "in
                //  cell". Insert a marker at the end of the list of active
                //  formatting elements."
                "th" | "td" => {
                    self.clear_stack_back_to(&["tr"]);
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InCell;
                    self.push_marker();
                }
                "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr" => {
                    if self.close_row(token) {
                        self.process_token(token);
                    }
                }
                _ => self.handle_in_table_mode(token),
            },

            Token::EndTag { normal_name, .. } => match normal_name.as_str() {
                "tr" => {
                    let _ = self.close_row(token);
                }
                "table" => {
                    if self.close_row(token) {
                        self.process_token(token);
                    }
                }
                "tbody" | "tfoot" | "thead" => {
                    if !self.has_element_in_scope(normal_name, Scope::Table) {
                        self.unexpected_token(token);
                        return;
                    }
                    if !self.has_element_in_scope("tr", Scope::Table) {
                        return;
                    }
                    if self.close_row(token) {
                        self.process_token(token);
                    }
                }
                "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" => {
                    self.unexpected_token(token);
                }
                _ => self.handle_in_table_mode(token),
            },

            _ => self.handle_in_table_mode(token),
        }
    }

    /// "If the stack of open elements does not have a tr element in table
    /// scope, this is a parse error; ignore the token. Otherwise: Clear the
    /// stack back to a table row context. Pop the current node (which will be a
    /// tr element) from the stack of open elements. Switch the insertion mode
    /// to "in table body"."
    ///
    /// Returns whether the row was closed.
    fn close_row(&mut self, token: &Token) -> bool {
        if !self.has_element_in_scope("tr", Scope::Table) {
            self.unexpected_token(token);
            return false;
        }
        self.clear_stack_back_to(&["tr"]);
        self.pop_current_node();
        self.insertion_mode = InsertionMode::InTableBody;
        true
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    pub(super) fn handle_in_cell_mode(&mut self, token: &Token) {
        match token {
            Token::EndTag { normal_name, .. } if matches!(normal_name.as_str(), "td" | "th") => {
                if !self.has_element_in_scope(normal_name, Scope::Table) {
                    self.unexpected_token(token);
                    return;
                }
                self.generate_implied_end_tags(None);
                if !self.current_node_is(normal_name) {
                    self.unexpected_token(token);
                }
                self.pop_until(normal_name);
                self.clear_active_formatting_elements_to_last_marker();
                self.insertion_mode = InsertionMode::InRow;
            }

            // "If the stack of open elements does not have a td or th element
            //  in table scope, then this is a parse error; ignore the token.
            //  (fragment case) Otherwise, close the cell and reprocess the
            //  token."
            Token::StartTag { normal_name, .. }
                if matches!(
                    normal_name.as_str(),
                    "caption"
                        | "col"
                        | "colgroup"
                        | "tbody"
                        | "td"
                        | "tfoot"
                        | "th"
                        | "thead"
                        | "tr"
                ) =>
            {
                if !self.has_any_in_scope(&["td", "th"], Scope::Table) {
                    self.unexpected_token(token);
                    return;
                }
                self.close_the_cell();
                self.process_token(token);
            }

            Token::EndTag { normal_name, .. }
                if matches!(
                    normal_name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html"
                ) =>
            {
                self.unexpected_token(token);
            }

            Token::EndTag { normal_name, .. }
                if matches!(
                    normal_name.as_str(),
                    "table" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                if !self.has_element_in_scope(normal_name, Scope::Table) {
                    self.unexpected_token(token);
                    return;
                }
                self.close_the_cell();
                self.process_token(token);
            }

            _ => self.handle_in_body_mode(token),
        }
    }
}
