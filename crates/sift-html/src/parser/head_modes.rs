//! Insertion modes up to the start of `body`, plus the "text" mode.

use sift_dom::{DoctypeData, Namespace, NodeId, NodeType, QuirksMode};

use super::core::{HtmlTreeBuilder, InsertionMode, split_leading_whitespace};
use super::quirks::{is_unexpected_doctype, quirks_mode_for_doctype};
use crate::tokenizer::{Token, TokenizerState};

impl HtmlTreeBuilder {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(super) fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            //  U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            //  RETURN (CR), or U+0020 SPACE: Ignore the token."
            Token::Character { text } => {
                let (_, rest) = split_leading_whitespace(text);
                if !rest.is_empty() {
                    self.initial_anything_else(&Token::character(rest));
                }
            }

            // "A comment token: Insert a comment as the last child of the
            //  Document object."
            Token::Comment { text, .. } => self.insert_comment(text, Some(NodeId::ROOT)),

            // "A DOCTYPE token"
            Token::Doctype {
                name,
                public_id,
                system_id,
                force_quirks,
            } => {
                if is_unexpected_doctype(name.as_deref(), public_id.as_deref(), system_id.as_deref())
                {
                    self.parse_error("Unexpected DOCTYPE");
                }

                // "Append a DocumentType node to the Document node, with its
                //  name set to the name given in the DOCTYPE token, or the
                //  empty string if the name was missing"
                let doctype = self.tree.alloc(NodeType::Doctype(DoctypeData {
                    name: self.settings.normalize_tag(name.as_deref().unwrap_or_default()),
                    public_id: public_id.clone().unwrap_or_default(),
                    system_id: system_id.clone().unwrap_or_default(),
                }));
                self.append_to(NodeId::ROOT, doctype);

                let mode = quirks_mode_for_doctype(
                    name.as_deref(),
                    public_id.as_deref(),
                    system_id.as_deref(),
                    *force_quirks,
                );
                self.tree.set_quirks_mode(mode);

                // "Then, switch the insertion mode to "before html"."
                self.insertion_mode = InsertionMode::BeforeHtml;
            }

            _ => self.initial_anything_else(token),
        }
    }

    /// "Anything else: If the document is not an iframe srcdoc document, then
    /// this is a parse error; if the parser cannot change the mode flag is
    /// false, set the Document to quirks mode. In any case, switch the
    /// insertion mode to "before html", then reprocess the token."
    fn initial_anything_else(&mut self, token: &Token) {
        self.unexpected_token(token);
        self.tree.set_quirks_mode(QuirksMode::Quirks);
        self.reprocess_in(InsertionMode::BeforeHtml, token);
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(super) fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            // "A DOCTYPE token: Parse error. Ignore the token."
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A comment token: Insert a comment as the last child of the
            //  Document object."
            Token::Comment { text, .. } => self.insert_comment(text, Some(NodeId::ROOT)),

            // Whitespace: "Ignore the token."
            Token::Character { text } => {
                let (_, rest) = split_leading_whitespace(text);
                if !rest.is_empty() {
                    self.before_html_anything_else(&Token::character(rest));
                }
            }

            // "A start tag whose tag name is "html": Create an element for the
            //  token in the HTML namespace, with the Document as the intended
            //  parent. Append it to the Document object. Put this element in
            //  the stack of open elements. Switch the insertion mode to
            //  "before head"."
            Token::StartTag { normal_name, .. } if normal_name == "html" => {
                let html = self.create_element_for_token(token, Namespace::Html);
                self.append_to(NodeId::ROOT, html);
                self.stack_of_open_elements.push(html);
                self.insertion_mode = InsertionMode::BeforeHead;
            }

            // "An end tag whose tag name is one of: "head", "body", "html",
            //  "br": Act as described in the "anything else" entry below."
            Token::EndTag { normal_name, .. }
                if !matches!(normal_name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.unexpected_token(token);
            }

            _ => self.before_html_anything_else(token),
        }
    }

    /// "Create an html element whose node document is the Document object.
    /// Append it to the Document object. Put this element in the stack of open
    /// elements. Switch the insertion mode to "before head", then reprocess
    /// the token."
    fn before_html_anything_else(&mut self, token: &Token) {
        let html = self.create_element_for_token(&Token::start_tag("html"), Namespace::Html);
        self.append_to(NodeId::ROOT, html);
        self.stack_of_open_elements.push(html);
        self.reprocess_in(InsertionMode::BeforeHead, token);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(super) fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { text } => {
                let (_, rest) = split_leading_whitespace(text);
                if !rest.is_empty() {
                    self.before_head_anything_else(&Token::character(rest));
                }
            }
            Token::Comment { text, .. } => self.insert_comment(text, None),
            Token::Doctype { .. } => self.unexpected_token(token),

            // "A start tag whose tag name is "html": Process the token using
            //  the rules for the "in body" insertion mode."
            Token::StartTag { normal_name, .. } if normal_name == "html" => {
                self.handle_in_body_mode(token);
            }

            // "A start tag whose tag name is "head": Insert an HTML element
            //  for the token. Set the head element pointer to the newly created
            //  head element. Switch the insertion mode to "in head"."
            Token::StartTag { normal_name, .. } if normal_name == "head" => {
                let head = self.insert_html_element(token);
                self.head_element_pointer = Some(head);
                self.insertion_mode = InsertionMode::InHead;
            }

            Token::EndTag { normal_name, .. }
                if !matches!(normal_name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.unexpected_token(token);
            }

            _ => self.before_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "head" start tag token with no
    /// attributes. Set the head element pointer to the newly created head
    /// element. Switch the insertion mode to "in head". Reprocess the current
    /// token."
    fn before_head_anything_else(&mut self, token: &Token) {
        let head = self.insert_html_element(&Token::start_tag("head"));
        self.head_element_pointer = Some(head);
        self.reprocess_in(InsertionMode::InHead, token);
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(super) fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            // Whitespace: "Insert the character."
            Token::Character { text } => {
                let (whitespace, rest) = split_leading_whitespace(text);
                self.insert_characters(whitespace);
                if !rest.is_empty() {
                    self.in_head_anything_else(&Token::character(rest));
                }
            }
            Token::Comment { text, .. } => self.insert_comment(text, None),
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { normal_name, .. } => match normal_name.as_str() {
                "html" => self.handle_in_body_mode(token),

                // "A start tag whose tag name is one of: "base", "basefont",
                //  "bgsound", "link": Insert an HTML element for the token.
                //  Immediately pop the current node off the stack of open
                //  elements."
                // "A start tag whose tag name is "meta"": the same; character
                // encodings are already decided for string input.
                "base" | "basefont" | "bgsound" | "link" | "meta" => {
                    let _ = self.insert_empty_element(token, Namespace::Html);
                }

                // "A start tag whose tag name is "title": Follow the generic
                //  RCDATA element parsing algorithm."
                "title" => self.parse_generic_text_element(token, TokenizerState::RCDATA),

                // "A start tag whose tag name is "noscript", if the scripting
                //  flag is disabled: Insert an HTML element for the token.
                //  Switch the insertion mode to "in head noscript"."
                "noscript" => {
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InHeadNoscript;
                }

                // "A start tag whose tag name is one of: "noframes", "style":
                //  Follow the generic raw text element parsing algorithm."
                "noframes" | "style" => {
                    self.parse_generic_text_element(token, TokenizerState::RAWTEXT);
                }

                // "A start tag whose tag name is "script""
                "script" => self.parse_generic_text_element(token, TokenizerState::ScriptData),

                // "A start tag whose tag name is "template""
                "template" => {
                    let _ = self.insert_html_element(token);
                    self.push_marker();
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InTemplate;
                    self.template_insertion_modes
                        .push(InsertionMode::InTemplate);
                }

                // "A start tag whose tag name is "head": Parse error. Ignore the
                //  token."
                "head" => self.unexpected_token(token),

                _ => self.in_head_anything_else(token),
            },

            Token::EndTag { normal_name, .. } => match normal_name.as_str() {
                // "An end tag whose tag name is "head": Pop the current node
                //  (which will be the head element) off the stack of open
                //  elements. Switch the insertion mode to "after head"."
                "head" => {
                    self.pop_current_node();
                    self.insertion_mode = InsertionMode::AfterHead;
                }
                "body" | "html" | "br" => self.in_head_anything_else(token),
                "template" => self.close_template(token),
                _ => self.unexpected_token(token),
            },

            Token::EndOfFile => self.in_head_anything_else(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack of
    /// open elements. Switch the insertion mode to "after head". Reprocess the
    /// token."
    fn in_head_anything_else(&mut self, token: &Token) {
        self.pop_current_node();
        self.reprocess_in(InsertionMode::AfterHead, token);
    }

    /// "An end tag whose tag name is "template"" in the "in head" mode.
    fn close_template(&mut self, token: &Token) {
        // "If there is no template element on the stack of open elements, then
        //  this is a parse error; ignore the token."
        if !self.stack_has("template") {
            self.unexpected_token(token);
            return;
        }

        // STEP 1: "Generate all implied end tags thoroughly."
        self.generate_all_implied_end_tags_thoroughly();
        // STEP 2: "If the current node is not a template element, then this is
        //          a parse error."
        if !self.current_node_is("template") {
            self.unexpected_token(token);
        }
        // STEP 3: "Pop elements from the stack of open elements until a
        //          template element has been popped from the stack."
        self.pop_until("template");
        // STEP 4: "Clear the list of active formatting elements up to the last
        //          marker."
        self.clear_active_formatting_elements_to_last_marker();
        // STEP 5: "Pop the current template insertion mode off the stack of
        //          template insertion modes."
        let _ = self.template_insertion_modes.pop();
        // STEP 6: "Reset the insertion mode appropriately."
        self.reset_insertion_mode_appropriately();
    }

    /// [§ 13.2.6.2 Parsing elements that contain only text](https://html.spec.whatwg.org/multipage/parsing.html#parsing-elements-that-contain-only-text)
    ///
    /// "The generic raw text element parsing algorithm and the generic RCDATA
    /// element parsing algorithm consist of the following steps."
    pub(super) fn parse_generic_text_element(&mut self, token: &Token, state: TokenizerState) {
        // STEP 1: "Insert an HTML element for the token."
        let _ = self.insert_html_element(token);
        // STEP 2: "If the algorithm that was invoked is the generic raw text
        //          element parsing algorithm, switch the tokenizer to the
        //          RAWTEXT state; otherwise the algorithm invoked was the
        //          generic RCDATA element parsing algorithm, switch the
        //          tokenizer to the RCDATA state."
        self.tokenizer.transition(state);
        // STEP 3: "Set the original insertion mode to the current insertion
        //          mode."
        self.original_insertion_mode = self.insertion_mode;
        // STEP 4: "Then, switch the insertion mode to "text"."
        self.insertion_mode = InsertionMode::Text;
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(super) fn handle_in_head_noscript_mode(&mut self, token: &Token) {
        match token {
            Token::Doctype { .. } => self.unexpected_token(token),
            Token::StartTag { normal_name, .. } if normal_name == "html" => {
                self.handle_in_body_mode(token);
            }

            // "An end tag whose tag name is "noscript": Pop the current node
            //  (which will be a noscript element) from the stack of open
            //  elements; the new current node will be a head element. Switch
            //  the insertion mode to "in head"."
            Token::EndTag { normal_name, .. } if normal_name == "noscript" => {
                self.pop_current_node();
                self.insertion_mode = InsertionMode::InHead;
            }

            // Whitespace, comments and the head-only start tags: "Process the
            // token using the rules for the "in head" insertion mode."
            Token::Character { text } => {
                let (whitespace, rest) = split_leading_whitespace(text);
                self.insert_characters(whitespace);
                if !rest.is_empty() {
                    self.in_head_noscript_anything_else(&Token::character(rest));
                }
            }
            Token::Comment { .. } => self.handle_in_head_mode(token),
            Token::StartTag { normal_name, .. }
                if matches!(
                    normal_name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                self.handle_in_head_mode(token);
            }

            // "A start tag whose tag name is one of: "head", "noscript"" and
            // "Any other end tag": "Parse error. Ignore the token."
            Token::StartTag { normal_name, .. }
                if matches!(normal_name.as_str(), "head" | "noscript") =>
            {
                self.unexpected_token(token);
            }
            Token::EndTag { normal_name, .. } if normal_name != "br" => {
                self.unexpected_token(token);
            }

            _ => self.in_head_noscript_anything_else(token),
        }
    }

    /// "Parse error. Pop the current node (which will be a noscript element)
    /// from the stack of open elements; the new current node will be a head
    /// element. Switch the insertion mode to "in head". Reprocess the token."
    fn in_head_noscript_anything_else(&mut self, token: &Token) {
        self.unexpected_token(token);
        self.pop_current_node();
        self.reprocess_in(InsertionMode::InHead, token);
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(super) fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { text } => {
                let (whitespace, rest) = split_leading_whitespace(text);
                self.insert_characters(whitespace);
                if !rest.is_empty() {
                    self.after_head_anything_else(&Token::character(rest));
                }
            }
            Token::Comment { text, .. } => self.insert_comment(text, None),
            Token::Doctype { .. } => self.unexpected_token(token),

            Token::StartTag { normal_name, .. } => match normal_name.as_str() {
                "html" => self.handle_in_body_mode(token),

                // "A start tag whose tag name is "body": Insert an HTML element
                //  for the token. Set the frameset-ok flag to "not ok". Switch
                //  the insertion mode to "in body"."
                "body" => {
                    let _ = self.insert_html_element(token);
                    self.frameset_ok = false;
                    self.insertion_mode = InsertionMode::InBody;
                }

                // "A start tag whose tag name is "frameset": Insert an HTML
                //  element for the token. Switch the insertion mode to "in
                //  frameset"."
                "frameset" => {
                    let _ = self.insert_html_element(token);
                    self.insertion_mode = InsertionMode::InFrameset;
                }

                // "A start tag whose tag name is one of: "base", "basefont",
                //  "bgsound", "link", "meta", "noframes", "script", "style",
                //  "template", "title""
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "template" | "title" => {
                    // STEP 1: "Parse error."
                    self.unexpected_token(token);
                    // STEP 2: "Push the node pointed to by the head element
                    //          pointer onto the stack of open elements."
                    let Some(head) = self.head_element_pointer else {
                        self.handle_in_head_mode(token);
                        return;
                    };
                    self.stack_of_open_elements.push(head);
                    // STEP 3: "Process the token using the rules for the "in
                    //          head" insertion mode."
                    self.handle_in_head_mode(token);
                    // STEP 4: "Remove the node pointed to by the head element
                    //          pointer from the stack of open elements. (It
                    //          might not be the current node at this point.)"
                    self.remove_from_stack(head);
                }

                "head" => self.unexpected_token(token),
                _ => self.after_head_anything_else(token),
            },

            Token::EndTag { normal_name, .. } => match normal_name.as_str() {
                "template" => self.handle_in_head_mode(token),
                "body" | "html" | "br" => self.after_head_anything_else(token),
                _ => self.unexpected_token(token),
            },

            Token::EndOfFile => self.after_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "body" start tag token with no
    /// attributes. Switch the insertion mode to "in body". Reprocess the
    /// current token."
    fn after_head_anything_else(&mut self, token: &Token) {
        let _ = self.insert_html_element(&Token::start_tag("body"));
        self.reprocess_in(InsertionMode::InBody, token);
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(super) fn handle_text_mode(&mut self, token: &Token) {
        match token {
            // "A character token: Insert the token's character."
            Token::Character { text } => self.insert_characters(text),

            // "An end-of-file token: Parse error. ... Pop the current node off
            //  the stack of open elements. Switch the insertion mode to the
            //  original insertion mode and reprocess the token."
            Token::EndOfFile => {
                self.unexpected_token(token);
                self.pop_current_node();
                self.reprocess_in(self.original_insertion_mode, token);
            }

            // "An end tag whose tag name is "script"" and "Any other end tag":
            // "Pop the current node off the stack of open elements. Switch the
            //  insertion mode to the original insertion mode."
            Token::EndTag { .. } => {
                self.pop_current_node();
                self.insertion_mode = self.original_insertion_mode;
            }

            Token::StartTag { .. } | Token::Comment { .. } | Token::Doctype { .. } => {}
        }
    }
}
