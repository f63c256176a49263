use strum_macros::Display;

use sift_dom::{Attributes, DomTree, ElementData, Namespace, NodeId, NodeType, Tag};

use super::foreign_content::{is_html_integration_point, is_mathml_text_integration_point};
use crate::errors::ParseErrorList;
use crate::settings::ParseSettings;
use crate::tokenizer::{Token, Tokenizer, TokenizerState};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
///
/// "The list of active formatting elements... is used to handle mis-nested
/// formatting element tags."
#[derive(Debug, Clone)]
pub enum ActiveFormattingElement {
    /// A formatting element entry: a, b, big, code, em, font, i, nobr, s,
    /// small, strike, strong, tt, u.
    Element {
        /// The element in the tree.
        node_id: NodeId,
        /// The start tag that created it, kept to recreate the element when
        /// reconstructing or during the adoption agency algorithm.
        token: Token,
    },
    /// "A marker is an entry in the list of active formatting elements that is
    /// distinct from any element."
    ///
    /// Pushed when entering applet, object, marquee, template, td, th and
    /// caption.
    Marker,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Builds a [`DomTree`] from the tokens of one [`Tokenizer`]. The builder
/// pulls tokens itself so that it can switch the tokenizer's state between
/// tokens (raw text elements, CDATA in foreign content).
///
/// One builder serves one parse. Nothing here is fatal: every token stream
/// produces a tree, and anomalies are recorded into the tokenizer's
/// [`ParseErrorList`].
pub struct HtmlTreeBuilder {
    pub(super) tokenizer: Tokenizer,
    pub(super) settings: ParseSettings,

    /// `NodeId::ROOT` is the Document node.
    pub(super) tree: DomTree,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    /// "the original insertion mode", restored when leaving "text" and
    /// "in table text".
    pub(super) original_insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stack-of-template-insertion-modes)
    pub(super) template_insertion_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Index 0 is the `html` element; the last entry is the current node.
    pub(super) stack_of_open_elements: Vec<NodeId>,

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    pub(super) active_formatting_elements: Vec<ActiveFormattingElement>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    pub(super) head_element_pointer: Option<NodeId>,
    pub(super) form_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#concept-frag-parse-context)
    /// The fragment parsing context element. Allocated in the tree but never
    /// attached.
    pub(super) context_element: Option<NodeId>,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    pub(super) frameset_ok: bool,

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    pub(super) foster_parenting: bool,

    /// [§ 13.2.6.4.10](https://html.spec.whatwg.org/multipage/parsing.html#concept-pending-table-char-tokens)
    /// "pending table character tokens"
    pub(super) pending_table_character_tokens: String,

    /// Set after `pre`, `listing` and `textarea` start tags: "If the next token
    /// is a U+000A LINE FEED (LF) character token, then ignore that token".
    pub(super) ignore_next_line_feed: bool,
}

impl HtmlTreeBuilder {
    /// Create a builder over `input`. Errors go into `errors`.
    #[must_use]
    pub fn new(
        input: &str,
        base_uri: &str,
        settings: ParseSettings,
        errors: ParseErrorList,
    ) -> Self {
        Self {
            tokenizer: Tokenizer::with_errors(input, errors),
            settings,
            tree: DomTree::with_base_uri(base_uri),
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: InsertionMode::Initial,
            template_insertion_modes: Vec::new(),
            stack_of_open_elements: Vec::new(),
            active_formatting_elements: Vec::new(),
            head_element_pointer: None,
            form_element_pointer: None,
            context_element: None,
            frameset_ok: true,
            foster_parenting: false,
            pending_table_character_tokens: String::new(),
            ignore_next_line_feed: false,
        }
    }

    /// Parse the whole input as a document.
    #[must_use]
    pub fn parse_document(mut self) -> (DomTree, ParseErrorList) {
        self.run();
        (self.tree, self.tokenizer.into_errors())
    }

    /// [§ 13.2.9 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// Parse the input as the contents of `context`; `None` parses as the
    /// contents of a `body` element. The parsed top-level nodes become the
    /// children of the returned tree's Document node.
    #[must_use]
    pub fn parse_fragment(mut self, context: Option<&ElementData>) -> (DomTree, ParseErrorList) {
        let context = context
            .cloned()
            .unwrap_or_else(|| ElementData::new(Tag::html("body"), Attributes::new()));
        let context_name = context.normal_name().to_string();
        let context_is_html = context.namespace == Namespace::Html;

        // STEP 4: "Set the state of the HTML parser's tokenization stage as
        //          follows, switching on the context element"
        if context_is_html {
            let state = match context_name.as_str() {
                "title" | "textarea" => TokenizerState::RCDATA,
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => TokenizerState::RAWTEXT,
                "script" => TokenizerState::ScriptData,
                "plaintext" => TokenizerState::PLAINTEXT,
                _ => TokenizerState::Data,
            };
            self.tokenizer.transition(state);
        }
        self.tokenizer.set_last_start_tag_name(&context_name);

        let context_id = self.tree.alloc(NodeType::Element(context));
        self.context_element = Some(context_id);

        // STEP 5: "Let root be the result of creating an element given
        //          document, "html", and the HTML namespace."
        // STEP 6: "Append root to document."
        // STEP 7: "Set up the parser's stack of open elements so that it
        //          contains just the single element root."
        let root = self.create_element("html", &Attributes::new(), Namespace::Html);
        self.append_to(NodeId::ROOT, root);
        self.stack_of_open_elements.push(root);

        // STEP 8: "If context is a template element, then push "in template"
        //          onto the stack of template insertion modes"
        if context_is_html && context_name == "template" {
            self.template_insertion_modes.push(InsertionMode::InTemplate);
        }

        // STEP 10: "Reset the parser's insertion mode appropriately."
        self.reset_insertion_mode_appropriately();

        // STEP 11: "Set the HTML parser's form element pointer to the nearest
        //           node to context that is a form element". Only the context
        //           itself is known here.
        if context_is_html && context_name == "form" {
            self.form_element_pointer = Some(context_id);
        }

        self.run();

        // STEP 14: "Return root's children, in tree order."
        self.move_children(root, NodeId::ROOT);
        self.tree.detach(root);
        (self.tree, self.tokenizer.into_errors())
    }

    /// Pull tokens until end of file has been processed.
    fn run(&mut self) {
        loop {
            let foreign = self
                .adjusted_current_node()
                .and_then(|id| self.tree.as_element(id))
                .is_some_and(|element| element.namespace != Namespace::Html);
            self.tokenizer.set_allow_cdata(foreign);

            let token = self.tokenizer.next_token();
            self.process_token(&token);
            if token.is_eof() {
                break;
            }
        }
    }

    // ====================================================================
    // Dispatch
    // ====================================================================

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// Also used to "reprocess the token".
    pub(super) fn process_token(&mut self, token: &Token) {
        if self.ignore_next_line_feed {
            self.ignore_next_line_feed = false;
            if let Token::Character { text } = token
                && let Some(rest) = text.strip_prefix('\n')
            {
                if !rest.is_empty() {
                    self.process_token(&Token::character(rest));
                }
                return;
            }
        }

        if self.use_insertion_mode_rules(token) {
            self.process_using_rules_for(self.insertion_mode, token);
        } else {
            self.process_in_foreign_content(token);
        }
    }

    /// "As each token is emitted from the tokenizer, the user agent must
    /// follow the appropriate steps from the following list"
    fn use_insertion_mode_rules(&self, token: &Token) -> bool {
        // "If the stack of open elements is empty"
        let Some(element) = self
            .adjusted_current_node()
            .and_then(|id| self.tree.as_element(id))
        else {
            return true;
        };

        // "If the adjusted current node is an element in the HTML namespace"
        // "If the token is an end-of-file token"
        if element.namespace == Namespace::Html || token.is_eof() {
            return true;
        }

        let start_tag = match token {
            Token::StartTag { normal_name, .. } => Some(normal_name.as_str()),
            _ => None,
        };
        let is_character = matches!(token, Token::Character { .. });

        // "If the adjusted current node is a MathML text integration point and
        //  the token is a start tag whose tag name is neither "mglyph" nor
        //  "malignmark"" / "... and the token is a character token"
        if is_mathml_text_integration_point(element)
            && (is_character || start_tag.is_some_and(|name| name != "mglyph" && name != "malignmark"))
        {
            return true;
        }

        // "If the adjusted current node is a MathML annotation-xml element and
        //  the token is a start tag whose tag name is "svg""
        if element.namespace == Namespace::MathMl
            && element.normal_name() == "annotation-xml"
            && start_tag == Some("svg")
        {
            return true;
        }

        // "If the adjusted current node is an HTML integration point and the
        //  token is a start tag" / "... and the token is a character token"
        is_html_integration_point(element) && (is_character || start_tag.is_some())
    }

    /// "process the token using the rules for" `mode`, without switching to it.
    pub(super) fn process_using_rules_for(&mut self, mode: InsertionMode, token: &Token) {
        match mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::InTable => self.handle_in_table_mode(token),
            InsertionMode::InTableText => self.handle_in_table_text_mode(token),
            InsertionMode::InCaption => self.handle_in_caption_mode(token),
            InsertionMode::InColumnGroup => self.handle_in_column_group_mode(token),
            InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
            InsertionMode::InRow => self.handle_in_row_mode(token),
            InsertionMode::InCell => self.handle_in_cell_mode(token),
            InsertionMode::InSelect => self.handle_in_select_mode(token),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table_mode(token),
            InsertionMode::InTemplate => self.handle_in_template_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset_mode(token),
        }
    }

    /// Switch to `mode` and reprocess `token`.
    pub(super) fn reprocess_in(&mut self, mode: InsertionMode, token: &Token) {
        self.insertion_mode = mode;
        self.process_token(token);
    }

    // ====================================================================
    // Parse errors
    // ====================================================================

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    pub(super) fn parse_error(&mut self, message: &str) {
        self.tokenizer.record_error(message);
    }

    /// Record that `token` was not expected in the current insertion mode.
    pub(super) fn unexpected_token(&mut self, token: &Token) {
        if self.tokenizer.can_add_error() {
            let kind = match token {
                Token::Doctype { .. } => "Doctype",
                Token::StartTag { .. } => "StartTag",
                Token::EndTag { .. } => "EndTag",
                Token::Comment { .. } => "Comment",
                Token::Character { .. } => "Character",
                Token::EndOfFile => "EOF",
            };
            let message = format!(
                "Unexpected {kind} token [{token}] when in state [{}]",
                self.insertion_mode
            );
            self.tokenizer.record_error(message);
        }
    }
}

/// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
///
/// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
/// or U+0020 SPACE."
pub(super) const fn is_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
}

/// Split a character run before its first non-whitespace character.
pub(super) fn split_leading_whitespace(text: &str) -> (&str, &str) {
    let index = text
        .find(|c: char| !is_whitespace(c))
        .unwrap_or(text.len());
    text.split_at(index)
}

/// Whether every character of `text` is ASCII whitespace.
pub(super) fn is_all_whitespace(text: &str) -> bool {
    text.chars().all(is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_first_non_whitespace() {
        assert_eq!(split_leading_whitespace("  \nab c"), ("  \n", "ab c"));
        assert_eq!(split_leading_whitespace("abc"), ("", "abc"));
        assert_eq!(split_leading_whitespace(" \t"), (" \t", ""));
        assert!(is_all_whitespace(" \r\n\x0C"));
        assert!(!is_all_whitespace(" x"));
    }
}
