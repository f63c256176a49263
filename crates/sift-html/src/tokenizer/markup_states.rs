//! Markup declaration states: comments, DOCTYPE and CDATA sections.
//!
//! [§ 13.2.5.41](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
//! to [§ 13.2.5.71](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state)

use super::character_reference::REPLACEMENT_CHARACTER;
use super::core::{Tokenizer, TokenizerState};

// =============================================================================
// Comments
// =============================================================================

impl Tokenizer {
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    ///
    /// Also where `<?xml ...?>` and `<!foo>` end up; the XML builder reads them
    /// back as declarations.
    pub(super) fn handle_bogus_comment_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_comment();
            }
            None => {
                self.emit_comment();
                self.emit_eof();
            }
            Some('\0') => {
                let c = self.null_replacement();
                self.pending_comment.push(c);
            }
            Some(c) => {
                self.pending_comment.push(c);
                let rest = self.source.consume_to_any(&['>', '\0']);
                self.pending_comment.push_str(&rest);
            }
        }
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// This state looks ahead instead of consuming, so the character taken by
    /// the main loop is put back first.
    pub(super) fn handle_markup_declaration_open_state(&mut self) {
        if self.current_input_character.is_some() {
            self.source.unconsume();
        }

        // "Two U+002D HYPHEN-MINUS characters (-) - Consume those two
        // characters, create a comment token whose data is the empty string,
        // and switch to the comment start state."
        if self.source.match_consume("--") {
            self.create_comment(false);
            self.switch_to(TokenizerState::CommentStart);
        }
        // "ASCII case-insensitive match for the word "DOCTYPE" - Consume those
        // characters and switch to the DOCTYPE state."
        else if self.source.match_consume_ignore_case("DOCTYPE") {
            self.switch_to(TokenizerState::DOCTYPE);
        }
        // "The string "[CDATA[" - Consume those characters. If there is an
        // adjusted current node and it is not an element in the HTML
        // namespace, then switch to the CDATA section state. Otherwise, this is
        // a cdata-in-html-content parse error. Create a comment token whose
        // data is the "[CDATA[" string. Switch to the bogus comment state."
        else if self.source.match_consume("[CDATA[") {
            if self.allow_cdata {
                self.switch_to(TokenizerState::CDATASection);
            } else {
                self.error("cdata-in-html-content");
                self.create_comment(true);
                self.pending_comment.push_str("[CDATA[");
                self.switch_to(TokenizerState::BogusComment);
            }
        }
        // "Anything else - This is an incorrectly-opened-comment parse error.
        // Create a comment token whose data is the empty string. Switch to the
        // bogus comment state (don't consume anything in the current state)."
        else {
            self.error("incorrectly-opened-comment");
            self.create_comment(true);
            self.switch_to(TokenizerState::BogusComment);
        }
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    pub(super) fn handle_comment_start_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentStartDash),
            // "This is an abrupt-closing-of-empty-comment parse error. Switch
            // to the data state. Emit the current comment token."
            Some('>') => {
                self.error("abrupt-closing-of-empty-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_comment();
            }
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    pub(super) fn handle_comment_start_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            Some('>') => {
                self.error("abrupt-closing-of-empty-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_comment();
            }
            None => self.comment_eof(),
            Some(_) => {
                self.pending_comment.push('-');
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    pub(super) fn handle_comment_state(&mut self) {
        match self.current_input_character {
            Some('<') => {
                self.pending_comment.push('<');
                self.switch_to(TokenizerState::CommentLessThanSign);
            }
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            Some('\0') => {
                let c = self.null_replacement();
                self.pending_comment.push(c);
            }
            None => self.comment_eof(),
            Some(c) => {
                self.pending_comment.push(c);
                let rest = self.source.consume_to_any(&['<', '-', '\0']);
                self.pending_comment.push_str(&rest);
            }
        }
    }

    /// [§ 13.2.5.46 Comment less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state)
    pub(super) fn handle_comment_less_than_sign_state(&mut self) {
        match self.current_input_character {
            Some('!') => {
                self.pending_comment.push('!');
                self.switch_to(TokenizerState::CommentLessThanSignBang);
            }
            Some('<') => self.pending_comment.push('<'),
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.47 Comment less-than sign bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state)
    pub(super) fn handle_comment_less_than_sign_bang_state(&mut self) {
        if self.current_input_character == Some('-') {
            self.switch_to(TokenizerState::CommentLessThanSignBangDash);
        } else {
            self.reconsume_in(TokenizerState::Comment);
        }
    }

    /// [§ 13.2.5.48 Comment less-than sign bang dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state)
    pub(super) fn handle_comment_less_than_sign_bang_dash_state(&mut self) {
        if self.current_input_character == Some('-') {
            self.switch_to(TokenizerState::CommentLessThanSignBangDashDash);
        } else {
            self.reconsume_in(TokenizerState::CommentEndDash);
        }
    }

    /// [§ 13.2.5.49 Comment less-than sign bang dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state)
    pub(super) fn handle_comment_less_than_sign_bang_dash_dash_state(&mut self) {
        match self.current_input_character {
            Some('>') | None => self.reconsume_in(TokenizerState::CommentEnd),
            // "This is a nested-comment parse error. Reconsume in the comment end state."
            Some(_) => {
                self.error("nested-comment");
                self.reconsume_in(TokenizerState::CommentEnd);
            }
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    pub(super) fn handle_comment_end_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            None => self.comment_eof(),
            Some(_) => {
                self.pending_comment.push('-');
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    pub(super) fn handle_comment_end_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_comment();
            }
            Some('!') => self.switch_to(TokenizerState::CommentEndBang),
            // "Append a U+002D HYPHEN-MINUS character (-) to the comment token's data."
            Some('-') => self.pending_comment.push('-'),
            None => self.comment_eof(),
            Some(_) => {
                self.pending_comment.push_str("--");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    pub(super) fn handle_comment_end_bang_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.pending_comment.push_str("--!");
                self.switch_to(TokenizerState::CommentEndDash);
            }
            // "This is an incorrectly-closed-comment parse error. Switch to the
            // data state. Emit the current comment token."
            Some('>') => {
                self.error("incorrectly-closed-comment");
                self.switch_to(TokenizerState::Data);
                self.emit_comment();
            }
            None => self.comment_eof(),
            Some(_) => {
                self.pending_comment.push_str("--!");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// "This is an eof-in-comment parse error. Emit the current comment token.
    /// Emit an end-of-file token."
    fn comment_eof(&mut self) {
        self.error("eof-in-comment");
        self.emit_comment();
        self.emit_eof();
    }
}

// =============================================================================
// DOCTYPE
// =============================================================================

impl Tokenizer {
    /// "Set the current DOCTYPE token's force-quirks flag to on."
    const fn force_quirks(&mut self) {
        self.pending_doctype.force_quirks = true;
    }

    /// "This is an eof-in-doctype parse error. Set the current DOCTYPE token's
    /// force-quirks flag to on. Emit the current DOCTYPE token. Emit an
    /// end-of-file token."
    fn doctype_eof(&mut self) {
        self.error("eof-in-doctype");
        self.force_quirks();
        self.emit_doctype();
        self.emit_eof();
    }

    /// The public or system identifier being built.
    fn doctype_identifier(&mut self, public: bool) -> &mut Option<String> {
        if public {
            &mut self.pending_doctype.public_id
        } else {
            &mut self.pending_doctype.system_id
        }
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    pub(super) fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPEName);
            }
            Some('>') => self.reconsume_in(TokenizerState::BeforeDOCTYPEName),
            // "Create a new DOCTYPE token. Set its force-quirks flag to on.
            // Emit the current token. Emit an end-of-file token."
            None => {
                self.create_doctype();
                self.doctype_eof();
            }
            Some(_) => {
                self.error("missing-whitespace-before-doctype-name");
                self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    pub(super) fn handle_before_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('\0') => {
                self.error("unexpected-null-character");
                self.create_doctype();
                self.pending_doctype.name = Some(REPLACEMENT_CHARACTER.to_string());
                self.switch_to(TokenizerState::DOCTYPEName);
            }
            // "This is a missing-doctype-name parse error. Create a new DOCTYPE
            // token. Set its force-quirks flag to on. Switch to the data state.
            // Emit the current token."
            Some('>') => {
                self.error("missing-doctype-name");
                self.create_doctype();
                self.force_quirks();
                self.switch_to(TokenizerState::Data);
                self.emit_doctype();
            }
            None => {
                self.create_doctype();
                self.doctype_eof();
            }
            // "Create a new DOCTYPE token. Set the token's name to the
            // lowercase version of the current input character."
            Some(c) => {
                self.create_doctype();
                self.pending_doctype.name = Some(c.to_ascii_lowercase().to_string());
                self.switch_to(TokenizerState::DOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    pub(super) fn handle_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterDOCTYPEName);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_doctype();
            }
            Some('\0') => {
                self.error("unexpected-null-character");
                self.pending_doctype
                    .name
                    .get_or_insert_with(String::new)
                    .push(REPLACEMENT_CHARACTER);
            }
            None => self.doctype_eof(),
            Some(c) => self
                .pending_doctype
                .name
                .get_or_insert_with(String::new)
                .push(c.to_ascii_lowercase()),
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    pub(super) fn handle_after_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_doctype();
            }
            None => self.doctype_eof(),
            // "If the six characters starting from the current input character
            // are an ASCII case-insensitive match for the word "PUBLIC", then
            // consume those characters and switch to the after DOCTYPE public
            // keyword state."
            Some(c) if c.eq_ignore_ascii_case(&'p') && self.source.matches_ignore_case("UBLIC") => {
                let _ = self.source.match_consume_ignore_case("UBLIC");
                self.switch_to(TokenizerState::AfterDOCTYPEPublicKeyword);
            }
            Some(c) if c.eq_ignore_ascii_case(&'s') && self.source.matches_ignore_case("YSTEM") => {
                let _ = self.source.match_consume_ignore_case("YSTEM");
                self.switch_to(TokenizerState::AfterDOCTYPESystemKeyword);
            }
            // "This is an invalid-character-sequence-after-doctype-name parse
            // error. Set the current DOCTYPE token's force-quirks flag to on.
            // Reconsume in the bogus DOCTYPE state."
            Some(_) => {
                self.error("invalid-character-sequence-after-doctype-name");
                self.force_quirks();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    /// and [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    pub(super) fn handle_after_doctype_keyword_state(&mut self, public: bool) {
        let (before_state, double_quoted, single_quoted) = Self::identifier_states(public);
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => self.switch_to(before_state),
            // "This is a missing-whitespace-after-doctype-public-keyword parse
            // error. Set the current DOCTYPE token's public identifier to the
            // empty string (not missing), then switch to the DOCTYPE public
            // identifier (double-quoted) state."
            Some(quote @ ('"' | '\'')) => {
                self.error(if public {
                    "missing-whitespace-after-doctype-public-keyword"
                } else {
                    "missing-whitespace-after-doctype-system-keyword"
                });
                *self.doctype_identifier(public) = Some(String::new());
                self.switch_to(if quote == '"' {
                    double_quoted
                } else {
                    single_quoted
                });
            }
            Some('>') => self.missing_identifier(public),
            None => self.doctype_eof(),
            Some(_) => self.missing_quote_before_identifier(public),
        }
    }

    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    /// and [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    pub(super) fn handle_before_doctype_identifier_state(&mut self, public: bool) {
        let (_, double_quoted, single_quoted) = Self::identifier_states(public);
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some(quote @ ('"' | '\'')) => {
                *self.doctype_identifier(public) = Some(String::new());
                self.switch_to(if quote == '"' {
                    double_quoted
                } else {
                    single_quoted
                });
            }
            Some('>') => self.missing_identifier(public),
            None => self.doctype_eof(),
            Some(_) => self.missing_quote_before_identifier(public),
        }
    }

    /// [§ 13.2.5.59](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    /// to [§ 13.2.5.66](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state):
    /// the quoted identifier states.
    pub(super) fn handle_doctype_identifier_quoted_state(&mut self, public: bool, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(if public {
                TokenizerState::AfterDOCTYPEPublicIdentifier
            } else {
                TokenizerState::AfterDOCTYPESystemIdentifier
            }),
            Some('\0') => {
                let c = self.null_replacement();
                self.doctype_identifier(public)
                    .get_or_insert_with(String::new)
                    .push(c);
            }
            // "This is an abrupt-doctype-public-identifier parse error. Set the
            // current DOCTYPE token's force-quirks flag to on. Switch to the
            // data state. Emit the current DOCTYPE token."
            Some('>') => {
                self.error(if public {
                    "abrupt-doctype-public-identifier"
                } else {
                    "abrupt-doctype-system-identifier"
                });
                self.force_quirks();
                self.switch_to(TokenizerState::Data);
                self.emit_doctype();
            }
            None => self.doctype_eof(),
            Some(c) => self
                .doctype_identifier(public)
                .get_or_insert_with(String::new)
                .push(c),
        }
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    pub(super) fn handle_after_doctype_public_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiers);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_doctype();
            }
            Some(quote @ ('"' | '\'')) => {
                self.error("missing-whitespace-between-doctype-public-and-system-identifiers");
                self.begin_system_identifier(quote);
            }
            None => self.doctype_eof(),
            Some(_) => self.missing_quote_before_identifier(false),
        }
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    pub(super) fn handle_between_doctype_identifiers_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_doctype();
            }
            Some(quote @ ('"' | '\'')) => self.begin_system_identifier(quote),
            None => self.doctype_eof(),
            Some(_) => self.missing_quote_before_identifier(false),
        }
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    pub(super) fn handle_after_doctype_system_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_doctype();
            }
            None => self.doctype_eof(),
            // "This is an unexpected-character-after-doctype-system-identifier
            // parse error. Reconsume in the bogus DOCTYPE state. (This does not
            // set the current DOCTYPE token's force-quirks flag to on.)"
            Some(_) => {
                self.error("unexpected-character-after-doctype-system-identifier");
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    pub(super) fn handle_bogus_doctype_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_doctype();
            }
            Some('\0') => self.error("unexpected-null-character"),
            None => {
                self.emit_doctype();
                self.emit_eof();
            }
            Some(_) => {}
        }
    }

    const fn identifier_states(
        public: bool,
    ) -> (TokenizerState, TokenizerState, TokenizerState) {
        if public {
            (
                TokenizerState::BeforeDOCTYPEPublicIdentifier,
                TokenizerState::DOCTYPEPublicIdentifierDoubleQuoted,
                TokenizerState::DOCTYPEPublicIdentifierSingleQuoted,
            )
        } else {
            (
                TokenizerState::BeforeDOCTYPESystemIdentifier,
                TokenizerState::DOCTYPESystemIdentifierDoubleQuoted,
                TokenizerState::DOCTYPESystemIdentifierSingleQuoted,
            )
        }
    }

    fn begin_system_identifier(&mut self, quote: char) {
        self.pending_doctype.system_id = Some(String::new());
        self.switch_to(if quote == '"' {
            TokenizerState::DOCTYPESystemIdentifierDoubleQuoted
        } else {
            TokenizerState::DOCTYPESystemIdentifierSingleQuoted
        });
    }

    /// "This is a missing-doctype-public-identifier parse error. Set the
    /// current DOCTYPE token's force-quirks flag to on. Switch to the data
    /// state. Emit the current DOCTYPE token."
    fn missing_identifier(&mut self, public: bool) {
        self.error(if public {
            "missing-doctype-public-identifier"
        } else {
            "missing-doctype-system-identifier"
        });
        self.force_quirks();
        self.switch_to(TokenizerState::Data);
        self.emit_doctype();
    }

    /// "This is a missing-quote-before-doctype-public-identifier parse error.
    /// Set the current DOCTYPE token's force-quirks flag to on. Reconsume in
    /// the bogus DOCTYPE state."
    fn missing_quote_before_identifier(&mut self, public: bool) {
        self.error(if public {
            "missing-quote-before-doctype-public-identifier"
        } else {
            "missing-quote-before-doctype-system-identifier"
        });
        self.force_quirks();
        self.reconsume_in(TokenizerState::BogusDOCTYPE);
    }
}

// =============================================================================
// CDATA
// =============================================================================

impl Tokenizer {
    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    ///
    /// CDATA content is emitted as ordinary character tokens.
    pub(super) fn handle_cdata_section_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.switch_to(TokenizerState::CDATASectionBracket),
            None => self.eof_error("eof-in-cdata"),
            Some(c) => self.emit_run(c, &[']']),
        }
    }

    /// [§ 13.2.5.70 CDATA section bracket state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-bracket-state)
    pub(super) fn handle_cdata_section_bracket_state(&mut self) {
        if self.current_input_character == Some(']') {
            self.switch_to(TokenizerState::CDATASectionEnd);
        } else {
            self.emit_char(']');
            self.reconsume_in(TokenizerState::CDATASection);
        }
    }

    /// [§ 13.2.5.71 CDATA section end state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state)
    pub(super) fn handle_cdata_section_end_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.emit_char(']'),
            Some('>') => self.switch_to(TokenizerState::Data),
            _ => {
                self.emit_str("]]");
                self.reconsume_in(TokenizerState::CDATASection);
            }
        }
    }
}
