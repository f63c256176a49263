//! Helper functions for the tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! State transitions ("Switch to", "Reconsume in"), token emission, the
//! appropriate-end-tag check shared by RCDATA, RAWTEXT and script data, and
//! parse error recording.

use super::character_reference::{REPLACEMENT_CHARACTER, consume_character_reference};
use super::core::{Tokenizer, TokenizerState};
use super::token::{PendingDoctype, PendingTag, Token};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl Tokenizer {
    /// "Switch to the X state"
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// "Reconsume in the X state"
    ///
    /// The current character is processed again by the new state.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// [§ 13.1 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// CR never reaches the states, so it is not listed.
    pub(super) const fn is_whitespace_char(c: char) -> bool {
        matches!(c, ' ' | '\t' | '\n' | '\x0C')
    }
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl Tokenizer {
    /// "Emit the current input character as a character token."
    pub(super) fn emit_char(&mut self, c: char) {
        self.pending_chars.push(c);
    }

    pub(super) fn emit_str(&mut self, s: &str) {
        self.pending_chars.push_str(s);
    }

    /// Emit `c` and the rest of the run up to the next character in `stops`.
    pub(super) fn emit_run(&mut self, c: char, stops: &[char]) {
        self.pending_chars.push(c);
        let run = self.source.consume_to_any(stops);
        self.pending_chars.push_str(&run);
    }

    fn flush_chars(&mut self) {
        if !self.pending_chars.is_empty() {
            let text = std::mem::take(&mut self.pending_chars);
            self.ready.push_back(Token::Character { text });
        }
    }

    fn push_token(&mut self, token: Token) {
        self.flush_chars();
        self.ready.push_back(token);
    }

    /// "Emit the current tag token."
    pub(super) fn emit_tag(&mut self) {
        let Some(tag) = self.pending_tag.take() else {
            return;
        };
        let is_end = tag.is_end;
        let has_attributes = tag.has_attributes();
        let self_closing = tag.self_closing;
        let (token, unique) = tag.into_token();
        if !unique {
            self.error("duplicate-attribute");
        }
        if is_end {
            // "When an end tag token is emitted with attributes, that is an
            // end-tag-with-attributes parse error."
            if has_attributes {
                self.error("end-tag-with-attributes");
            }
            if self_closing {
                self.error("end-tag-with-trailing-solidus");
            }
        } else if let Token::StartTag { normal_name, .. } = &token {
            self.last_start_tag_name = Some(normal_name.clone());
        }
        self.push_token(token);
    }

    /// "Emit the comment token."
    pub(super) fn emit_comment(&mut self) {
        let token = Token::Comment {
            text: std::mem::take(&mut self.pending_comment),
            bogus: self.pending_comment_bogus,
        };
        self.pending_comment_bogus = false;
        self.push_token(token);
    }

    /// "Emit the current DOCTYPE token."
    pub(super) fn emit_doctype(&mut self) {
        let doctype = std::mem::take(&mut self.pending_doctype);
        self.push_token(doctype.into_token());
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof(&mut self) {
        self.push_token(Token::EndOfFile);
        self.eof_emitted = true;
    }

    /// "Create a new start tag token" / "Create a new end tag token"
    pub(super) fn create_tag(&mut self, is_end: bool) {
        self.pending_tag = Some(PendingTag::new(is_end));
    }

    /// "Create a comment token whose data is the empty string."
    pub(super) fn create_comment(&mut self, bogus: bool) {
        self.pending_comment.clear();
        self.pending_comment_bogus = bogus;
    }

    /// "Create a new DOCTYPE token."
    pub(super) fn create_doctype(&mut self) {
        self.pending_doctype = PendingDoctype::default();
    }

    /// "Append the current input character to the current tag token's tag name."
    pub(super) fn append_to_tag_name(&mut self, c: char) {
        if let Some(tag) = self.pending_tag.as_mut() {
            tag.name.push(c);
        }
    }

    pub(super) fn append_str_to_tag_name(&mut self, s: &str) {
        if let Some(tag) = self.pending_tag.as_mut() {
            tag.name.push_str(s);
        }
    }

    /// "Start a new attribute in the current tag token."
    pub(super) fn start_attribute(&mut self) {
        let unique = self
            .pending_tag
            .as_mut()
            .is_none_or(PendingTag::new_attribute);
        if !unique {
            self.error("duplicate-attribute");
        }
    }

    pub(super) fn append_to_attribute_name(&mut self, c: char) {
        if let Some(tag) = self.pending_tag.as_mut() {
            tag.append_attribute_name(c);
        }
    }

    pub(super) fn append_to_attribute_value(&mut self, c: char) {
        if let Some(tag) = self.pending_tag.as_mut() {
            tag.append_attribute_value(c);
        }
    }

    pub(super) fn append_str_to_attribute_value(&mut self, s: &str) {
        if let Some(tag) = self.pending_tag.as_mut() {
            tag.append_attribute_value_str(s);
        }
    }

    pub(super) fn mark_attribute_value_present(&mut self) {
        if let Some(tag) = self.pending_tag.as_mut() {
            tag.set_empty_attribute_value();
        }
    }

    pub(super) fn set_self_closing(&mut self) {
        if let Some(tag) = self.pending_tag.as_mut() {
            tag.self_closing = true;
        }
    }
}

// =============================================================================
// Character References
// =============================================================================

impl Tokenizer {
    /// Decode a reference after `&`, or `None` to keep the `&` literal.
    pub(super) fn consume_reference(
        &mut self,
        additional_allowed: Option<char>,
        in_attribute: bool,
    ) -> Option<String> {
        let mut messages = Vec::new();
        let decoded = consume_character_reference(
            &mut self.source,
            additional_allowed,
            in_attribute,
            &mut messages,
        );
        for message in messages {
            self.error(message);
        }
        decoded
    }

    /// "U+0000 NULL: This is an unexpected-null-character parse error."
    pub(super) fn null_replacement(&mut self) -> char {
        self.error("unexpected-null-character");
        REPLACEMENT_CHARACTER
    }
}

// =============================================================================
// RCDATA / RAWTEXT / Script Data End Tag Helpers
// =============================================================================

impl Tokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-end-tag-token)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any. If no start tag has been emitted from this tokenizer,
    /// then no end tag token is appropriate."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        match (&self.pending_tag, &self.last_start_tag_name) {
            (Some(tag), Some(last)) => tag.is_end && tag.name.eq_ignore_ascii_case(last),
            _ => false,
        }
    }

    /// "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS
    /// character token, and a character token for each of the characters in
    /// the temporary buffer (in the order they were added to the buffer).
    /// Reconsume in the [text] state."
    pub(super) fn end_tag_name_anything_else(&mut self, text_state: TokenizerState) {
        self.pending_tag = None;
        self.emit_str("</");
        let buffer = std::mem::take(&mut self.temporary_buffer);
        self.emit_str(&buffer);
        self.reconsume_in(text_state);
    }
}

// =============================================================================
// Parse Errors
// =============================================================================

impl Tokenizer {
    /// Record a tokenizer parse error at the current position.
    pub(super) fn error(&mut self, code: &str) {
        if self.errors.can_add_error() {
            let message = format!("{code} in state {}", self.state);
            self.record_error(message);
        }
    }

    /// Record an EOF error and emit the end-of-file token.
    pub(super) fn eof_error(&mut self, code: &str) {
        self.error(code);
        self.emit_eof();
    }
}
