//! Tag and attribute states.
//!
//! [§ 13.2.5.6](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
//! to [§ 13.2.5.8](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state),
//! [§ 13.2.5.32](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
//! to [§ 13.2.5.40](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
//!
//! Tag and attribute names keep the case they were written in; the tree
//! builder's settings decide whether to lowercase them.

use super::character_reference::REPLACEMENT_CHARACTER;
use super::core::{Tokenizer, TokenizerState};

const TAG_NAME_STOPS: &[char] = &['\t', '\n', '\x0C', ' ', '/', '>', '\0'];
const ATTRIBUTE_NAME_STOPS: &[char] = &['\t', '\n', '\x0C', ' ', '/', '>', '=', '"', '\'', '<', '\0'];

impl Tokenizer {
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    pub(super) fn handle_tag_open_state(&mut self) {
        match self.current_input_character {
            // "U+0021 EXCLAMATION MARK (!) - Switch to the markup declaration open state."
            Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpen),
            // "U+002F SOLIDUS (/) - Switch to the end tag open state."
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            // "ASCII alpha - Create a new start tag token, set its tag name to
            // the empty string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.create_tag(false);
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003F QUESTION MARK (?) - This is an
            // unexpected-question-mark-instead-of-tag-name parse error. Create
            // a comment token whose data is the empty string. Reconsume in the
            // bogus comment state."
            Some('?') => {
                self.error("unexpected-question-mark-instead-of-tag-name");
                self.create_comment(true);
                self.reconsume_in(TokenizerState::BogusComment);
            }
            // "EOF - This is an eof-before-tag-name parse error. Emit a U+003C
            // LESS-THAN SIGN character token and an end-of-file token."
            None => {
                self.error("eof-before-tag-name");
                self.emit_char('<');
                self.emit_eof();
            }
            // "Anything else - This is an invalid-first-character-of-tag-name
            // parse error. Emit a U+003C LESS-THAN SIGN character token.
            // Reconsume in the data state."
            Some(_) => {
                self.error("invalid-first-character-of-tag-name");
                self.emit_char('<');
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    pub(super) fn handle_end_tag_open_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_alphabetic() => {
                self.create_tag(true);
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-end-tag-name
            // parse error. Switch to the data state."
            Some('>') => {
                self.error("missing-end-tag-name");
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.error("eof-before-tag-name");
                self.emit_str("</");
                self.emit_eof();
            }
            Some(_) => {
                self.error("invalid-first-character-of-tag-name");
                self.create_comment(true);
                self.reconsume_in(TokenizerState::BogusComment);
            }
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    pub(super) fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            Some('\0') => {
                self.error("unexpected-null-character");
                self.append_to_tag_name(REPLACEMENT_CHARACTER);
            }
            // "EOF - This is an eof-in-tag parse error. Emit an end-of-file token."
            None => {
                self.pending_tag = None;
                self.eof_error("eof-in-tag");
            }
            Some(c) => {
                self.append_to_tag_name(c);
                let rest = self.source.consume_to_any(TAG_NAME_STOPS);
                self.append_str_to_tag_name(&rest);
            }
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    pub(super) fn handle_before_attribute_name_state(&mut self) {
        match self.current_input_character {
            // "Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {}
            // "U+002F SOLIDUS (/), U+003E GREATER-THAN SIGN (>), EOF -
            // Reconsume in the after attribute name state."
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
            // "U+003D EQUALS SIGN (=) - This is an
            // unexpected-equals-sign-before-attribute-name parse error. Start a
            // new attribute in the current tag token. Set that attribute's name
            // to the current input character, and its value to the empty
            // string. Switch to the attribute name state."
            Some('=') => {
                self.error("unexpected-equals-sign-before-attribute-name");
                self.start_attribute();
                self.append_to_attribute_name('=');
                self.switch_to(TokenizerState::AttributeName);
            }
            Some(_) => {
                self.start_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// Duplicate names are detected when the attribute is committed: "the
    /// complete attribute's name must be compared to the other attributes on
    /// the same token; if there is already an attribute on the token with the
    /// exact same name, then this is a duplicate-attribute parse error".
    pub(super) fn handle_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('\0') => {
                self.error("unexpected-null-character");
                self.append_to_attribute_name(REPLACEMENT_CHARACTER);
            }
            // "This is an unexpected-character-in-attribute-name parse error.
            // Treat it as per the "anything else" entry below."
            Some(c @ ('"' | '\'' | '<')) => {
                self.error("unexpected-character-in-attribute-name");
                self.append_to_attribute_name(c);
            }
            Some(c) => {
                self.append_to_attribute_name(c);
                let rest = self.source.consume_to_any(ATTRIBUTE_NAME_STOPS);
                for c in rest.chars() {
                    self.append_to_attribute_name(c);
                }
            }
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    pub(super) fn handle_after_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => {
                self.pending_tag = None;
                self.eof_error("eof-in-tag");
            }
            Some(_) => {
                self.start_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    pub(super) fn handle_before_attribute_value_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => {
                self.mark_attribute_value_present();
                self.switch_to(TokenizerState::AttributeValueDoubleQuoted);
            }
            Some('\'') => {
                self.mark_attribute_value_present();
                self.switch_to(TokenizerState::AttributeValueSingleQuoted);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-attribute-value
            // parse error. Switch to the data state. Emit the current tag token."
            Some('>') => {
                self.error("missing-attribute-value");
                self.mark_attribute_value_present();
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            _ => {
                self.mark_attribute_value_present();
                self.reconsume_in(TokenizerState::AttributeValueUnquoted);
            }
        }
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    /// and [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    pub(super) fn handle_attribute_value_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterAttributeValueQuoted),
            // "U+0026 AMPERSAND (&) - Set the return state to the attribute
            // value state. Switch to the character reference state."
            Some('&') => match self.consume_reference(Some(quote), true) {
                Some(decoded) => self.append_str_to_attribute_value(&decoded),
                None => self.append_to_attribute_value('&'),
            },
            Some('\0') => {
                let c = self.null_replacement();
                self.append_to_attribute_value(c);
            }
            None => {
                self.pending_tag = None;
                self.eof_error("eof-in-tag");
            }
            Some(c) => {
                self.append_to_attribute_value(c);
                let rest = self.source.consume_to_any(&[quote, '&', '\0']);
                self.append_str_to_attribute_value(&rest);
            }
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    pub(super) fn handle_attribute_value_unquoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('&') => match self.consume_reference(Some('>'), true) {
                Some(decoded) => self.append_str_to_attribute_value(&decoded),
                None => self.append_to_attribute_value('&'),
            },
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            Some('\0') => {
                let c = self.null_replacement();
                self.append_to_attribute_value(c);
            }
            // "This is an unexpected-character-in-unquoted-attribute-value
            // parse error. Treat it as per the "anything else" entry below."
            Some(c @ ('"' | '\'' | '<' | '=' | '`')) => {
                self.error("unexpected-character-in-unquoted-attribute-value");
                self.append_to_attribute_value(c);
            }
            None => {
                self.pending_tag = None;
                self.eof_error("eof-in-tag");
            }
            Some(c) => self.append_to_attribute_value(c),
        }
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    pub(super) fn handle_after_attribute_value_quoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => {
                self.pending_tag = None;
                self.eof_error("eof-in-tag");
            }
            // "This is a missing-whitespace-between-attributes parse error.
            // Reconsume in the before attribute name state."
            Some(_) => {
                self.error("missing-whitespace-between-attributes");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    pub(super) fn handle_self_closing_start_tag_state(&mut self) {
        match self.current_input_character {
            // "Set the self-closing flag of the current tag token. Switch to the
            // data state. Emit the current tag token."
            Some('>') => {
                self.set_self_closing();
                self.switch_to(TokenizerState::Data);
                self.emit_tag();
            }
            None => {
                self.pending_tag = None;
                self.eof_error("eof-in-tag");
            }
            Some(_) => {
                self.error("unexpected-solidus-in-tag");
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }
}
