//! Character reference decoding.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! The tokenizer calls [`consume_character_reference`] right after consuming
//! an `&`. The decoder reads ahead on the [`CharacterSource`] and either
//! returns the replacement text or rewinds so the caller can emit the `&`
//! literally and carry on.

use super::character_source::CharacterSource;
use super::named_character_references::{longest_legacy_prefix, lookup_entity};

/// U+FFFD REPLACEMENT CHARACTER.
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// Code points 0x80 to 0x9F are read as Windows-1252, indexed from 0x80.
const WINDOWS_1252: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Map a parsed numeric reference to the character it stands for.
///
/// `None` means the digits overflowed.
fn numeric_replacement(value: Option<u32>, errors: &mut Vec<&'static str>) -> char {
    match value {
        None | Some(0) => {
            errors.push("character reference outside the unicode range");
            REPLACEMENT_CHARACTER
        }
        Some(v) if (0xD800..=0xDFFF).contains(&v) || v > 0x0010_FFFF => {
            errors.push("character reference outside the unicode range");
            REPLACEMENT_CHARACTER
        }
        Some(v @ 0x80..=0x9F) => {
            errors.push("control character reference");
            WINDOWS_1252[(v - 0x80) as usize]
        }
        Some(v) => char::from_u32(v).unwrap_or(REPLACEMENT_CHARACTER),
    }
}

/// Decode one character reference; the `&` has already been consumed.
///
/// Returns `None`, with the source rewound to just after the `&`, when the
/// text is not a reference: at end of input, before whitespace, `<`, `&` or
/// `additional_allowed`, or when no entity matches. Parse errors are pushed
/// onto `errors`.
pub fn consume_character_reference(
    source: &mut CharacterSource,
    additional_allowed: Option<char>,
    in_attribute: bool,
    errors: &mut Vec<&'static str>,
) -> Option<String> {
    let c = source.current()?;
    if Some(c) == additional_allowed || matches!(c, '\t' | '\n' | '\r' | '\u{000C}' | ' ' | '<' | '&')
    {
        return None;
    }

    source.mark();
    if source.match_consume("#") {
        // [§ 13.2.5.75 Numeric character reference state]
        let hex = source.match_consume_ignore_case("x");
        let digits = if hex {
            source.consume_hex_sequence()
        } else {
            source.consume_digit_sequence()
        };
        if digits.is_empty() {
            errors.push("absence of digits in numeric character reference");
            source.rewind_to_mark();
            return None;
        }
        if !source.match_consume(";") {
            errors.push("missing semicolon after character reference");
        }
        let value = u32::from_str_radix(&digits, if hex { 16 } else { 10 }).ok();
        return Some(numeric_replacement(value, errors).to_string());
    }

    // [§ 13.2.5.73 Named character reference state]
    let name = source.consume_letter_then_digit_sequence();
    if name.is_empty() {
        source.rewind_to_mark();
        return None;
    }
    if source.matches(";")
        && let Some(value) = lookup_entity(&name)
    {
        source.advance();
        return Some(value.to_string());
    }

    let terminated = source.matches(";");
    source.rewind_to_mark();
    let Some((prefix, value)) = longest_legacy_prefix(&name) else {
        if terminated {
            errors.push("unknown named character reference");
        }
        return None;
    };
    for _ in prefix.chars() {
        source.advance();
    }

    // "If the character reference was consumed as part of an attribute, and
    // the last character matched is not a U+003B SEMICOLON character (;), and
    // the next input character is either a U+003D EQUALS SIGN character (=)
    // or an ASCII alphanumeric, then, for historical reasons, flush code
    // points consumed as a character reference"
    if in_attribute
        && source
            .current()
            .is_some_and(|next| next == '=' || next.is_ascii_alphanumeric())
    {
        source.rewind_to_mark();
        return None;
    }
    errors.push("missing semicolon after character reference");
    Some(value.to_string())
}

/// Decode every character reference in `text`.
///
/// Unrecognised references are kept literally. With `in_attribute`, the
/// attribute-value rule for semicolon-less references applies.
#[must_use]
pub fn unescape(text: &str, in_attribute: bool) -> String {
    let mut source = CharacterSource::new(text);
    let mut out = String::with_capacity(text.len());
    let mut errors = Vec::new();
    while !source.is_empty() {
        out.push_str(&source.consume_to('&'));
        if source.match_consume("&") {
            match consume_character_reference(&mut source, None, in_attribute, &mut errors) {
                Some(value) => out.push_str(&value),
                None => out.push('&'),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &str, in_attribute: bool) -> (Option<String>, usize) {
        let mut source = CharacterSource::new(input);
        let mut errors = Vec::new();
        let value = consume_character_reference(&mut source, None, in_attribute, &mut errors);
        (value, source.pos())
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode("#65;", false), (Some("A".into()), 4));
        assert_eq!(decode("#x41", false), (Some("A".into()), 4));
        assert_eq!(decode("#X6a;", false), (Some("j".into()), 5));
        assert_eq!(decode("#0;", false).0.as_deref(), Some("\u{FFFD}"));
        assert_eq!(decode("#xD800;", false).0.as_deref(), Some("\u{FFFD}"));
        assert_eq!(decode("#x110000;", false).0.as_deref(), Some("\u{FFFD}"));
        assert_eq!(decode("#99999999999;", false).0.as_deref(), Some("\u{FFFD}"));
        assert_eq!(decode("#128;", false).0.as_deref(), Some("\u{20AC}"));
        assert_eq!(decode("#;", false), (None, 0));
    }

    #[test]
    fn named_references() {
        assert_eq!(decode("amp;x", false), (Some("&".into()), 4));
        assert_eq!(decode("ampx", false), (Some("&".into()), 3));
        assert_eq!(decode("notit;", false), (Some("\u{AC}".into()), 3));
        assert_eq!(decode("hellip;", false), (Some("\u{2026}".into()), 7));
        assert_eq!(decode("hellip", false), (None, 0));
        assert_eq!(decode("foo;", false), (None, 0));
        assert_eq!(decode(" amp;", false), (None, 0));
    }

    #[test]
    fn attribute_rule_keeps_literal() {
        assert_eq!(decode("amp=1", true), (None, 0));
        assert_eq!(decode("ampx", true), (None, 0));
        assert_eq!(decode("amp&", true), (Some("&".into()), 3));
        assert_eq!(decode("amp;=", true), (Some("&".into()), 4));
    }

    #[test]
    fn unescape_text() {
        assert_eq!(unescape("&amp;&#65;&#x41;", false), "&AA");
        assert_eq!(unescape("&foo; & &lt;b&gt;", false), "&foo; & <b>");
        assert_eq!(unescape("?a=1&copy=2", true), "?a=1&copy=2");
        assert_eq!(unescape("?a=1&copy=2", false), "?a=1\u{A9}=2");
    }
}
