//! Integration tests for the HTML tokenizer.

use sift_html::tokenizer::TokenizerState;
use sift_html::{ParseErrorList, Token, Tokenizer};

/// Helper to tokenize a string and return every token up to EOF
fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::new(input).collect()
}

/// Helper to concatenate the character runs of a token stream
fn characters(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::Character { text } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// Helper to drop character tokens
fn markup(tokens: &[Token]) -> Vec<&Token> {
    tokens
        .iter()
        .filter(|token| !matches!(token, Token::Character { .. }))
        .collect()
}

// ====================================================================
// Basic tokens
// ====================================================================

#[test]
fn test_plain_text_is_one_run() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens, vec![Token::character("Hello"), Token::EndOfFile]);
}

#[test]
fn test_eof_repeats_after_end() {
    let mut tokenizer = Tokenizer::new("");
    assert!(tokenizer.next_token().is_eof());
    assert!(tokenizer.next_token().is_eof());
    assert_eq!(Tokenizer::new("x").count(), 2);
}

#[test]
fn test_doctype_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
    );
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::Doctype {
            name,
            public_id,
            system_id,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert_eq!(public_id.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
            assert_eq!(
                system_id.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
            assert!(!force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_without_name_forces_quirks() {
    let tokens = tokenize("<!DOCTYPE>");
    assert!(matches!(
        &tokens[0],
        Token::Doctype {
            name: None,
            force_quirks: true,
            ..
        }
    ));
}

#[test]
fn test_start_tag_with_attributes() {
    let tokens = tokenize(r#"<DIV id="main" class=wide data-x hidden=''>"#);
    match &tokens[0] {
        Token::StartTag {
            name,
            normal_name,
            attributes,
            self_closing,
        } => {
            assert_eq!(name, "DIV");
            assert_eq!(normal_name, "div");
            assert!(!self_closing);
            assert_eq!(attributes.len(), 4);
            assert_eq!(attributes.get("id"), Some("main"));
            assert_eq!(attributes.get("class"), Some("wide"));
            assert_eq!(attributes.get("data-x"), Some(""));
            assert_eq!(attributes.get("hidden"), Some(""));
        }
        other => panic!("Expected StartTag token, got {other:?}"),
    }
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let tokens = tokenize("<p id=1 id=2>");
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes.len(), 1);
            assert_eq!(attributes.get("id"), Some("1"));
        }
        other => panic!("Expected StartTag token, got {other:?}"),
    }
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</Div>");
    assert!(matches!(
        &tokens[0],
        Token::EndTag { name, normal_name } if name == "Div" && normal_name == "div"
    ));
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    assert!(matches!(
        &tokens[0],
        Token::StartTag { normal_name, self_closing: true, .. } if normal_name == "br"
    ));
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hi -->");
    assert!(matches!(
        &tokens[0],
        Token::Comment { text, bogus: false } if text == " hi "
    ));
}

#[test]
fn test_question_mark_opens_bogus_comment() {
    let tokens = tokenize("<?xml version=\"1.0\"?>");
    assert!(matches!(
        &tokens[0],
        Token::Comment { text, bogus: true } if text == "?xml version=\"1.0\"?"
    ));
}

#[test]
fn test_stray_less_than_is_text() {
    let tokens = tokenize("a < b");
    assert_eq!(characters(&tokens), "a < b");
    assert_eq!(markup(&tokens), vec![&Token::EndOfFile]);
}

// ====================================================================
// Character references
// ====================================================================

#[test]
fn test_references_in_data() {
    let tokens = tokenize("a &amp; b &lt;c&#62; &#x41;");
    assert_eq!(characters(&tokens), "a & b <c> A");
}

#[test]
fn test_legacy_reference_without_semicolon() {
    let tokens = tokenize("&notit; &copy 2024");
    assert_eq!(characters(&tokens), "\u{AC}it; \u{A9} 2024");
}

#[test]
fn test_unknown_reference_is_literal() {
    let tokens = tokenize("&foo; & &#;");
    assert_eq!(characters(&tokens), "&foo; & &#;");
}

#[test]
fn test_attribute_reference_followed_by_equals_is_literal() {
    let tokens = tokenize(r#"<a href="?x=1&copy=2&amp;y=&lt;">"#);
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes.get("href"), Some("?x=1&copy=2&y=<"));
        }
        other => panic!("Expected StartTag token, got {other:?}"),
    }
}

// ====================================================================
// State switching
// ====================================================================

#[test]
fn test_rcdata_until_appropriate_end_tag() {
    let mut tokenizer = Tokenizer::new("a<b>&amp;</p></title>x");
    tokenizer.transition(TokenizerState::RCDATA);
    tokenizer.set_last_start_tag_name("title");
    let tokens: Vec<Token> = tokenizer.collect();
    assert_eq!(tokens[0], Token::character("a<b>&</p>"));
    assert!(tokens[1].is_end_tag("title"));
    assert_eq!(tokens[2], Token::character("x"));
}

#[test]
fn test_rawtext_keeps_references() {
    let mut tokenizer = Tokenizer::new("a &amp; <i></style>");
    tokenizer.transition(TokenizerState::RAWTEXT);
    tokenizer.set_last_start_tag_name("style");
    let tokens: Vec<Token> = tokenizer.collect();
    assert_eq!(tokens[0], Token::character("a &amp; <i>"));
    assert!(tokens[1].is_end_tag("style"));
}

#[test]
fn test_script_data_escape() {
    let mut tokenizer = Tokenizer::new("<!--<script></script>--></script>");
    tokenizer.transition(TokenizerState::ScriptData);
    tokenizer.set_last_start_tag_name("script");
    let tokens: Vec<Token> = tokenizer.collect();
    assert_eq!(characters(&tokens), "<!--<script></script>-->");
    assert_eq!(markup(&tokens).len(), 2);
    assert!(markup(&tokens)[0].is_end_tag("script"));
}

#[test]
fn test_plaintext_never_ends() {
    let mut tokenizer = Tokenizer::new("<b></plaintext>");
    tokenizer.transition(TokenizerState::PLAINTEXT);
    let tokens: Vec<Token> = tokenizer.collect();
    assert_eq!(tokens, vec![Token::character("<b></plaintext>"), Token::EndOfFile]);
}

#[test]
fn test_cdata_only_when_allowed() {
    let tokens = tokenize("<![CDATA[x<y]]>");
    assert!(matches!(
        &tokens[0],
        Token::Comment { text, bogus: true } if text == "[CDATA[x<y]]"
    ));

    let mut tokenizer = Tokenizer::new("<![CDATA[x<y]]>");
    tokenizer.set_allow_cdata(true);
    let tokens: Vec<Token> = tokenizer.collect();
    assert_eq!(characters(&tokens), "x<y");
}

// ====================================================================
// Errors
// ====================================================================

#[test]
fn test_errors_are_recorded_when_tracking() {
    let mut tokenizer = Tokenizer::with_errors("</>x", ParseErrorList::tracking(10));
    while !tokenizer.next_token().is_eof() {}
    let errors = tokenizer.into_errors();
    assert_eq!(errors.len(), 1);
    assert!(errors.as_slice()[0].message.starts_with("missing-end-tag-name"));
}

#[test]
fn test_errors_are_not_recorded_by_default() {
    let mut tokenizer = Tokenizer::new("</><p \"a>&#0;");
    while !tokenizer.next_token().is_eof() {}
    assert!(tokenizer.errors().is_empty());
}

#[test]
fn test_error_list_is_bounded() {
    let mut tokenizer = Tokenizer::with_errors("</></></></>", ParseErrorList::tracking(2));
    while !tokenizer.next_token().is_eof() {}
    assert_eq!(tokenizer.errors().len(), 2);
}
