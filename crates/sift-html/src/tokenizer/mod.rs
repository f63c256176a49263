//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard on top of a [`CharacterSource`].

/// Character reference decoding per § 13.2.5.72 to § 13.2.5.80.
pub mod character_reference;
/// Cursor over the newline-normalised input.
pub mod character_source;
/// The tokenizer struct, its state enum and the main loop.
pub mod core;
mod helpers;
mod markup_states;
/// Named character reference table per § 13.5.
pub mod named_character_references;
mod tag_states;
mod text_states;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::{Tokenizer, TokenizerState};
pub use character_reference::unescape;
pub use character_source::CharacterSource;
pub use token::Token;
