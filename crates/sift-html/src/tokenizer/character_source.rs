//! Cursor over the input characters.
//!
//! [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
//!
//! "Before the tokenization stage, the input stream must be preprocessed by
//! normalizing newlines." CR LF pairs and lone CRs become a single LF when the
//! source is built, so states never see U+000D.

/// Indexed view of the input with a single mark for backtracking.
#[derive(Debug, Clone)]
pub struct CharacterSource {
    input: Vec<char>,
    pos: usize,
    mark: usize,
}

impl CharacterSource {
    /// Build a source over `input`, normalising newlines.
    #[must_use]
    pub fn new(input: &str) -> Self {
        let mut chars = Vec::with_capacity(input.len());
        let mut iter = input.chars().peekable();
        while let Some(c) = iter.next() {
            if c == '\r' {
                if iter.peek() == Some(&'\n') {
                    let _ = iter.next();
                }
                chars.push('\n');
            } else {
                chars.push(c);
            }
        }
        Self {
            input: chars,
            pos: 0,
            mark: 0,
        }
    }

    /// Current offset in characters.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Whether every character has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The character under the cursor, without consuming it.
    #[must_use]
    pub fn current(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// The character `offset` places past the cursor.
    #[must_use]
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    /// Move past the current character.
    pub fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
    }

    /// "Consume the next input character"
    pub fn consume(&mut self) -> Option<char> {
        let c = self.current();
        self.advance();
        c
    }

    /// Step back over the last consumed character.
    pub const fn unconsume(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// Remember the current position for [`rewind_to_mark`](Self::rewind_to_mark).
    pub const fn mark(&mut self) {
        self.mark = self.pos;
    }

    /// Return to the last mark.
    pub const fn rewind_to_mark(&mut self) {
        self.pos = self.mark;
    }

    /// Whether the input at the cursor starts with `seq`.
    #[must_use]
    pub fn matches(&self, seq: &str) -> bool {
        seq.chars()
            .enumerate()
            .all(|(i, c)| self.peek(i) == Some(c))
    }

    /// Whether the input at the cursor starts with `seq`, ignoring ASCII case.
    #[must_use]
    pub fn matches_ignore_case(&self, seq: &str) -> bool {
        seq.chars()
            .enumerate()
            .all(|(i, c)| self.peek(i).is_some_and(|p| p.eq_ignore_ascii_case(&c)))
    }

    /// Consume `seq` if the input starts with it.
    pub fn match_consume(&mut self, seq: &str) -> bool {
        if self.matches(seq) {
            self.pos += seq.chars().count();
            true
        } else {
            false
        }
    }

    /// Consume `seq` if the input starts with it, ignoring ASCII case.
    pub fn match_consume_ignore_case(&mut self, seq: &str) -> bool {
        if self.matches_ignore_case(seq) {
            self.pos += seq.chars().count();
            true
        } else {
            false
        }
    }

    /// Whether the current character is one of `chars`.
    #[must_use]
    pub fn matches_any(&self, chars: &[char]) -> bool {
        self.current().is_some_and(|c| chars.contains(&c))
    }

    /// Whether the current character is a letter.
    #[must_use]
    pub fn matches_letter(&self) -> bool {
        self.current().is_some_and(char::is_alphabetic)
    }

    /// Whether the current character is an ASCII digit.
    #[must_use]
    pub fn matches_digit(&self) -> bool {
        self.current().is_some_and(|c| c.is_ascii_digit())
    }

    fn consume_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.current().is_some_and(&keep) {
            self.pos += 1;
        }
        self.input[start..self.pos].iter().collect()
    }

    /// Consume up to (not including) `stop`, or to the end.
    pub fn consume_to(&mut self, stop: char) -> String {
        self.consume_while(|c| c != stop)
    }

    /// Consume up to the first of `stops`, or to the end.
    pub fn consume_to_any(&mut self, stops: &[char]) -> String {
        self.consume_while(|c| !stops.contains(&c))
    }

    /// Consume everything that is left.
    pub fn consume_to_end(&mut self) -> String {
        self.consume_while(|_| true)
    }

    /// Consume a run of letters.
    pub fn consume_letter_sequence(&mut self) -> String {
        self.consume_while(char::is_alphabetic)
    }

    /// Consume a run of letters followed by a run of ASCII digits (`frac12`).
    pub fn consume_letter_then_digit_sequence(&mut self) -> String {
        let mut seq = self.consume_letter_sequence();
        seq.push_str(&self.consume_digit_sequence());
        seq
    }

    /// Consume a run of ASCII hex digits.
    pub fn consume_hex_sequence(&mut self) -> String {
        self.consume_while(|c| c.is_ascii_hexdigit())
    }

    /// Consume a run of ASCII digits.
    pub fn consume_digit_sequence(&mut self) -> String {
        self.consume_while(|c| c.is_ascii_digit())
    }

    /// Whether `seq` occurs anywhere at or after the cursor.
    #[must_use]
    pub fn contains_ignore_case(&self, seq: &str) -> bool {
        let needle: Vec<char> = seq.chars().map(|c| c.to_ascii_lowercase()).collect();
        if needle.is_empty() {
            return true;
        }
        self.input[self.pos.min(self.input.len())..]
            .windows(needle.len())
            .any(|window| {
                window
                    .iter()
                    .zip(&needle)
                    .all(|(a, b)| a.to_ascii_lowercase() == *b)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newlines_are_normalised() {
        let mut source = CharacterSource::new("a\r\nb\rc");
        assert_eq!(source.consume_to_end(), "a\nb\nc");
        assert!(source.is_empty());
        assert_eq!(source.consume(), None);
    }

    #[test]
    fn sequences_and_marks() {
        let mut source = CharacterSource::new("frac12;rest");
        source.mark();
        assert_eq!(source.consume_letter_then_digit_sequence(), "frac12");
        assert!(source.match_consume(";"));
        source.rewind_to_mark();
        assert_eq!(source.pos(), 0);
        assert!(source.matches_ignore_case("FRAC"));
        assert_eq!(source.consume_to_any(&[';', 'x']), "frac12");
        assert_eq!(source.current(), Some(';'));
        source.advance();
        source.unconsume();
        assert_eq!(source.current(), Some(';'));
    }

    #[test]
    fn hex_and_digits() {
        let mut source = CharacterSource::new("1aF9g");
        assert!(source.matches_digit());
        assert_eq!(source.consume_hex_sequence(), "1aF9");
        assert!(source.matches_letter());
        assert!(source.contains_ignore_case("G"));
    }
}
