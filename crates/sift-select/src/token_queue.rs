//! Character cursor over a query string.

use crate::error::SelectorParseError;

/// A forward-only cursor over the characters of a query.
#[derive(Debug, Clone)]
pub(crate) struct TokenQueue<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TokenQueue<'a> {
    pub(crate) const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The unconsumed input.
    pub(crate) fn remainder(&self) -> &'a str {
        self.input.get(self.pos..).unwrap_or_default()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    pub(crate) fn matches(&self, prefix: &str) -> bool {
        self.remainder().starts_with(prefix)
    }

    pub(crate) fn matches_any(&self, chars: &[char]) -> bool {
        self.peek().is_some_and(|c| chars.contains(&c))
    }

    pub(crate) fn consume(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume `prefix` if the input starts with it.
    pub(crate) fn consume_str(&mut self, prefix: &str) -> bool {
        if self.matches(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    /// Skip ASCII whitespace; true if any was skipped.
    pub(crate) fn consume_whitespace(&mut self) -> bool {
        let start = self.pos;
        let _ = self.consume_while(|c| c.is_ascii_whitespace());
        self.pos > start
    }

    pub(crate) fn consume_while(&mut self, mut accept: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek()
            && accept(c)
        {
            self.pos += c.len_utf8();
        }
        self.input.get(start..self.pos).unwrap_or_default()
    }

    /// A CSS identifier: letters, digits, `-` and `_`.
    pub(crate) fn consume_identifier(&mut self) -> &'a str {
        self.consume_while(|c| c.is_alphanumeric() || c == '-' || c == '_')
    }

    /// A type selector name, which may carry a `ns|` or `*|` prefix.
    pub(crate) fn consume_element_selector(&mut self) -> &'a str {
        let start = self.pos;
        let _ = self.consume_str("*|");
        let _ = self.consume_while(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '|'));
        self.input.get(start..self.pos).unwrap_or_default()
    }

    /// Consume a `open` ... `close` group and return what is between the
    /// markers. Nested groups, quoted strings and backslash escapes are
    /// skipped over when looking for the closing marker.
    pub(crate) fn chomp_balanced(
        &mut self,
        open: char,
        close: char,
    ) -> Result<&'a str, SelectorParseError> {
        let input = self.input;
        let start = self.pos;
        let unbalanced = || SelectorParseError::Unbalanced {
            open,
            remainder: input.get(start..).unwrap_or_default().to_string(),
        };

        if self.consume() != Some(open) {
            return Err(unbalanced());
        }
        let inner_start = self.pos;
        let mut depth = 1_usize;
        let mut quote: Option<char> = None;

        while let Some(c) = self.consume() {
            match (quote, c) {
                (_, '\\') => {
                    let _ = self.consume();
                }
                (Some(q), c) if c == q => quote = None,
                (None, '"' | '\'') => quote = Some(c),
                (None, c) if c == open => depth += 1,
                (None, c) if c == close => {
                    depth -= 1;
                    if depth == 0 {
                        let inner_end = self.pos - close.len_utf8();
                        return Ok(input.get(inner_start..inner_end).unwrap_or_default());
                    }
                }
                _ => {}
            }
        }
        Err(unbalanced())
    }
}

/// Remove backslash escapes: `\)` becomes `)`.
pub(crate) fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_group_skips_nesting_and_quotes() {
        let mut queue = TokenQueue::new("(a(b)')' \\)c)rest");
        assert_eq!(queue.chomp_balanced('(', ')'), Ok("a(b)')' \\)c"));
        assert_eq!(queue.remainder(), "rest");
    }

    #[test]
    fn unterminated_group_is_an_error() {
        let mut queue = TokenQueue::new("[href");
        assert!(matches!(
            queue.chomp_balanced('[', ']'),
            Err(SelectorParseError::Unbalanced { open: '[', .. })
        ));
    }

    #[test]
    fn unescape_drops_backslashes() {
        assert_eq!(unescape(r"a\)b\\c"), r"a)b\c");
    }
}
