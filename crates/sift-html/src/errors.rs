//! Parse error tracking.
//!
//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! "The handling of parse errors is well-defined": the parser always
//! recovers. Errors are only recorded, into a list whose capacity is chosen
//! by the caller. A capacity of zero turns tracking off, which is the default.

use core::fmt;

use serde::Serialize;

/// A recovered parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// Character offset in the (newline-normalised) input.
    pub position: usize,
    /// Description of the error.
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

/// Bounded, append-only list of parse errors.
#[derive(Debug, Clone, Default)]
pub struct ParseErrorList {
    errors: Vec<ParseError>,
    max_size: usize,
}

impl ParseErrorList {
    /// A list holding at most `max_size` errors.
    #[must_use]
    pub const fn tracking(max_size: usize) -> Self {
        Self {
            errors: Vec::new(),
            max_size,
        }
    }

    /// A list that records nothing.
    #[must_use]
    pub const fn no_tracking() -> Self {
        Self::tracking(0)
    }

    /// Whether another error would be kept. Check before building a message.
    #[must_use]
    pub fn can_add_error(&self) -> bool {
        self.errors.len() < self.max_size
    }

    /// Record `error` if there is room; otherwise drop it.
    pub fn add(&mut self, error: ParseError) {
        if self.can_add_error() {
            self.errors.push(error);
        }
    }

    /// The configured capacity.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Recorded errors in the order they occurred.
    #[must_use]
    pub fn as_slice(&self) -> &[ParseError] {
        &self.errors
    }

    /// Iterate over recorded errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }

    /// Take the recorded errors.
    #[must_use]
    pub fn into_vec(self) -> Vec<ParseError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(position: usize) -> ParseError {
        ParseError {
            position,
            message: "unexpected-null-character".into(),
        }
    }

    #[test]
    fn disabled_by_default() {
        let mut list = ParseErrorList::default();
        assert!(!list.can_add_error());
        list.add(error(0));
        assert!(list.is_empty());
    }

    #[test]
    fn drops_past_capacity() {
        let mut list = ParseErrorList::tracking(2);
        for position in 0..5 {
            list.add(error(position));
        }
        assert_eq!(list.len(), 2);
        assert!(!list.can_add_error());
        assert_eq!(list.as_slice()[1].position, 1);
        assert_eq!(list.as_slice()[1].to_string(), "1: unexpected-null-character");
    }
}
