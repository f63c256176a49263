//! Selector compiler.
//!
//! [Selectors Level 4 § 3 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! A query is a comma-separated list of complex selectors. Each complex
//! selector is a chain of compound selectors joined by combinators, and each
//! compound selector is a run of simple selectors with nothing between them.
//! The chain `A > B C` compiles to
//!
//! ```text
//! And[C, Parent(And[B, ImmediateParent(A)])]
//! ```
//!
//! so the subject is tested first and the combinators walk outwards from it.

use regex::Regex;

use crate::error::SelectorParseError;
use crate::evaluator::{Evaluator, NthKind};
use crate::token_queue::{TokenQueue, unescape};

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
const COMBINATORS: [char; 3] = ['>', '+', '~'];

/// Compiles query strings into [`Evaluator`] trees.
#[derive(Debug)]
pub struct QueryParser<'a> {
    query: &'a str,
    queue: TokenQueue<'a>,
}

impl<'a> QueryParser<'a> {
    /// Compile `query`.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorParseError`] when the query is blank, has an
    /// unterminated `[` or `(`, a combinator with nothing after it, an empty
    /// functional argument, a malformed index or `an+b` formula, an unknown
    /// pseudo-class, or a regex that does not compile.
    pub fn compile(query: &'a str) -> Result<Evaluator, SelectorParseError> {
        if query.trim().is_empty() {
            return Err(SelectorParseError::Empty("query".to_string()));
        }
        let mut parser = Self {
            query,
            queue: TokenQueue::new(query.trim()),
        };
        parser.parse()
    }

    /// [§ 3.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
    ///
    /// "A comma-separated list of selectors represents the union of all
    /// elements selected by each of the individual selectors in the list."
    fn parse(&mut self) -> Result<Evaluator, SelectorParseError> {
        let mut alternatives = vec![self.parse_complex()?];
        while self.queue.consume_str(",") {
            alternatives.push(self.parse_complex()?);
        }
        if !self.queue.is_empty() {
            return Err(self.unexpected());
        }

        if alternatives.len() == 1
            && let Some(only) = alternatives.pop()
        {
            return Ok(only);
        }
        Ok(Evaluator::Or(alternatives))
    }

    /// [§ 3.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
    fn parse_complex(&mut self) -> Result<Evaluator, SelectorParseError> {
        let _ = self.queue.consume_whitespace();

        // STEP 1: A leading combinator is relative to the evaluation root.
        let mut current = if let Some(combinator) = self.consume_combinator() {
            let subject = self.parse_operand(combinator)?;
            Evaluator::and(vec![subject, structural(combinator, Evaluator::Root)])
        } else {
            self.parse_compound()?
        };

        // STEP 2: Each further combinator wraps everything to its left.
        loop {
            let seen_whitespace = self.queue.consume_whitespace();
            if self.queue.is_empty() || self.queue.matches(",") {
                break;
            }
            let combinator = match self.consume_combinator() {
                Some(combinator) => combinator,
                // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
                // "A descendant combinator is whitespace that separates two compound selectors."
                None if seen_whitespace => ' ',
                None => return Err(self.unexpected()),
            };
            let subject = self.parse_operand(combinator)?;
            current = Evaluator::and(vec![subject, structural(combinator, current)]);
        }

        Ok(current)
    }

    fn consume_combinator(&mut self) -> Option<char> {
        if self.queue.matches_any(&COMBINATORS) {
            self.queue.consume()
        } else {
            None
        }
    }

    /// The compound selector to the right of `combinator`.
    fn parse_operand(&mut self, combinator: char) -> Result<Evaluator, SelectorParseError> {
        let _ = self.queue.consume_whitespace();
        if self.queue.is_empty() || self.queue.matches(",") || self.queue.matches_any(&COMBINATORS) {
            return Err(SelectorParseError::Empty(format!(
                "selector after '{combinator}' combinator"
            )));
        }
        self.parse_compound()
    }

    /// [§ 3.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
    fn parse_compound(&mut self) -> Result<Evaluator, SelectorParseError> {
        let mut simple = Vec::new();
        while let Some(c) = self.queue.peek()
            && !c.is_ascii_whitespace()
            && c != ','
            && !COMBINATORS.contains(&c)
        {
            simple.push(self.parse_simple()?);
        }
        if simple.is_empty() {
            return Err(self.unexpected());
        }
        Ok(Evaluator::and(simple))
    }

    fn parse_simple(&mut self) -> Result<Evaluator, SelectorParseError> {
        if self.queue.consume_str("#") {
            let id = self.queue.consume_identifier();
            if id.is_empty() {
                return Err(self.unexpected());
            }
            return Ok(Evaluator::Id(id.to_string()));
        }
        if self.queue.consume_str(".") {
            let class = self.queue.consume_identifier();
            if class.is_empty() {
                return Err(self.unexpected());
            }
            return Ok(Evaluator::Class(class.to_string()));
        }
        if self.queue.matches("[") {
            return self.parse_attribute();
        }
        if self.queue.matches("*|") || self.queue.peek().is_some_and(is_tag_start) {
            return Ok(self.parse_tag());
        }
        if self.queue.consume_str("*") {
            return Ok(Evaluator::AllElements);
        }
        if self.queue.consume_str(":") {
            return self.parse_pseudo();
        }
        Err(self.unexpected())
    }

    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// [§ 5.3 Namespaces in elemental selectors](https://www.w3.org/TR/selectors-4/#type-nmsp)
    ///
    /// `ns|tag` matches the name `ns:tag`; `*|tag` matches `tag` in any namespace.
    fn parse_tag(&mut self) -> Evaluator {
        let name = self.queue.consume_element_selector().trim().to_ascii_lowercase();
        if let Some(local) = name.strip_prefix("*|") {
            Evaluator::Or(vec![
                Evaluator::Tag(local.to_string()),
                Evaluator::TagEndsWith(format!(":{local}")),
            ])
        } else {
            Evaluator::Tag(name.replace('|', ":"))
        }
    }

    /// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    fn parse_attribute(&mut self) -> Result<Evaluator, SelectorParseError> {
        let inner = self.queue.chomp_balanced('[', ']')?.trim();

        // STEP 1: Split at the first operator.
        let Some((at, op)) = find_attribute_operator(inner) else {
            // [§ 6.1](https://www.w3.org/TR/selectors-4/#attribute-representation)
            // "[att] Represents an element with the att attribute, whatever the
            // value of the attribute."
            if let Some(prefix) = inner.strip_prefix('^') {
                let prefix = prefix.trim();
                if prefix.is_empty() {
                    return Err(SelectorParseError::Empty("attribute prefix".to_string()));
                }
                return Ok(Evaluator::AttributeStarting(prefix.to_ascii_lowercase()));
            }
            if inner.is_empty() {
                return Err(SelectorParseError::Empty("attribute key".to_string()));
            }
            return Ok(Evaluator::Attribute(inner.to_ascii_lowercase()));
        };

        // STEP 2: Normalise key and value.
        let key = inner.get(..at).unwrap_or_default().trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(SelectorParseError::Empty("attribute key".to_string()));
        }
        let raw_value = inner.get(at + op.len()..).unwrap_or_default().trim();
        if raw_value.is_empty() {
            return Err(SelectorParseError::Empty(format!("value of attribute '{key}'")));
        }
        let value = strip_quotes(raw_value);

        // STEP 3: Build the evaluator for the operator.
        Ok(match op {
            "=" => Evaluator::AttributeWithValue(key, value.to_lowercase()),
            "!=" => Evaluator::AttributeWithValueNot(key, value.to_lowercase()),
            "^=" => Evaluator::AttributeWithValueStarting(key, value.to_lowercase()),
            "$=" => Evaluator::AttributeWithValueEnding(key, value.to_lowercase()),
            "*=" => Evaluator::AttributeWithValueContaining(key, value.to_lowercase()),
            _ => Evaluator::AttributeWithValueMatching(key, compile_regex(value)?),
        })
    }

    /// [§ 4 Logical combinations](https://www.w3.org/TR/selectors-4/#logical-combination)
    /// [§ 14 Tree-structural pseudo-classes](https://www.w3.org/TR/selectors-4/#structural-pseudos)
    fn parse_pseudo(&mut self) -> Result<Evaluator, SelectorParseError> {
        let name = self.queue.consume_identifier().to_ascii_lowercase();
        if name.is_empty() {
            return Err(self.unexpected());
        }

        let evaluator = match name.as_str() {
            "root" => Evaluator::IsRoot,
            "first-child" => Evaluator::IsFirstChild,
            "last-child" => Evaluator::IsLastChild,
            "only-child" => Evaluator::IsOnlyChild,
            "only-of-type" => Evaluator::IsOnlyOfType,
            "empty" => Evaluator::IsEmpty,
            "first-of-type" => Evaluator::Nth {
                kind: NthKind::OfType,
                a: 0,
                b: 1,
            },
            "last-of-type" => Evaluator::Nth {
                kind: NthKind::LastOfType,
                a: 0,
                b: 1,
            },

            "lt" => Evaluator::IndexLessThan(parse_index(self.argument()?)?),
            "gt" => Evaluator::IndexGreaterThan(parse_index(self.argument()?)?),
            "eq" => Evaluator::IndexEquals(parse_index(self.argument()?)?),

            "nth-child" => self.nth(NthKind::Child)?,
            "nth-last-child" => self.nth(NthKind::LastChild)?,
            "nth-of-type" => self.nth(NthKind::OfType)?,
            "nth-last-of-type" => self.nth(NthKind::LastOfType)?,

            "has" => Evaluator::Has(Box::new(self.sub_query(":has(selector)")?)),
            "not" => Evaluator::Not(Box::new(self.sub_query(":not(selector)")?)),

            "contains" => Evaluator::ContainsText(self.search_text(":contains(text)")?),
            "containsown" => Evaluator::ContainsOwnText(self.search_text(":containsOwn(text)")?),
            "containsdata" => Evaluator::ContainsData(self.search_text(":containsData(data)")?),

            "matches" => Evaluator::Matches(self.pattern(":matches(regex)")?),
            "matchesown" => Evaluator::MatchesOwn(self.pattern(":matchesOwn(regex)")?),

            _ => return Err(SelectorParseError::UnknownPseudo(name)),
        };
        Ok(evaluator)
    }

    /// The parenthesised argument of a functional pseudo-class.
    fn argument(&mut self) -> Result<&'a str, SelectorParseError> {
        if !self.queue.matches("(") {
            return Err(self.unexpected());
        }
        self.queue.chomp_balanced('(', ')')
    }

    fn nth(&mut self, kind: NthKind) -> Result<Evaluator, SelectorParseError> {
        let (a, b) = parse_nth(self.argument()?)?;
        Ok(Evaluator::Nth { kind, a, b })
    }

    fn sub_query(&mut self, what: &str) -> Result<Evaluator, SelectorParseError> {
        let argument = self.argument()?;
        if argument.trim().is_empty() {
            return Err(SelectorParseError::Empty(format!("{what} argument")));
        }
        QueryParser::compile(argument)
    }

    fn search_text(&mut self, what: &str) -> Result<String, SelectorParseError> {
        let text = unescape(self.argument()?);
        if text.is_empty() {
            return Err(SelectorParseError::Empty(format!("{what} argument")));
        }
        Ok(text.to_lowercase())
    }

    fn pattern(&mut self, what: &str) -> Result<Regex, SelectorParseError> {
        let pattern = self.argument()?;
        if pattern.is_empty() {
            return Err(SelectorParseError::Empty(format!("{what} argument")));
        }
        compile_regex(pattern)
    }

    fn unexpected(&self) -> SelectorParseError {
        SelectorParseError::UnexpectedToken {
            query: self.query.to_string(),
            remainder: self.queue.remainder().to_string(),
        }
    }
}

fn is_tag_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '|'
}

/// The selector for `combinator` whose left-hand side is `left`.
fn structural(combinator: char, left: Evaluator) -> Evaluator {
    let left = Box::new(left);
    match combinator {
        '>' => Evaluator::ImmediateParent(left),
        '+' => Evaluator::ImmediatePreviousSibling(left),
        '~' => Evaluator::PreviousSibling(left),
        _ => Evaluator::Parent(left),
    }
}

/// Byte offset and text of the first attribute operator in `inner`.
fn find_attribute_operator(inner: &str) -> Option<(usize, &'static str)> {
    const TWO_CHAR: [&str; 5] = ["!=", "^=", "$=", "*=", "~="];
    for (at, c) in inner.char_indices() {
        let rest = inner.get(at..).unwrap_or_default();
        if let Some(op) = TWO_CHAR.iter().find(|op| rest.starts_with(**op)) {
            return Some((at, *op));
        }
        if c == '=' {
            return Some((at, "="));
        }
    }
    None
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(quote)
                .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn compile_regex(pattern: &str) -> Result<Regex, SelectorParseError> {
    Regex::new(pattern).map_err(|err| SelectorParseError::InvalidRegex {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}

/// A `:lt`, `:gt` or `:eq` index.
fn parse_index(argument: &str) -> Result<usize, SelectorParseError> {
    let trimmed = argument.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SelectorParseError::BadIndex(argument.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| SelectorParseError::BadIndex(argument.to_string()))
}

/// [§ 6 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Accepts `odd`, `even`, `an+b` with optional signs and whitespace around the
/// operator, `n`, `-n+b`, and a bare integer `b`.
fn parse_nth(argument: &str) -> Result<(i32, i32), SelectorParseError> {
    let bad = || SelectorParseError::BadFormula(argument.to_string());
    let formula = argument.trim().to_ascii_lowercase();

    match formula.as_str() {
        // "odd: Represents elements whose position is odd; equivalent to 2n+1."
        "odd" => return Ok((2, 1)),
        // "even: Represents elements whose position is even; equivalent to 2n."
        "even" => return Ok((2, 0)),
        _ => {}
    }

    let Some((step, offset)) = formula.split_once('n') else {
        let b = parse_signed(&formula).ok_or_else(bad)?;
        return Ok((0, b));
    };

    let a = match step.trim() {
        "" | "+" => 1,
        "-" => -1,
        digits => parse_signed(digits).ok_or_else(bad)?,
    };

    let offset: String = offset.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let b = if offset.is_empty() {
        0
    } else if offset.starts_with(['+', '-']) {
        parse_signed(&offset).ok_or_else(bad)?
    } else {
        return Err(bad());
    };

    Ok((a, b))
}

/// An integer with an optional `+` or `-` sign and at least one digit.
fn parse_signed(text: &str) -> Option<i32> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nth_formulas() {
        assert_eq!(parse_nth("odd"), Ok((2, 1)));
        assert_eq!(parse_nth(" EVEN "), Ok((2, 0)));
        assert_eq!(parse_nth("2n+1"), Ok((2, 1)));
        assert_eq!(parse_nth("2n + 1"), Ok((2, 1)));
        assert_eq!(parse_nth("-n+3"), Ok((-1, 3)));
        assert_eq!(parse_nth("n"), Ok((1, 0)));
        assert_eq!(parse_nth("+3n-2"), Ok((3, -2)));
        assert_eq!(parse_nth("0n+0"), Ok((0, 0)));
        assert_eq!(parse_nth("5"), Ok((0, 5)));
        assert_eq!(parse_nth("-2"), Ok((0, -2)));
    }

    #[test]
    fn malformed_nth_formulas() {
        for formula in ["", "x", "2n1", "n+", "2x+1", "++1", "n-n"] {
            assert!(
                matches!(parse_nth(formula), Err(SelectorParseError::BadFormula(_))),
                "{formula:?} should not parse"
            );
        }
    }

    #[test]
    fn indexes_are_non_negative_integers() {
        assert_eq!(parse_index(" 3 "), Ok(3));
        assert!(parse_index("-1").is_err());
        assert!(parse_index("one").is_err());
        assert!(parse_index("").is_err());
    }

    #[test]
    fn attribute_operator_prefers_two_characters() {
        assert_eq!(find_attribute_operator("href^=http"), Some((4, "^=")));
        assert_eq!(find_attribute_operator("a=b~=c"), Some((1, "=")));
        assert_eq!(find_attribute_operator("title"), None);
    }

    #[test]
    fn quotes_are_stripped_in_pairs() {
        assert_eq!(strip_quotes("\"a b\""), "a b");
        assert_eq!(strip_quotes("'x'"), "x");
        assert_eq!(strip_quotes("\"x'"), "\"x'");
        assert_eq!(strip_quotes("\""), "\"");
    }
}
