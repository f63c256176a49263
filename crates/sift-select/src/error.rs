//! Selector compilation errors.

use thiserror::Error;

/// A query string that could not be compiled into an [`Evaluator`](crate::Evaluator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorParseError {
    /// The query, or a part of it that needs content, was blank.
    #[error("{0} must not be empty")]
    Empty(String),

    /// Input the grammar has no rule for.
    #[error("could not parse query '{query}': unexpected token at '{remainder}'")]
    UnexpectedToken {
        /// The full query being compiled.
        query: String,
        /// The unparsed input from the offending character on.
        remainder: String,
    },

    /// A `[` or `(` without its closing partner.
    #[error("did not find balanced marker at '{remainder}' (opened with '{open}')")]
    Unbalanced {
        /// The opening character.
        open: char,
        /// The input from the opening character on.
        remainder: String,
    },

    /// A `:lt`, `:gt` or `:eq` argument that is not a non-negative integer.
    #[error("index must be numeric, got '{0}'")]
    BadIndex(String),

    /// An `:nth-*` argument that is not `odd`, `even` or an `an+b` formula.
    #[error("could not parse nth-index '{0}': unexpected format")]
    BadFormula(String),

    /// A `:name` the grammar does not know.
    #[error("unknown pseudo-class ':{0}'")]
    UnknownPseudo(String),

    /// A `:matches`, `:matchesOwn` or `[attr~=...]` pattern that does not compile.
    #[error("invalid regex '{pattern}': {message}")]
    InvalidRegex {
        /// The pattern as written.
        pattern: String,
        /// The regex engine's explanation.
        message: String,
    },
}
