//! Precondition checks.
//!
//! Malformed markup is never an error, but a caller handing an empty key to
//! an attribute lookup is. These helpers turn such misuse into a
//! [`ValidationError`] the caller can propagate with `?`.

use thiserror::Error;

/// A violated precondition on an argument passed by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A string argument that must carry content was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
    /// A boolean condition the caller had to satisfy was false.
    #[error("{0}")]
    Failed(String),
}

/// Fail with [`ValidationError::Empty`] if `value` is empty.
///
/// # Errors
///
/// Returns [`ValidationError::Empty`] naming `what` when `value` is empty.
pub const fn not_empty(value: &str, what: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::Empty(what))
    } else {
        Ok(())
    }
}

/// Fail with `message` unless `condition` holds.
///
/// # Errors
///
/// Returns [`ValidationError::Failed`] when `condition` is false.
pub fn is_true(condition: bool, message: &str) -> Result<(), ValidationError> {
    if condition {
        Ok(())
    } else {
        Err(ValidationError::Failed(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_rejected() {
        assert_eq!(not_empty("", "key"), Err(ValidationError::Empty("key")));
        assert!(not_empty("id", "key").is_ok());
    }

    #[test]
    fn message_is_carried_through() {
        let err = is_true(false, "index out of range").unwrap_err();
        assert_eq!(err.to_string(), "index out of range");
    }
}
