//! Errors raised while building validators or resolving deferred results.

use std::error::Error as StdError;
use std::sync::Arc;

/// An error raised by the validation core.
///
/// Construction errors are returned the moment a combinator is built with an
/// argument of the wrong shape, before any value is validated. Rejections come
/// from a leaf validator's own deferred computation and are propagated unchanged
/// through every composite that awaits it.
///
/// `ValidatorError` is `Clone` so that a memoized deferred result can hand the
/// same failure to every caller awaiting it.
///
/// # Example
///
/// ```rust
/// use verdict::{every, validators::required, ValidatorError};
///
/// // `every` needs a sequence, not a single function
/// let error = every(required()).unwrap_err();
/// assert!(matches!(error, ValidatorError::InvalidValidator { combinator: "every", .. }));
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidatorError {
    /// A combinator was constructed with an argument of the wrong shape.
    #[error("{combinator} expects {expected}, got {got}")]
    InvalidValidator {
        /// The combinator being constructed (e.g. `every`, `form`).
        combinator: &'static str,
        /// The shape the combinator accepts.
        expected: &'static str,
        /// The shape it was given.
        got: &'static str,
    },

    /// A leaf validator's deferred computation failed.
    #[error("deferred validation rejected: {0}")]
    Rejected(Arc<dyn StdError + Send + Sync>),
}

impl ValidatorError {
    /// Wraps the failure of a leaf validator's deferred computation.
    pub fn rejected<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ValidatorError::Rejected(Arc::new(error))
    }

    /// Builds a rejection from a plain message.
    pub fn rejected_with(message: impl Into<String>) -> Self {
        let error: Box<dyn StdError + Send + Sync> = message.into().into();
        ValidatorError::Rejected(Arc::from(error))
    }

    /// Returns true if this error was raised while constructing a combinator.
    pub fn is_construction(&self) -> bool {
        matches!(self, ValidatorError::InvalidValidator { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_validator_display() {
        let error = ValidatorError::InvalidValidator {
            combinator: "form",
            expected: "a mapping of field validators",
            got: "sequence",
        };

        assert_eq!(
            error.to_string(),
            "form expects a mapping of field validators, got sequence"
        );
        assert!(error.is_construction());
    }

    #[test]
    fn test_rejected_with_message() {
        let error = ValidatorError::rejected_with("lookup timed out");

        assert_eq!(
            error.to_string(),
            "deferred validation rejected: lookup timed out"
        );
        assert!(!error.is_construction());
    }

    #[test]
    fn test_rejected_clone_shares_source() {
        let error = ValidatorError::rejected(std::fmt::Error);
        let cloned = error.clone();

        assert_eq!(error.to_string(), cloned.to_string());
    }
}
