//! Non-empty collections of invalid form fields.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::result::FieldError;

/// A non-empty collection of invalid form fields.
///
/// `FieldErrors` wraps a `NonEmptyVec<FieldError>` so that a failed
/// `Validation<_, FieldErrors>` always names at least one field. Collections
/// from separate forms (or separate passes) combine through `Semigroup`.
///
/// # Example
///
/// ```rust
/// use verdict::{FieldError, FieldErrors, ValidationResult};
/// use stillwater::prelude::*;
///
/// let first = FieldErrors::single(FieldError::new("email", ValidationResult::invalid()));
/// let second = FieldErrors::single(FieldError::new("name", ValidationResult::invalid()));
///
/// let combined = first.combine(second);
/// assert_eq!(combined.len(), 2);
/// assert!(combined.field("email").is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors(NonEmptyVec<FieldError>);

impl FieldErrors {
    /// Creates a collection holding a single field error.
    pub fn single(error: FieldError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a collection from a `Vec`, or `None` if the vec is empty.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        let mut errors = errors.into_iter();
        let head = errors.next()?;
        let collected = errors.fold(NonEmptyVec::singleton(head), |acc, error| {
            acc.combine(NonEmptyVec::singleton(error))
        });
        Some(Self(collected))
    }

    /// Returns the number of invalid fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the field errors, in form declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Returns the first field error.
    pub fn first(&self) -> &FieldError {
        self.0.head()
    }

    /// Returns the error recorded for `field_name`, if any.
    pub fn field(&self, field_name: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field_name == field_name)
    }

    /// Returns the names of the invalid fields.
    pub fn field_names(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field_name.as_str()).collect()
    }

    /// Converts this collection into a `Vec<FieldError>`.
    pub fn into_vec(self) -> Vec<FieldError> {
        self.0.into_vec()
    }
}

impl Semigroup for FieldErrors {
    fn combine(self, other: Self) -> Self {
        FieldErrors(self.0.combine(other.0))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} field(s) failed validation:", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<FieldErrors>();
    assert_sync::<FieldErrors>();
};
