//! Error types for validator construction and deferred resolution.
//!
//! This module provides [`ValidatorError`] for malformed combinator arguments and
//! rejected deferred results, and [`FieldErrors`] for collecting the invalid fields
//! of a form.

mod field_errors;
mod validator_error;

pub use field_errors::FieldErrors;
pub use validator_error::ValidatorError;
