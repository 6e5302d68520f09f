//! The validation dispatcher and outcome normalization.

use serde_json::Value;
use tracing::trace;

use crate::combinators::{run_props, run_sequence};
use crate::context::ValidationContext;
use crate::deferred::{ResolveFuture, ResolveInput};
use crate::result::{Outcome, ValidationResult};
use crate::validator::Validator;

/// Normalizes a raw outcome into a result echoing `value`.
///
/// - [`Outcome::Missing`] is invalid.
/// - [`Outcome::Bool`] becomes the validity.
/// - [`Outcome::Deferred`] is invalid and pending on the handle.
/// - [`Outcome::Result`] keeps its props, details and pending state; its value
///   is replaced by `value`.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{normalize, Outcome, ValidationResult};
///
/// let result = normalize(Outcome::from(true), &json!("x"));
/// assert!(result.is_valid);
/// assert_eq!(result.value, json!("x"));
///
/// let partial = ValidationResult::invalid().with_prop("message", "too short");
/// let result = normalize(partial.into(), &json!("ab"));
/// assert_eq!(result.value, json!("ab"));
/// assert_eq!(result.message(), Some("too short"));
/// ```
pub fn normalize(outcome: Outcome, value: &Value) -> ValidationResult {
    match outcome {
        Outcome::Missing => ValidationResult::invalid().with_value(value.clone()),
        Outcome::Bool(is_valid) => ValidationResult::new(is_valid).with_value(value.clone()),
        Outcome::Deferred(deferred) => ValidationResult::invalid()
            .with_value(value.clone())
            .with_deferred(deferred),
        Outcome::Result(result) => result.with_value(value.clone()),
    }
}

/// Validates `value` synchronously.
///
/// Sequences validate like `every`, mappings like `props`. The result may be
/// pending; use [`validate_async`] to wait for every deferred validator.
pub fn validate(
    validator: &Validator,
    value: &Value,
    context: &ValidationContext,
) -> ValidationResult {
    trace!(kind = validator.kind(), "dispatching validator");
    match validator {
        Validator::Leaf(check) => normalize(check(value, context), value),
        Validator::Sequence(validators) => run_sequence(validators, value, context),
        Validator::Keyed(validators) => run_props(validators, value, context),
    }
}

/// Validates `value` and waits until no asynchronous work remains.
///
/// A deferred computation that fails rejects the returned future with its
/// error.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{validate_async, validators::required, ValidationContext};
///
/// let result = futures::executor::block_on(validate_async(
///     &required(),
///     &json!("Ada"),
///     &ValidationContext::new(),
/// ))
/// .unwrap();
/// assert!(result.is_valid);
/// assert!(!result.is_pending());
/// ```
pub fn validate_async(
    validator: &Validator,
    value: &Value,
    context: &ValidationContext,
) -> ResolveFuture {
    validate(validator, value, context).settle(ResolveInput::new())
}

/// Like [`validate_async`], reading the value through `getter`.
///
/// The getter supplies the value for the synchronous pass and is read again
/// when the resolution completes; the resolved result echoes the latest value,
/// so a caller can tell whether it still matches what it validated.
pub fn validate_async_from<F>(
    validator: &Validator,
    getter: F,
    context: &ValidationContext,
) -> ResolveFuture
where
    F: Fn() -> Value + Send + Sync + 'static,
{
    let value = getter();
    validate(validator, &value, context).settle(ResolveInput::new().with_getter(getter))
}

/// Returns true for values treated as absent: `null` and the empty string.
///
/// `0`, `false`, empty arrays and empty objects are not empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
