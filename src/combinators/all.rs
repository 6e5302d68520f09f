//! `all` and `each`: sequences that always run every validator.

use std::sync::Arc;

use serde_json::Value;

use super::{empty_list, expect_sequence, fold_exhaustive, spread_append, Children, CurrentFn};
use crate::context::ValidationContext;
use crate::error::ValidatorError;
use crate::middleware::{Pipeline, ReduceCore};
use crate::props::PropsSource;
use crate::result::{ValidationResult, ALL, EACH};
use crate::validate::validate;
use crate::validator::Validator;

/// Creates a validator that runs every validator and passes when all pass.
///
/// Unlike [`every`](crate::every), no validator is skipped. Deferred children
/// are resolved together. `all` applies middleware from its props and from the
/// context.
///
/// # Errors
///
/// Returns [`ValidatorError::InvalidValidator`] unless `validators` is a
/// sequence.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{all, validators::{min_length, pattern, required}, Validator};
///
/// let password = all(Validator::sequence([
///     required(),
///     min_length(8),
///     pattern("[0-9]").unwrap(),
/// ]))
/// .unwrap();
///
/// let result = password.validate(&json!("secret"));
/// assert!(!result.is_valid);
/// // Every validator ran
/// assert_eq!(result.list("all").unwrap().len(), 3);
/// ```
pub fn all(validators: impl Into<Validator>) -> Result<Validator, ValidatorError> {
    all_with(validators, PropsSource::default())
}

/// Like [`all`], with props.
pub fn all_with(
    validators: impl Into<Validator>,
    props: impl Into<PropsSource>,
) -> Result<Validator, ValidatorError> {
    exhaustive(ALL, true, validators.into(), props.into())
}

/// Creates a validator that runs every validator and passes when all pass.
///
/// The simpler sibling of [`all`]: it merges with a fixed reducer and ignores
/// middleware. Props data is still merged onto the result.
///
/// # Errors
///
/// Returns [`ValidatorError::InvalidValidator`] unless `validators` is a
/// sequence.
pub fn each(validators: impl Into<Validator>) -> Result<Validator, ValidatorError> {
    each_with(validators, PropsSource::default())
}

/// Like [`each`], with props.
pub fn each_with(
    validators: impl Into<Validator>,
    props: impl Into<PropsSource>,
) -> Result<Validator, ValidatorError> {
    exhaustive(EACH, false, validators.into(), props.into())
}

fn exhaustive(
    detail: &'static str,
    middleware: bool,
    validators: Validator,
    props: PropsSource,
) -> Result<Validator, ValidatorError> {
    let validators = expect_sequence(detail, validators)?;
    Ok(Validator::leaf(move |value, context| {
        run(detail, middleware, &validators, &props, value, context)
    }))
}

fn core(detail: &'static str) -> ReduceCore {
    Arc::new(move |accumulated: ValidationResult, current: &ValidationResult| {
        let is_valid = accumulated.is_valid && current.is_valid;
        spread_append(accumulated, current, detail, is_valid)
    })
}

fn run(
    detail: &'static str,
    middleware: bool,
    validators: &[Validator],
    props: &PropsSource,
    value: &Value,
    context: &ValidationContext,
) -> ValidationResult {
    let pipeline = if middleware {
        Pipeline::new(value.clone(), props, context.clone(), core(detail))
    } else {
        Pipeline::fixed(value.clone(), props, context.clone(), core(detail))
    };

    let children = validators
        .iter()
        .map(|validator| validate(validator, value, context))
        .collect();
    let current: CurrentFn = Arc::new(|_: usize, child: ValidationResult| child);
    let reduced = fold_exhaustive(
        &pipeline,
        empty_list(detail, value),
        children,
        current,
        detail,
        Children::SameValue,
    );
    pipeline.finish(reduced)
}
