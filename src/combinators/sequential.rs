//! `every` and `some`: sequences that stop at the first deciding child.

use std::sync::Arc;

use futures::future::FutureExt;
use serde_json::Value;
use tracing::debug;

use super::{empty_list, expect_sequence, spread_append};
use crate::context::ValidationContext;
use crate::deferred::Deferred;
use crate::error::ValidatorError;
use crate::middleware::{Pipeline, ReduceCore};
use crate::props::PropsSource;
use crate::result::{ValidationResult, EVERY, SOME};
use crate::validate::validate;
use crate::validator::Validator;

/// Which children decide a short-circuiting sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    /// Continue while children are valid.
    Every,
    /// Continue while children are invalid.
    Some,
}

impl Policy {
    fn detail(self) -> &'static str {
        match self {
            Policy::Every => EVERY,
            Policy::Some => SOME,
        }
    }

    /// Whether evaluation continues after reducing to `reduced`.
    fn proceeds(self, reduced: &ValidationResult) -> bool {
        match self {
            Policy::Every => reduced.is_valid,
            Policy::Some => !reduced.is_valid,
        }
    }

    fn core(self) -> ReduceCore {
        match self {
            Policy::Every => Arc::new(|accumulated: ValidationResult, current: &ValidationResult| {
                let is_valid = accumulated.is_valid && current.is_valid;
                spread_append(accumulated, current, EVERY, is_valid)
            }),
            Policy::Some => Arc::new(|accumulated: ValidationResult, current: &ValidationResult| {
                let any_before = accumulated.list(SOME).map_or(false, |l| !l.is_empty());
                let is_valid = (any_before && accumulated.is_valid) || current.is_valid;
                spread_append(accumulated, current, SOME, is_valid)
            }),
        }
    }
}

/// Creates a validator that passes when every validator passes.
///
/// Validators run in order and stop at the first invalid one. A validator
/// that defers pauses the sequence: the rest run only once its result is
/// known, and only if the sequence is still valid. An empty sequence is valid.
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
/// use verdict::{every, validators::{min_length, required}, Validator};
///
/// let name = every(Validator::sequence([required(), min_length(3)])).unwrap();
///
/// assert!(name.validate(&json!("Ada")).is_valid);
///
/// // `required` fails, `min_length` never runs
/// let result = name.validate(&json!(""));
/// assert!(!result.is_valid);
/// assert_eq!(result.list("every").unwrap().len(), 1);
/// ```
pub fn every(validators: impl Into<Validator>) -> Result<Validator, ValidatorError> {
    every_with(validators, PropsSource::default())
}

/// Like [`every`], with props.
pub fn every_with(
    validators: impl Into<Validator>,
    props: impl Into<PropsSource>,
) -> Result<Validator, ValidatorError> {
    sequential(Policy::Every, validators.into(), props.into())
}

/// Creates a validator that passes when at least one validator passes.
///
/// Validators run in order and stop at the first valid one. A validator that
/// defers pauses the sequence: the rest run only once its result is known,
/// and only if the sequence is still invalid. An empty sequence is valid.
///
/// # Errors
///
/// Returns [`ValidatorError::InvalidValidator`] unless `validators` is a
/// sequence.
pub fn some(validators: impl Into<Validator>) -> Result<Validator, ValidatorError> {
    some_with(validators, PropsSource::default())
}

/// Like [`some`], with props.
pub fn some_with(
    validators: impl Into<Validator>,
    props: impl Into<PropsSource>,
) -> Result<Validator, ValidatorError> {
    sequential(Policy::Some, validators.into(), props.into())
}

fn sequential(
    policy: Policy,
    validators: Validator,
    props: PropsSource,
) -> Result<Validator, ValidatorError> {
    let validators = expect_sequence(policy.detail(), validators)?;
    Ok(Validator::leaf(move |value, context| {
        run(policy, &validators, &props, value, context)
    }))
}

/// Validates a bare sequence as `every` without props.
pub(crate) fn run_sequence(
    validators: &Arc<[Validator]>,
    value: &Value,
    context: &ValidationContext,
) -> ValidationResult {
    run(Policy::Every, validators, &PropsSource::default(), value, context)
}

fn run(
    policy: Policy,
    validators: &Arc<[Validator]>,
    props: &PropsSource,
    value: &Value,
    context: &ValidationContext,
) -> ValidationResult {
    let pipeline = Pipeline::new(value.clone(), props, context.clone(), policy.core());
    let initial = empty_list(policy.detail(), value);
    let reduced = execute(policy, &pipeline, Arc::clone(validators), 0, initial);
    pipeline.finish(reduced)
}

/// Runs validators from `start`, halting at the first pending child.
///
/// A halted run carries a continuation that settles the pending child, merges
/// it, and runs the remaining validators only if the policy still proceeds.
fn execute(
    policy: Policy,
    pipeline: &Arc<Pipeline>,
    validators: Arc<[Validator]>,
    start: usize,
    accumulated: ValidationResult,
) -> ValidationResult {
    let mut accumulated = accumulated;
    for index in start..validators.len() {
        let current = validate(&validators[index], &pipeline.value, &pipeline.context);

        if current.is_pending() {
            debug!(combinator = policy.detail(), index, "halting on deferred child");
            let reduced = pipeline.reduce(accumulated.clone(), &current);
            let pipeline = Arc::clone(pipeline);
            let continuation = Deferred::continuation(move |input| {
                let forwarded = input.forwarded();
                let settling = current.clone().settle(forwarded.clone());
                let pipeline = Arc::clone(&pipeline);
                let validators = Arc::clone(&validators);
                let accumulated = accumulated.clone();
                async move {
                    let settled = settling.await?;
                    let reduced = pipeline.reduce(accumulated, &settled);
                    if !policy.proceeds(&reduced) {
                        return Ok(reduced);
                    }
                    debug!(combinator = policy.detail(), index, "resuming after deferred child");
                    execute(policy, &pipeline, validators, index + 1, reduced)
                        .settle(forwarded)
                        .await
                }
                .boxed()
            });
            return reduced.with_deferred(continuation);
        }

        accumulated = pipeline.reduce(accumulated, &current);
        if !policy.proceeds(&accumulated) {
            break;
        }
    }
    accumulated
}
