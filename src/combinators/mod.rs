//! Composite validators.
//!
//! - `every` / `some`: short-circuiting sequences
//! - `all` / `each`: exhaustive sequences
//! - `array_of` / `array_elements`: one validator applied to every element
//! - `object_props` / `props`: a validator per object property
//! - `form`: a property-set validator with field selection and carried state
//! - `format_result` / `with_middleware`: wrappers around any validator
//!
//! Every composite records its children under a detail named after itself
//! and becomes pending when any child is pending. Resolving a composite
//! resolves its children; short-circuiting composites resume their remaining
//! validators one at a time, exhaustive composites resolve all children at
//! once.

mod all;
mod array;
mod form;
mod format;
mod object;
mod sequential;

use std::sync::Arc;

use futures::future::{try_join_all, FutureExt};
use indexmap::IndexMap;
use tracing::debug;

pub use all::{all, all_with, each, each_with};
pub use array::{array_elements, array_elements_with, array_of, array_of_with};
pub use form::{form, form_with, FormValidator};
pub use format::{format_result, with_middleware};
pub use object::{object_props, object_props_with, props, props_with};
pub use sequential::{every, every_with, some, some_with};

pub(crate) use object::run_props;
pub(crate) use sequential::run_sequence;

use crate::deferred::{Deferred, ResolveInput};
use crate::error::ValidatorError;
use crate::middleware::Pipeline;
use crate::result::{Detail, ValidationResult};
use crate::validator::Validator;

/// How a composite's children relate to the composite's own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Children {
    /// Every child validates the composite's value.
    SameValue,
    /// Each child validates an element or property of the value.
    Parts,
}

impl Children {
    /// The input a child settles with. Children validating a part of the value
    /// keep their captured value; only same-value children read the caller's
    /// value source.
    pub(crate) fn input(self, input: &ResolveInput) -> ResolveInput {
        match self {
            Children::SameValue => input.forwarded(),
            Children::Parts => ResolveInput::new(),
        }
    }
}

/// Builds the merge input for child `index` from its settled result.
pub(crate) type CurrentFn = Arc<dyn Fn(usize, ValidationResult) -> ValidationResult + Send + Sync>;

pub(crate) fn expect_sequence(
    combinator: &'static str,
    validators: Validator,
) -> Result<Arc<[Validator]>, ValidatorError> {
    match validators {
        Validator::Sequence(validators) => Ok(validators),
        other => Err(ValidatorError::InvalidValidator {
            combinator,
            expected: "a sequence of validators",
            got: other.kind(),
        }),
    }
}

pub(crate) fn expect_mapping(
    combinator: &'static str,
    validators: Validator,
) -> Result<Arc<IndexMap<String, Validator>>, ValidatorError> {
    match validators {
        Validator::Keyed(validators) => Ok(validators),
        other => Err(ValidatorError::InvalidValidator {
            combinator,
            expected: "a mapping of validators",
            got: other.kind(),
        }),
    }
}

/// A valid result for `value` with an empty list under `detail`.
pub(crate) fn empty_list(detail: &str, value: &serde_json::Value) -> ValidationResult {
    ValidationResult::valid()
        .with_value(value.clone())
        .with_detail(detail, Detail::List(Vec::new()))
}

/// Appends `current` to the list under `detail`.
pub(crate) fn push_child(
    mut accumulated: ValidationResult,
    detail: &str,
    current: ValidationResult,
) -> ValidationResult {
    match accumulated.details.get_mut(detail) {
        Some(Detail::List(children)) => children.push(current),
        _ => {
            accumulated
                .details
                .insert(detail.to_string(), Detail::List(vec![current]));
        }
    }
    accumulated
}

/// Spreads `current` over `accumulated`, then restores the accumulated list
/// under `detail` with `current` appended.
pub(crate) fn spread_append(
    mut accumulated: ValidationResult,
    current: &ValidationResult,
    detail: &str,
    is_valid: bool,
) -> ValidationResult {
    let children = match accumulated.details.shift_remove(detail) {
        Some(Detail::List(children)) => children,
        _ => Vec::new(),
    };
    let mut merged = accumulated.spread(current.clone());
    merged.is_valid = is_valid;
    merged.details.shift_remove(detail);
    let mut children = children;
    children.push(current.clone());
    merged.details.insert(detail.to_string(), Detail::List(children));
    merged
}

/// Reduces every child from `initial`. When any child is pending, the result
/// carries a continuation that settles all children concurrently and reduces
/// them again from `initial`.
pub(crate) fn fold_exhaustive(
    pipeline: &Arc<Pipeline>,
    initial: ValidationResult,
    children: Vec<ValidationResult>,
    current: CurrentFn,
    detail: &'static str,
    kind: Children,
) -> ValidationResult {
    let reduced = reduce_children(pipeline, initial.clone(), &children, &current);
    let pending = children.iter().filter(|child| child.is_pending()).count();
    if pending == 0 {
        return reduced;
    }

    debug!(combinator = detail, pending, "deferring exhaustive composite");
    let pipeline = Arc::clone(pipeline);
    reduced.with_deferred(Deferred::continuation(move |input| {
        let forwarded = kind.input(&input);
        let settling = try_join_all(
            children
                .iter()
                .map(|child| child.clone().settle(forwarded.clone())),
        );
        let pipeline = Arc::clone(&pipeline);
        let initial = initial.clone();
        let current = Arc::clone(&current);
        async move {
            let settled = settling.await?;
            debug!(combinator = detail, children = settled.len(), "settled exhaustive composite");
            Ok(reduce_children(&pipeline, initial, &settled, &current))
        }
        .boxed()
    }))
}

fn reduce_children(
    pipeline: &Pipeline,
    initial: ValidationResult,
    children: &[ValidationResult],
    current: &CurrentFn,
) -> ValidationResult {
    children
        .iter()
        .enumerate()
        .fold(initial, |accumulated, (index, child)| {
            pipeline.reduce(accumulated, &current(index, child.clone()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expect_sequence_rejects_leaf() {
        let leaf = Validator::leaf(|_, _| true);
        let error = expect_sequence("all", leaf).unwrap_err();
        assert_eq!(
            error.to_string(),
            "all expects a sequence of validators, got function"
        );
    }

    #[test]
    fn test_expect_mapping_rejects_sequence() {
        let error = expect_mapping("props", Validator::sequence(Vec::<Validator>::new()))
            .unwrap_err();
        assert!(error.is_construction());
    }

    #[test]
    fn test_spread_append_keeps_own_list() {
        let nested = ValidationResult::valid()
            .with_prop("message", "nested")
            .with_detail("every", Detail::List(vec![ValidationResult::invalid()]));
        let accumulated = empty_list("every", &json!(1));

        let merged = spread_append(accumulated, &nested, "every", false);
        assert!(!merged.is_valid);
        assert_eq!(merged.message(), Some("nested"));
        assert_eq!(merged.list("every").map(|children| children.len()), Some(1));
        assert_eq!(merged.list("every").unwrap()[0], nested);
    }

    #[test]
    fn test_parts_settle_against_captured_value() {
        let input = ResolveInput::new().with_value(json!("replaced"));
        assert_eq!(
            Children::SameValue.input(&input).current_value(&json!("own")),
            json!("replaced")
        );
        assert_eq!(
            Children::Parts.input(&input).current_value(&json!("own")),
            json!("own")
        );
    }

    #[test]
    fn test_push_child_creates_list() {
        let result = push_child(ValidationResult::valid(), "arrayOf", ValidationResult::invalid());
        assert_eq!(result.list("arrayOf").map(|children| children.len()), Some(1));
    }
}
