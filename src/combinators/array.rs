//! `array_of` and `array_elements`: one validator applied to every element.

use std::sync::Arc;

use serde_json::Value;

use super::{empty_list, fold_exhaustive, push_child, Children, CurrentFn};
use crate::context::ValidationContext;
use crate::middleware::{Pipeline, ReduceCore};
use crate::path::PathSegment;
use crate::props::PropsSource;
use crate::result::{ValidationResult, ARRAY_ELEMENTS, ARRAY_OF};
use crate::validate::{is_empty_value, validate};
use crate::validator::Validator;

/// Creates a validator applying `validator` to every element of an array.
///
/// - An empty value (`null` or `""`) is valid with no element results.
/// - Any other non-array value is invalid with no element results.
/// - Otherwise the result is valid when every element is, and the `arrayOf`
///   detail holds one result per element in input order.
///
/// The element at index `i` is validated with the context override registered
/// under `("arrayOf", i)`.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{array_of, validators::required};
///
/// let tags = array_of(required());
///
/// let result = tags.validate(&json!(["rust", "", "json"]));
/// assert!(!result.is_valid);
/// let validity: Vec<bool> = result.list("arrayOf").unwrap().iter().map(|r| r.is_valid).collect();
/// assert_eq!(validity, vec![true, false, true]);
///
/// assert!(tags.validate(&json!(null)).is_valid);
/// assert!(!tags.validate(&json!("rust")).is_valid);
/// ```
pub fn array_of(validator: impl Into<Validator>) -> Validator {
    array_of_with(validator, PropsSource::default())
}

/// Like [`array_of`], with props.
pub fn array_of_with(validator: impl Into<Validator>, props: impl Into<PropsSource>) -> Validator {
    elements(ARRAY_OF, validator.into(), props.into())
}

/// Identical to [`array_of`], recording element results under `arrayElements`
/// and reading overrides from the `"arrayElements"` scope.
pub fn array_elements(validator: impl Into<Validator>) -> Validator {
    array_elements_with(validator, PropsSource::default())
}

/// Like [`array_elements`], with props.
pub fn array_elements_with(
    validator: impl Into<Validator>,
    props: impl Into<PropsSource>,
) -> Validator {
    elements(ARRAY_ELEMENTS, validator.into(), props.into())
}

fn elements(detail: &'static str, validator: Validator, props: PropsSource) -> Validator {
    Validator::leaf(move |value, context| run(detail, &validator, &props, value, context))
}

fn core(detail: &'static str) -> ReduceCore {
    Arc::new(move |accumulated: ValidationResult, current: &ValidationResult| {
        let mut merged = push_child(accumulated, detail, current.clone());
        merged.is_valid = merged.is_valid && current.is_valid;
        merged
    })
}

fn run(
    detail: &'static str,
    validator: &Validator,
    props: &PropsSource,
    value: &Value,
    context: &ValidationContext,
) -> ValidationResult {
    let pipeline = Pipeline::new(value.clone(), props, context.clone(), core(detail));
    let initial = empty_list(detail, value);

    let elements = match value {
        _ if is_empty_value(value) => return pipeline.finish(initial),
        Value::Array(elements) => elements,
        _ => {
            let mut mismatch = initial;
            mismatch.is_valid = false;
            return pipeline.finish(mismatch);
        }
    };

    let children = elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let child_context = context.scoped(detail, &PathSegment::Index(index));
            validate(validator, element, &child_context)
        })
        .collect();
    let current: CurrentFn = Arc::new(|_: usize, child: ValidationResult| child);
    let reduced = fold_exhaustive(&pipeline, initial, children, current, detail, Children::Parts);
    pipeline.finish(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn is_number() -> Validator {
        Validator::leaf(|value, _| value.is_number())
    }

    #[test]
    fn test_empty_array_is_valid() {
        let result = array_of(is_number()).validate(&json!([]));
        assert!(result.is_valid);
        assert_eq!(result.list(ARRAY_OF).unwrap().len(), 0);
    }

    #[test]
    fn test_non_array_is_invalid_with_empty_detail() {
        let result = array_of(is_number()).validate(&json!({"a": 1}));
        assert!(!result.is_valid);
        assert_eq!(result.list(ARRAY_OF).unwrap().len(), 0);
        assert_eq!(result.value, json!({"a": 1}));
    }

    #[test]
    fn test_empty_values_are_valid() {
        for value in [json!(null), json!("")] {
            let result = array_elements(is_number()).validate(&value);
            assert!(result.is_valid);
            assert_eq!(result.list(ARRAY_ELEMENTS).unwrap().len(), 0);
        }
    }

    #[test]
    fn test_sequence_element_validator() {
        let positive = Validator::leaf(|value, _| value.as_f64().map_or(false, |n| n > 0.0));
        let validator = array_of(Validator::sequence([is_number(), positive]));

        let result = validator.validate(&json!([1, -1, "x"]));
        let children = result.list(ARRAY_OF).unwrap();
        assert_eq!(
            children.iter().map(|r| r.is_valid).collect::<Vec<_>>(),
            vec![true, false, false]
        );
        assert!(children[0].list("every").is_some());
    }

    #[test]
    fn test_per_index_override() {
        let validator = array_of(Validator::leaf(|value, context| {
            let limit = context.get("limit").and_then(Value::as_f64).unwrap_or(10.0);
            value.as_f64().map_or(false, |n| n <= limit)
        }));
        let context = ValidationContext::new().with_override(
            ARRAY_OF,
            1usize,
            ValidationContext::new().with("limit", 1),
        );

        let result = validator.validate_with(&json!([5, 5]), &context);
        let children = result.list(ARRAY_OF).unwrap();
        assert!(children[0].is_valid);
        assert!(!children[1].is_valid);
    }
}
