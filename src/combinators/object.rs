//! `object_props` and `props`: a validator per object property.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::{expect_mapping, fold_exhaustive, Children, CurrentFn};
use crate::context::ValidationContext;
use crate::error::ValidatorError;
use crate::middleware::{Pipeline, ReduceCore};
use crate::path::PathSegment;
use crate::props::PropsSource;
use crate::result::{Detail, ValidationResult, OBJECT_PROPS, PROPS};
use crate::validate::validate;
use crate::validator::Validator;

/// Creates a validator applying a validator to each property of an object.
///
/// A nested mapping is itself validated with `object_props`, so deep trees
/// need no combinator at every level. The property `key` is validated with
/// the context override registered under `("objectProps", key)`; the parent's
/// own override map is not passed down.
///
/// A `null` object is valid with no property results; compose with
/// [`required`](crate::validators::required) when the object must be present.
///
/// # Errors
///
/// Returns [`ValidatorError::InvalidValidator`] unless `validators` is a
/// mapping.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{object_props, validators::required, Validator};
///
/// let user = object_props(Validator::keyed([
///     ("a", required()),
///     ("b", required()),
/// ]))
/// .unwrap();
///
/// let result = user.validate(&json!({"a": "", "b": "x"}));
/// assert!(!result.is_valid);
///
/// let props = result.keyed("objectProps").unwrap();
/// assert!(!props["a"].is_valid);
/// assert!(props["b"].is_valid);
/// ```
pub fn object_props(validators: impl Into<Validator>) -> Result<Validator, ValidatorError> {
    object_props_with(validators, PropsSource::default())
}

/// Like [`object_props`], with props.
pub fn object_props_with(
    validators: impl Into<Validator>,
    props: impl Into<PropsSource>,
) -> Result<Validator, ValidatorError> {
    keyed(OBJECT_PROPS, true, validators.into(), props.into())
}

/// The middleware-free sibling of [`object_props`], recording property
/// results under `props`. Mappings used directly as validators behave like
/// `props`.
///
/// # Errors
///
/// Returns [`ValidatorError::InvalidValidator`] unless `validators` is a
/// mapping.
pub fn props(validators: impl Into<Validator>) -> Result<Validator, ValidatorError> {
    props_with(validators, PropsSource::default())
}

/// Like [`props`], with props.
pub fn props_with(
    validators: impl Into<Validator>,
    props: impl Into<PropsSource>,
) -> Result<Validator, ValidatorError> {
    keyed(PROPS, false, validators.into(), props.into())
}

fn keyed(
    detail: &'static str,
    middleware: bool,
    validators: Validator,
    props: PropsSource,
) -> Result<Validator, ValidatorError> {
    let validators = nest(detail, middleware, &*expect_mapping(detail, validators)?);
    Ok(Validator::leaf(move |value, context| {
        run(detail, middleware, &validators, &props, value, context)
    }))
}

/// Converts nested mappings into validators of the same kind.
fn nest(
    detail: &'static str,
    middleware: bool,
    validators: &IndexMap<String, Validator>,
) -> Arc<IndexMap<String, Validator>> {
    let nested = validators
        .iter()
        .map(|(key, validator)| {
            let validator = match validator {
                Validator::Keyed(inner) => {
                    let inner = nest(detail, middleware, inner);
                    let props = PropsSource::default();
                    Validator::leaf(move |value, context| {
                        run(detail, middleware, &inner, &props, value, context)
                    })
                }
                other => other.clone(),
            };
            (key.clone(), validator)
        })
        .collect();
    Arc::new(nested)
}

/// Validates a bare mapping as `props` without props.
pub(crate) fn run_props(
    validators: &Arc<IndexMap<String, Validator>>,
    value: &Value,
    context: &ValidationContext,
) -> ValidationResult {
    run(PROPS, false, validators, &PropsSource::default(), value, context)
}

/// Merges a keyed wrapper into the accumulator: validity is ANDed and the
/// keyed maps under `detail` are joined.
pub(crate) fn keyed_core(detail: &'static str) -> ReduceCore {
    Arc::new(move |mut accumulated: ValidationResult, current: &ValidationResult| {
        accumulated.is_valid = accumulated.is_valid && current.is_valid;
        let children = current.keyed(detail).cloned().unwrap_or_default();
        match accumulated.details.get_mut(detail) {
            Some(Detail::Keyed(existing)) => existing.extend(children),
            _ => {
                accumulated
                    .details
                    .insert(detail.to_string(), Detail::Keyed(children));
            }
        }
        accumulated
    })
}

/// Wraps the result of property `keys[index]` as `{is_valid, detail: {key: result}}`.
pub(crate) fn keyed_current(detail: &'static str, keys: Arc<Vec<String>>, value: Value) -> CurrentFn {
    Arc::new(move |index: usize, child: ValidationResult| {
        let key = keys.get(index).cloned().unwrap_or_default();
        ValidationResult::new(child.is_valid)
            .with_value(value.clone())
            .with_detail(detail, Detail::Keyed(IndexMap::from([(key, child)])))
    })
}

/// A valid result for `value` with an empty keyed map under `detail`.
pub(crate) fn empty_keyed(detail: &str, value: &Value) -> ValidationResult {
    ValidationResult::valid()
        .with_value(value.clone())
        .with_detail(detail, Detail::Keyed(IndexMap::new()))
}

fn run(
    detail: &'static str,
    middleware: bool,
    validators: &IndexMap<String, Validator>,
    props: &PropsSource,
    value: &Value,
    context: &ValidationContext,
) -> ValidationResult {
    let pipeline = if middleware {
        Pipeline::new(value.clone(), props, context.clone(), keyed_core(detail))
    } else {
        Pipeline::fixed(value.clone(), props, context.clone(), keyed_core(detail))
    };
    let initial = empty_keyed(detail, value);
    if value.is_null() {
        return pipeline.finish(initial);
    }

    let keys: Vec<String> = validators.keys().cloned().collect();
    let children = validators
        .iter()
        .map(|(key, validator)| {
            let child_value = value.get(key).unwrap_or(&Value::Null);
            let child_context = context.scoped(detail, &PathSegment::Field(key.clone()));
            validate(validator, child_value, &child_context)
        })
        .collect();

    let current = keyed_current(detail, Arc::new(keys), value.clone());
    let reduced = fold_exhaustive(&pipeline, initial, children, current, detail, Children::Parts);
    pipeline.finish(reduced)
}
