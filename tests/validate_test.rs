//! Integration tests for dispatch and outcome normalization.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use verdict::{
    validate, validate_async_from, validators::required, Deferred, Outcome, ValidationContext,
    ValidationResult, Validator, ValidatorError, EVERY, PROPS,
};

// ====== Leaf Normalization Tests ======

#[test]
fn test_bool_outcome_becomes_validity() {
    let positive = Validator::leaf(|value, _| value.as_f64().map_or(false, |n| n > 0.0));

    let result = validate(&positive, &json!(3), &ValidationContext::new());
    assert!(result.is_valid);
    assert_eq!(result.value, json!(3));
    assert!(result.props.is_empty());
    assert!(result.details.is_empty());

    assert!(!positive.validate(&json!(-3)).is_valid);
}

#[test]
fn test_missing_outcome_is_invalid() {
    let silent = Validator::leaf(|_, _| ());
    let result = silent.validate(&json!("anything"));
    assert!(!result.is_valid);
    assert_eq!(result.value, json!("anything"));
}

#[test]
fn test_none_outcome_is_invalid() {
    let maybe = Validator::leaf(|value, _| value.as_bool().filter(|flag| *flag));
    assert!(maybe.validate(&json!(true)).is_valid);
    assert!(!maybe.validate(&json!("true")).is_valid);
}

#[test]
fn test_partial_result_value_is_overwritten() {
    let lying = Validator::leaf(|_, _| {
        ValidationResult::valid()
            .with_value(json!("something else"))
            .with_prop("message", "ok")
    });

    let result = lying.validate(&json!(42));
    assert!(result.is_valid);
    assert_eq!(result.value, json!(42));
    assert_eq!(result.message(), Some("ok"));
}

#[test]
fn test_deferred_outcome_is_pending_and_invalid() {
    let later = Validator::leaf(|_, _| {
        Deferred::new(|_input| async { Ok::<_, ValidatorError>(true) })
    });

    let result = later.validate(&json!(1));
    assert!(result.is_pending());
    assert!(!result.is_valid);
}

#[test]
fn test_normalize_accepts_explicit_outcomes() {
    let result = verdict::normalize(Outcome::Missing, &json!(null));
    assert!(!result.is_valid);
    assert_eq!(result.value, json!(null));
}

// ====== Shape Dispatch Tests ======

#[test]
fn test_sequence_validates_like_every() {
    let sequence = Validator::sequence([required(), Validator::leaf(|_, _| false)]);

    let result = sequence.validate(&json!("x"));
    assert!(!result.is_valid);
    assert_eq!(result.list(EVERY).unwrap().len(), 2);
    assert_eq!(result.prop("required"), Some(&json!(true)));
}

#[test]
fn test_mapping_validates_like_props() {
    let mapping = Validator::keyed([("name", required()), ("email", required())]);

    let result = mapping.validate(&json!({"name": "Ada"}));
    assert!(!result.is_valid);
    let children = result.keyed(PROPS).unwrap();
    assert!(children["name"].is_valid);
    assert!(!children["email"].is_valid);
    assert_eq!(children["email"].value, json!(null));
}

#[test]
fn test_mapping_inside_sequence() {
    let validator = Validator::sequence([Validator::keyed([("id", required())])]);

    let result = validator.validate(&json!({"id": 7}));
    assert!(result.is_valid);
    assert!(result.keyed(PROPS).is_some());
    assert_eq!(result.list(EVERY).unwrap().len(), 1);
}

#[test]
fn test_context_reaches_leaves() {
    let strict = Validator::leaf(|value, context| {
        let limit = context.get("limit").and_then(|v| v.as_u64()).unwrap_or(u64::MAX);
        value.as_u64().map_or(false, |n| n <= limit)
    });

    let context = ValidationContext::new().with("limit", 5);
    assert!(strict.validate_with(&json!(5), &context).is_valid);
    assert!(!strict.validate_with(&json!(6), &context).is_valid);
    assert!(strict.validate(&json!(6)).is_valid);
}

// ====== Getter Tests ======

#[tokio::test]
async fn test_getter_is_read_for_sync_pass_and_completion() {
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reads);
    let getter = move || {
        let read = counter.fetch_add(1, Ordering::SeqCst);
        json!(format!("value-{}", read))
    };

    let later = Validator::leaf(|_, _| {
        Deferred::new(|_input| async { Ok::<_, ValidatorError>(true) })
    });

    let result = validate_async_from(&later, getter, &ValidationContext::new())
        .await
        .unwrap();
    assert!(result.is_valid);
    assert_eq!(result.value, json!("value-1"));
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}
