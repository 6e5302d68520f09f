//! Integration tests for middleware ordering, computed props, and the
//! result-shaping wrappers.

use std::sync::{Arc, Mutex};

use serde_json::json;
use verdict::{
    all_with, array_of, every, every_with, format_result, object_props, validate_async,
    validators::{min, required}, with_middleware, Deferred, Middleware, MiddlewareContext,
    PropsSource, ValidationContext, ValidationResult, Validator, ValidatorError, ValidatorProps,
};

/// Records the order in which middleware steps run.
struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            log: Arc::clone(log),
        }
    }

    fn record(&self, step: &str) {
        self.log.lock().unwrap().push(format!("{}:{}", step, self.name));
    }
}

impl Middleware for Recorder {
    fn reduce_results(
        &self,
        accumulated: ValidationResult,
        _current: &ValidationResult,
        _cx: &MiddlewareContext<'_>,
    ) -> ValidationResult {
        self.record("reduce");
        accumulated
    }

    fn prepare_result(&self, result: ValidationResult, _cx: &MiddlewareContext<'_>) -> ValidationResult {
        self.record("prepare");
        result
    }
}

/// Requires at least `min` valid children in an `all`.
struct AtLeast(usize);

impl Middleware for AtLeast {
    fn prepare_result(&self, result: ValidationResult, _cx: &MiddlewareContext<'_>) -> ValidationResult {
        let passed = result
            .list("all")
            .map_or(0, |children| children.iter().filter(|c| c.is_valid).count());
        let mut result = result;
        result.is_valid = passed >= self.0;
        result
    }
}

// ====== Ordering Tests ======

#[test]
fn test_props_middleware_inside_context_middleware() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let validator = every_with(
        Validator::sequence([required()]),
        ValidatorProps::new().with_middleware(Recorder::new("props", &log)),
    )
    .unwrap();
    let context = ValidationContext::new().with_middleware(Recorder::new("context", &log));

    validator.validate_with(&json!("x"), &context);

    let log = log.lock().unwrap().clone();
    assert_eq!(
        log,
        vec![
            "reduce:props",
            "reduce:context",
            "prepare:props",
            "prepare:context",
        ]
    );
}

#[test]
fn test_reduce_runs_once_per_child() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let validator = array_of(required());
    let context = ValidationContext::new().with_middleware(Recorder::new("ctx", &log));

    validator.validate_with(&json!(["a", "b", "c"]), &context);

    let reduces = log.lock().unwrap().iter().filter(|entry| entry.starts_with("reduce")).count();
    assert_eq!(reduces, 3);
}

#[test]
fn test_context_middleware_reaches_nested_composites() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let validator = object_props(Validator::keyed([(
        "tags",
        array_of(required()),
    )]))
    .unwrap();
    let context = ValidationContext::new().with_middleware(Recorder::new("ctx", &log));

    validator.validate_with(&json!({"tags": ["a"]}), &context);

    let prepares = log.lock().unwrap().iter().filter(|entry| entry.starts_with("prepare")).count();
    assert_eq!(prepares, 2);
}

#[test]
fn test_middleware_can_redefine_validity() {
    let validator = all_with(
        Validator::sequence([required(), min(10.0), min(100.0)]),
        ValidatorProps::new().with_middleware(AtLeast(2)),
    )
    .unwrap();

    assert!(validator.validate(&json!(50)).is_valid);
    assert!(!validator.validate(&json!(5)).is_valid);
}

// ====== Computed Props Tests ======

#[test]
fn test_dynamic_props_read_context() {
    let validator = every_with(
        Validator::sequence([required()]),
        PropsSource::dynamic(|context| {
            let label = context
                .get("label")
                .and_then(|v| v.as_str())
                .unwrap_or("value")
                .to_string();
            ValidatorProps::new().with("message", format!("{} is required", label))
        }),
    )
    .unwrap();

    let context = ValidationContext::new().with("label", "email");
    let result = validator.validate_with(&json!(""), &context);
    assert_eq!(result.message(), Some("email is required"));

    let result = validator.validate(&json!(""));
    assert_eq!(result.message(), Some("value is required"));
}

// ====== with_middleware Tests ======

#[test]
fn test_with_middleware_runs_inside_context_middleware() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let validator = with_middleware(
        every(Validator::sequence([required()])).unwrap(),
        Recorder::new("wrapped", &log),
    );
    let context = ValidationContext::new().with_middleware(Recorder::new("context", &log));

    validator.validate_with(&json!("x"), &context);

    let log = log.lock().unwrap().clone();
    assert_eq!(
        log,
        vec![
            "reduce:wrapped",
            "reduce:context",
            "prepare:wrapped",
            "prepare:context",
        ]
    );
}

#[test]
fn test_with_middleware_does_not_touch_leaves() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let validator = with_middleware(required(), Recorder::new("wrapped", &log));

    assert!(validator.validate(&json!("x")).is_valid);
    assert!(log.lock().unwrap().is_empty());
}

// ====== format_result Tests ======

#[test]
fn test_format_result_receives_context() {
    let validator = format_result(
        |result, context| match context.get("locale").and_then(|v| v.as_str()) {
            Some("fr") if !result.is_valid => result.with_prop("message", "obligatoire"),
            _ if !result.is_valid => result.with_prop("message", "required"),
            _ => result,
        },
        required(),
    );

    let context = ValidationContext::new().with("locale", "fr");
    assert_eq!(
        validator.validate_with(&json!(""), &context).message(),
        Some("obligatoire")
    );
    assert_eq!(validator.validate(&json!("")).message(), Some("required"));
}

#[tokio::test]
async fn test_format_result_reformats_after_resolution() {
    let later = Validator::leaf(|_, _| {
        Deferred::new(|_input| async { Ok::<_, ValidatorError>(true) })
    });
    let validator = format_result(
        |result, _| {
            let label = if result.is_valid { "ok" } else { "checking" };
            result.with_prop("status", label)
        },
        later,
    );

    let pending = validator.validate(&json!(1));
    assert_eq!(pending.prop("status"), Some(&json!("checking")));

    let resolved = validate_async(&validator, &json!(1), &ValidationContext::new())
        .await
        .unwrap();
    assert_eq!(resolved.prop("status"), Some(&json!("ok")));
}
