//! Wrappers that change how a validator's result is shaped.

use std::sync::Arc;

use crate::context::ValidationContext;
use crate::middleware::Middleware;
use crate::result::ValidationResult;
use crate::validate::validate;
use crate::validator::Validator;

/// Wraps `validator` so that `formatter` reshapes its result.
///
/// The formatter runs on the synchronous result and again on the resolved
/// result once a pending result resolves.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{format_result, validators::required};
///
/// let name = format_result(
///     |result, _context| {
///         if result.is_valid {
///             result
///         } else {
///             result.with_prop("message", "Please enter your name")
///         }
///     },
///     required(),
/// );
///
/// assert_eq!(name.validate(&json!("")).message(), Some("Please enter your name"));
/// assert_eq!(name.validate(&json!("Ada")).message(), None);
/// ```
pub fn format_result<F>(formatter: F, validator: impl Into<Validator>) -> Validator
where
    F: Fn(ValidationResult, &ValidationContext) -> ValidationResult + Send + Sync + 'static,
{
    let formatter = Arc::new(formatter);
    let validator = validator.into();
    Validator::leaf(move |value, context| {
        let mut result = validate(&validator, value, context);
        match result.take_deferred() {
            None => formatter(result, context),
            Some(deferred) => {
                let formatter = Arc::clone(&formatter);
                let context = context.clone();
                let formatted = formatter(result, &context);
                formatted.with_deferred(
                    deferred.map_result(value.clone(), move |resolved| formatter(resolved, &context)),
                )
            }
        }
    })
}

/// Wraps `validator` so that every composite it reaches applies `middleware`.
///
/// The middleware is added to the context, inside any middleware the caller's
/// context already carries.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{all, validators::required, with_middleware, Middleware, MiddlewareContext,
///     ValidationResult, Validator};
///
/// struct Summary;
///
/// impl Middleware for Summary {
///     fn prepare_result(&self, result: ValidationResult, _cx: &MiddlewareContext<'_>) -> ValidationResult {
///         let failed = result.list("all").map_or(0, |children| {
///             children.iter().filter(|child| !child.is_valid).count()
///         });
///         result.with_prop("failed", failed)
///     }
/// }
///
/// let validator = with_middleware(all(Validator::sequence([required()])).unwrap(), Summary);
/// assert_eq!(validator.validate(&json!(null)).prop("failed"), Some(&json!(1)));
/// ```
pub fn with_middleware<M>(validator: impl Into<Validator>, middleware: M) -> Validator
where
    M: Middleware + 'static,
{
    let validator = validator.into();
    let middleware: Arc<dyn Middleware> = Arc::new(middleware);
    Validator::leaf(move |value, context| {
        let context = context.prepend_middleware(Arc::clone(&middleware));
        validate(&validator, value, &context)
    })
}
