//! Middleware: pluggable reduce and prepare steps for composite validators.
//!
//! Every middleware-aware composite (`every`, `some`, `all`, `array_of`,
//! `array_elements`, `object_props`, `form`) folds its children through a
//! reducer and shapes its final result through a preparer. Middleware wraps
//! both steps. Middleware from the composite's props is applied first
//! (innermost); middleware from the context is applied last (outermost).
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use verdict::{all, validators::{min, required}, Middleware, MiddlewareContext,
//!     ValidationContext, ValidationResult, Validator};
//!
//! /// Counts failing children.
//! struct CountFailures;
//!
//! impl Middleware for CountFailures {
//!     fn reduce_results(
//!         &self,
//!         accumulated: ValidationResult,
//!         current: &ValidationResult,
//!         cx: &MiddlewareContext<'_>,
//!     ) -> ValidationResult {
//!         let before = cx
//!             .previous_result
//!             .and_then(|r| r.prop("failures"))
//!             .and_then(|v| v.as_u64())
//!             .unwrap_or(0);
//!         let failures = before + u64::from(!current.is_valid);
//!         accumulated.with_prop("failures", failures)
//!     }
//! }
//!
//! let validator = all(Validator::sequence([required(), min(10.0)])).unwrap();
//! let context = ValidationContext::new().with_middleware(CountFailures);
//!
//! let result = validator.validate_with(&json!(3), &context);
//! assert_eq!(result.prop("failures"), Some(&json!(1)));
//! ```

use std::sync::Arc;

use serde_json::Value;

use crate::context::ValidationContext;
use crate::props::{PropsSource, ValidatorProps};
use crate::result::ValidationResult;

/// A reduce/prepare extension applied by composite validators.
///
/// Both methods default to passing their input through unchanged, so a
/// middleware implements only the step it customizes.
pub trait Middleware: Send + Sync {
    /// Post-processes the merge of one child into the accumulated result.
    ///
    /// `accumulated` is the output of the inner reducers; `current` is the
    /// child result being merged; `cx.previous_result` is the accumulator as it
    /// was before this merge.
    fn reduce_results(
        &self,
        accumulated: ValidationResult,
        current: &ValidationResult,
        cx: &MiddlewareContext<'_>,
    ) -> ValidationResult {
        let _ = (current, cx);
        accumulated
    }

    /// Post-processes the final result of a composite.
    fn prepare_result(
        &self,
        result: ValidationResult,
        cx: &MiddlewareContext<'_>,
    ) -> ValidationResult {
        let _ = cx;
        result
    }
}

/// What a middleware sees besides the results themselves.
#[derive(Debug, Clone, Copy)]
pub struct MiddlewareContext<'a> {
    /// The value validated by the composite.
    pub value: &'a Value,
    /// The composite's resolved props.
    pub props: &'a ValidatorProps,
    /// The composite's context.
    pub context: &'a ValidationContext,
    /// The accumulator before the current merge; `None` while preparing.
    pub previous_result: Option<&'a ValidationResult>,
}

/// The merge of one child into an accumulator, specific to each composite.
pub(crate) type ReduceCore =
    Arc<dyn Fn(ValidationResult, &ValidationResult) -> ValidationResult + Send + Sync>;

/// The reducer and preparer of one composite invocation.
pub(crate) struct Pipeline {
    pub(crate) value: Value,
    pub(crate) context: ValidationContext,
    props: ValidatorProps,
    middleware: Vec<Arc<dyn Middleware>>,
    core: ReduceCore,
}

impl Pipeline {
    /// A pipeline applying props middleware, then context middleware.
    pub(crate) fn new(
        value: Value,
        props: &PropsSource,
        context: ValidationContext,
        core: ReduceCore,
    ) -> Arc<Self> {
        let props = props.resolve(&context);
        let middleware = props
            .middleware()
            .iter()
            .chain(context.middleware())
            .cloned()
            .collect();
        Arc::new(Self {
            value,
            context,
            props,
            middleware,
            core,
        })
    }

    /// A pipeline with the fixed reducer only; props data is still merged.
    pub(crate) fn fixed(
        value: Value,
        props: &PropsSource,
        context: ValidationContext,
        core: ReduceCore,
    ) -> Arc<Self> {
        let props = props.resolve(&context);
        Arc::new(Self {
            value,
            context,
            props,
            middleware: Vec::new(),
            core,
        })
    }

    fn cx<'a>(&'a self, previous_result: Option<&'a ValidationResult>) -> MiddlewareContext<'a> {
        MiddlewareContext {
            value: &self.value,
            props: &self.props,
            context: &self.context,
            previous_result,
        }
    }

    /// Merges `current` into `accumulated`.
    pub(crate) fn reduce(
        &self,
        accumulated: ValidationResult,
        current: &ValidationResult,
    ) -> ValidationResult {
        if self.middleware.is_empty() {
            return (self.core)(accumulated, current);
        }
        let previous = accumulated.clone();
        let cx = self.cx(Some(&previous));
        self.middleware
            .iter()
            .fold((self.core)(accumulated, current), |reduced, middleware| {
                middleware.reduce_results(reduced, current, &cx)
            })
    }

    /// Shapes a reduced result: props sit under the computed fields, then each
    /// middleware prepares the result in turn.
    pub(crate) fn prepare(&self, result: ValidationResult) -> ValidationResult {
        let mut result = result;
        let mut props = self.props.data().clone();
        props.extend(std::mem::take(&mut result.props));
        result.props = props;

        let cx = self.cx(None);
        self.middleware
            .iter()
            .fold(result, |prepared, middleware| middleware.prepare_result(prepared, &cx))
    }

    /// Prepares a reduced result; a pending result is prepared again once it
    /// resolves.
    pub(crate) fn finish(self: &Arc<Self>, result: ValidationResult) -> ValidationResult {
        let mut result = result;
        let deferred = result.take_deferred();
        let prepared = self.prepare(result);
        match deferred {
            Some(deferred) => {
                let pipeline = Arc::clone(self);
                prepared.with_deferred(
                    deferred.map_result(self.value.clone(), move |resolved| {
                        pipeline.prepare(resolved)
                    }),
                )
            }
            None => prepared,
        }
    }
}
