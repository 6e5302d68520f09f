//! # Verdict
//!
//! Composable value validators with synchronous-first, asynchronous-later
//! resolution and uniformly mergeable results.
//!
//! ## Overview
//!
//! A [`Validator`] is a function, a sequence of validators, or a mapping of
//! validators. Combinators build bigger validators out of smaller ones and
//! always return another validator, so composition nests to any depth. Every
//! validation yields a [`ValidationResult`]: a validity flag, the validated
//! value, descriptive props, and the per-child details of composites.
//!
//! A validator that cannot answer right away returns a [`Deferred`] handle.
//! The result is then *pending*; the composites around it compute what they
//! can synchronously and attach their own handle that re-runs the combination
//! once the children settle. [`validate_async`] drives a pending result to its
//! final state.
//!
//! ## Core Types
//!
//! - [`Validator`]: the validator shapes and their dispatch
//! - [`ValidationResult`]: the canonical result, with [`Detail`] entries per composite
//! - [`ValidationContext`]: caller data, middleware, per-field overrides, form state
//! - [`Middleware`]: hooks wrapping a combinator's reduction and final result
//! - [`FormValidator`]: partial validation with completeness tracking
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use verdict::{array_of, every, validators::{min_length, required}, Validator};
//!
//! let user = Validator::keyed([
//!     ("name", every([required(), min_length(2)]).unwrap()),
//!     ("tags", array_of(required())),
//! ]);
//!
//! let result = user.validate(&json!({"name": "Ada", "tags": ["math", ""]}));
//! assert!(!result.is_valid);
//!
//! let tags = &result.keyed("props").unwrap()["tags"];
//! let flags: Vec<bool> = tags.list("arrayOf").unwrap().iter().map(|r| r.is_valid).collect();
//! assert_eq!(flags, vec![true, false]);
//! ```

mod combinators;
mod context;
mod deferred;
pub mod error;
mod middleware;
pub mod path;
mod props;
mod result;
mod validate;
mod validator;
pub mod validators;

pub use combinators::{
    all, all_with, array_elements, array_elements_with, array_of, array_of_with, each, each_with,
    every, every_with, form, form_with, format_result, object_props, object_props_with, props,
    props_with, some, some_with, with_middleware, FormValidator,
};
pub use context::{FormContext, ValidationContext};
pub use deferred::{Deferred, ResolveFuture, ResolveInput, ValueSource};
pub use error::{FieldErrors, ValidatorError};
pub use middleware::{Middleware, MiddlewareContext};
pub use path::{PathParseError, PathSegment, ResultPath};
pub use props::{PropsSource, ValidatorProps};
pub use result::{
    Detail, FieldError, FormState, Outcome, ValidationResult, ALL, ARRAY_ELEMENTS, ARRAY_OF, EACH,
    EVERY, FORM, OBJECT_PROPS, PROPS, SOME,
};
pub use validate::{is_empty_value, normalize, validate, validate_async, validate_async_from};
pub use validator::{LeafFn, Validator};
