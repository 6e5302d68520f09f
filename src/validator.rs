//! The validator sum type.
//!
//! A validator is one of three shapes:
//!
//! - **leaf**: a function of the value and context returning an [`Outcome`];
//! - **sequence**: an ordered list of validators, validated like [`every`](crate::every);
//! - **keyed**: a mapping of property names to validators, validated like
//!   [`props`](crate::props).
//!
//! Combinators build leaves, so every composite is itself a `Validator` and
//! trees compose freely.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::context::ValidationContext;
use crate::result::{Outcome, ValidationResult};
use crate::validate::validate;

/// A validator function.
pub type LeafFn = dyn Fn(&Value, &ValidationContext) -> Outcome + Send + Sync;

/// A validator: a function, a sequence, or a keyed mapping.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{validators::{min_length, required}, Validator};
///
/// let user = Validator::keyed([
///     ("name", Validator::sequence([required(), min_length(2)])),
///     ("email", required()),
/// ]);
///
/// let result = user.validate(&json!({"name": "A", "email": "a@example.com"}));
/// assert!(!result.is_valid);
/// assert_eq!(user.kind(), "mapping");
/// ```
#[derive(Clone)]
pub enum Validator {
    /// A validator function.
    Leaf(Arc<LeafFn>),
    /// An ordered sequence of validators.
    Sequence(Arc<[Validator]>),
    /// A mapping of property names to validators.
    Keyed(Arc<IndexMap<String, Validator>>),
}

impl Validator {
    /// Wraps a validator function.
    ///
    /// The function may return anything convertible into an [`Outcome`]: a
    /// `bool`, a [`ValidationResult`], a [`Deferred`](crate::Deferred), an
    /// `Option` of those, or `()`.
    pub fn leaf<F, O>(check: F) -> Self
    where
        F: Fn(&Value, &ValidationContext) -> O + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        Validator::Leaf(Arc::new(
            move |value: &Value, context: &ValidationContext| -> Outcome {
                check(value, context).into()
            },
        ))
    }

    /// Creates a sequence validator.
    pub fn sequence<I, V>(validators: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Validator>,
    {
        Validator::Sequence(validators.into_iter().map(Into::into).collect())
    }

    /// Creates a keyed validator; entries keep their declaration order.
    pub fn keyed<I, K, V>(validators: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Validator>,
    {
        Validator::Keyed(Arc::new(
            validators
                .into_iter()
                .map(|(key, validator)| (key.into(), validator.into()))
                .collect(),
        ))
    }

    /// Returns the name of this validator's shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Validator::Leaf(_) => "function",
            Validator::Sequence(_) => "sequence",
            Validator::Keyed(_) => "mapping",
        }
    }

    /// Validates `value` with an empty context.
    pub fn validate(&self, value: &Value) -> ValidationResult {
        validate(self, value, &ValidationContext::default())
    }

    /// Validates `value` with `context`.
    pub fn validate_with(&self, value: &Value, context: &ValidationContext) -> ValidationResult {
        validate(self, value, context)
    }
}

impl From<Vec<Validator>> for Validator {
    fn from(validators: Vec<Validator>) -> Self {
        Validator::Sequence(validators.into())
    }
}

impl<const N: usize> From<[Validator; N]> for Validator {
    fn from(validators: [Validator; N]) -> Self {
        Validator::Sequence(validators.into_iter().collect())
    }
}

impl From<IndexMap<String, Validator>> for Validator {
    fn from(validators: IndexMap<String, Validator>) -> Self {
        Validator::Keyed(Arc::new(validators))
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Leaf(_) => f.write_str("Leaf(..)"),
            Validator::Sequence(validators) => f.debug_list().entries(validators.iter()).finish(),
            Validator::Keyed(validators) => f.debug_map().entries(validators.iter()).finish(),
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Validator>();
    assert_sync::<Validator>();
};
