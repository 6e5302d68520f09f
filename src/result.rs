//! The canonical validation result and the raw outcomes validators return.
//!
//! A validator function returns an [`Outcome`]: a boolean, a (possibly partial)
//! [`ValidationResult`], a [`Deferred`] handle, or nothing at all. The dispatcher
//! normalizes every outcome into a `ValidationResult` whose `value` echoes the
//! validated value and whose `is_valid` is a strict boolean.
//!
//! Composite validators record their children under named [`Detail`] entries
//! (`every`, `objectProps`, `form`, ...). Merging is explicit: props and details of
//! a child are spread over the parent with the child winning on overlapping keys.

use std::fmt::{self, Display};

use futures::future::{self, FutureExt};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::deferred::{Deferred, ResolveFuture, ResolveInput};
use crate::error::FieldErrors;
use crate::path::{PathSegment, ResultPath};

/// Detail key written by `every`.
pub const EVERY: &str = "every";
/// Detail key written by `some`.
pub const SOME: &str = "some";
/// Detail key written by `all`.
pub const ALL: &str = "all";
/// Detail key written by `each`.
pub const EACH: &str = "each";
/// Detail key written by `array_of`.
pub const ARRAY_OF: &str = "arrayOf";
/// Detail key written by `array_elements`.
pub const ARRAY_ELEMENTS: &str = "arrayElements";
/// Detail key written by `object_props`.
pub const OBJECT_PROPS: &str = "objectProps";
/// Detail key written by `props` and by mapping sugar.
pub const PROPS: &str = "props";
/// Detail key written by `form`.
pub const FORM: &str = "form";

/// The outcome of a validation.
///
/// `is_valid` and `value` are always present. `props` carries descriptive
/// properties contributed by validators and their configuration (`message`,
/// `required`, `min`, ...). `details` carries the child results of composites.
/// A result is *pending* while it holds a deferred handle; resolving it yields a
/// new result rather than mutating this one.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{validate, validators::required, ValidationContext};
///
/// let result = validate(&required(), &json!(""), &ValidationContext::new());
/// assert!(!result.is_valid);
/// assert_eq!(result.value, json!(""));
/// assert_eq!(result.prop("required"), Some(&json!(true)));
/// ```
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the value passed validation.
    pub is_valid: bool,
    /// The validated value, echoed unchanged.
    pub value: Value,
    /// Descriptive properties contributed by validators and their props.
    pub props: Map<String, Value>,
    /// Child results recorded by composite validators, keyed by combinator.
    pub details: IndexMap<String, Detail>,
    deferred: Option<Deferred>,
}

impl ValidationResult {
    /// Creates a result with the given validity and a null value.
    pub fn new(is_valid: bool) -> Self {
        Self {
            is_valid,
            value: Value::Null,
            props: Map::new(),
            details: IndexMap::new(),
            deferred: None,
        }
    }

    /// Creates a valid result.
    pub fn valid() -> Self {
        Self::new(true)
    }

    /// Creates an invalid result.
    pub fn invalid() -> Self {
        Self::new(false)
    }

    /// Sets the echoed value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Adds a descriptive property.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Adds every entry of `props`, overriding existing keys.
    pub fn with_props(mut self, props: Map<String, Value>) -> Self {
        self.props.extend(props);
        self
    }

    /// Records a detail entry under `key`.
    pub fn with_detail(mut self, key: impl Into<String>, detail: Detail) -> Self {
        self.details.insert(key.into(), detail);
        self
    }

    /// Marks the result as pending on `deferred`.
    pub fn with_deferred(mut self, deferred: Deferred) -> Self {
        self.deferred = Some(deferred);
        self
    }

    /// Returns the property stored under `key`.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Returns the `message` property when it is a string.
    pub fn message(&self) -> Option<&str> {
        self.prop("message").and_then(Value::as_str)
    }

    /// Returns the ordered child results recorded under `key`.
    pub fn list(&self, key: &str) -> Option<&[ValidationResult]> {
        match self.details.get(key) {
            Some(Detail::List(results)) => Some(results),
            _ => None,
        }
    }

    /// Returns the keyed child results recorded under `key`.
    pub fn keyed(&self, key: &str) -> Option<&IndexMap<String, ValidationResult>> {
        match self.details.get(key) {
            Some(Detail::Keyed(results)) => Some(results),
            _ => None,
        }
    }

    /// Returns the form state recorded by a form validator.
    pub fn form(&self) -> Option<&FormState> {
        match self.details.get(FORM) {
            Some(Detail::Form(state)) => Some(state),
            _ => None,
        }
    }

    /// Returns true while asynchronous work remains.
    pub fn is_pending(&self) -> bool {
        self.deferred.is_some()
    }

    /// Returns the deferred handle, if asynchronous work remains.
    pub fn deferred(&self) -> Option<&Deferred> {
        self.deferred.as_ref()
    }

    pub(crate) fn take_deferred(&mut self) -> Option<Deferred> {
        self.deferred.take()
    }

    /// Returns the direct child addressed by `segment`.
    ///
    /// Field segments look through keyed details and form results; index
    /// segments look through ordered details.
    pub fn child(&self, segment: &PathSegment) -> Option<&ValidationResult> {
        self.details
            .values()
            .find_map(|detail| match (detail, segment) {
                (Detail::Keyed(results), PathSegment::Field(name)) => results.get(name),
                (Detail::Form(state), PathSegment::Field(name)) => {
                    state.validation_results.get(name)
                }
                (Detail::List(results), PathSegment::Index(idx)) => results.get(*idx),
                _ => None,
            })
    }

    /// Returns the nested result addressed by `path`.
    ///
    /// ```rust
    /// use serde_json::json;
    /// use verdict::{object_props, validators::required, Validator};
    ///
    /// let validator = object_props(Validator::keyed([
    ///     ("name", required()),
    ///     ("address", Validator::keyed([("city", required())])),
    /// ]))
    /// .unwrap();
    ///
    /// let result = validator.validate(&json!({"name": "Ada", "address": {"city": ""}}));
    /// let city = result.find(&"address.city".parse().unwrap()).unwrap();
    /// assert!(!city.is_valid);
    /// ```
    pub fn find(&self, path: &ResultPath) -> Option<&ValidationResult> {
        path.segments()
            .try_fold(self, |current, segment| current.child(segment))
    }

    /// Performs one resolution step.
    ///
    /// Settled results resolve to a copy of themselves. A pending result runs its
    /// deferred handle (flattening handles that resolve to further handles) and
    /// normalizes the outcome. The resolved result may itself still be pending, for
    /// example when `input` scopes a form continuation to a subset of fields.
    pub fn resolve_async(&self, input: ResolveInput) -> ResolveFuture {
        match &self.deferred {
            Some(deferred) => deferred.resolve(self.value.clone(), input),
            None => future::ready(Ok(self.clone())).boxed(),
        }
    }

    /// Resolves repeatedly until no asynchronous work remains.
    ///
    /// `input` is used as given for the first step; later steps forward only its
    /// value source.
    pub fn settle(self, input: ResolveInput) -> ResolveFuture {
        async move {
            let mut result = self;
            let mut input = input;
            while result.is_pending() {
                result = result.resolve_async(input.clone()).await?;
                input = input.forwarded();
            }
            Ok(result)
        }
        .boxed()
    }

    /// Converts into a `Validation`, succeeding with the value when valid.
    pub fn into_validation(self) -> Validation<Value, ValidationResult> {
        if self.is_valid {
            Validation::Success(self.value)
        } else {
            Validation::Failure(self)
        }
    }

    /// Spreads `other` over `self`: props and details of `other` win on
    /// overlapping keys. Validity, value and pending state stay with `self`.
    pub(crate) fn spread(mut self, other: ValidationResult) -> Self {
        self.props.extend(other.props);
        self.details.extend(other.details);
        self
    }
}

impl PartialEq for ValidationResult {
    fn eq(&self, other: &Self) -> bool {
        self.is_valid == other.is_valid
            && self.value == other.value
            && self.props == other.props
            && self.details == other.details
            && self.is_pending() == other.is_pending()
    }
}

/// Child results recorded by a composite validator.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    /// Ordered children (`every`, `some`, `all`, `each`, `arrayOf`, `arrayElements`).
    List(Vec<ValidationResult>),
    /// Children keyed by property name (`objectProps`, `props`).
    Keyed(IndexMap<String, ValidationResult>),
    /// The state of a form validator.
    Form(FormState),
}

/// The accumulated state of a form validator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    /// True once every declared field has a settled result.
    pub is_complete: bool,
    /// The latest result for every field validated so far.
    pub validation_results: IndexMap<String, ValidationResult>,
    /// Settled invalid fields, in the order their results were recorded.
    pub validation_errors: Vec<FieldError>,
}

impl FormState {
    /// Returns the recorded result for `field_name`.
    pub fn field(&self, field_name: &str) -> Option<&ValidationResult> {
        self.validation_results.get(field_name)
    }

    /// Returns the names of fields with a recorded result.
    pub fn validated_fields(&self) -> Vec<&str> {
        self.validation_results.keys().map(String::as_str).collect()
    }

    /// Converts the recorded errors into a `Validation`.
    ///
    /// Succeeds when no settled field is invalid; an incomplete form with no
    /// errors so far also succeeds, so check `is_complete` when that matters.
    pub fn to_validation(&self) -> Validation<(), FieldErrors> {
        match FieldErrors::from_vec(self.validation_errors.clone()) {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(()),
        }
    }
}

/// An invalid form field and its result.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    /// The name of the invalid field.
    pub field_name: String,
    /// The field's settled result.
    pub result: ValidationResult,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(field_name: impl Into<String>, result: ValidationResult) -> Self {
        Self {
            field_name: field_name.into(),
            result,
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.result.message() {
            Some(message) => write!(f, "{}: {}", self.field_name, message),
            None => write!(f, "{}: invalid", self.field_name),
        }
    }
}

/// The raw return of a validator function, before normalization.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// No result at all; normalizes to invalid.
    Missing,
    /// A bare validity flag.
    Bool(bool),
    /// A (possibly partial) result; `value` is overwritten on normalization.
    Result(ValidationResult),
    /// Work that has not finished yet.
    Deferred(Deferred),
}

impl From<bool> for Outcome {
    fn from(is_valid: bool) -> Self {
        Outcome::Bool(is_valid)
    }
}

impl From<ValidationResult> for Outcome {
    fn from(result: ValidationResult) -> Self {
        Outcome::Result(result)
    }
}

impl From<Deferred> for Outcome {
    fn from(deferred: Deferred) -> Self {
        Outcome::Deferred(deferred)
    }
}

impl From<()> for Outcome {
    fn from(_: ()) -> Self {
        Outcome::Missing
    }
}

impl<T: Into<Outcome>> From<Option<T>> for Outcome {
    fn from(outcome: Option<T>) -> Self {
        outcome.map_or(Outcome::Missing, Into::into)
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationResult>();
    assert_sync::<ValidationResult>();
    assert_send::<Outcome>();
    assert_sync::<Outcome>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list_result(key: &str, children: Vec<ValidationResult>) -> ValidationResult {
        ValidationResult::valid().with_detail(key, Detail::List(children))
    }

    #[test]
    fn test_builders() {
        let result = ValidationResult::invalid()
            .with_value(json!(3))
            .with_prop("min", 5)
            .with_prop("message", "too small");

        assert!(!result.is_valid);
        assert_eq!(result.value, json!(3));
        assert_eq!(result.prop("min"), Some(&json!(5)));
        assert_eq!(result.message(), Some("too small"));
        assert!(!result.is_pending());
    }

    #[test]
    fn test_spread_child_wins() {
        let parent = ValidationResult::valid()
            .with_prop("message", "parent")
            .with_prop("kept", true);
        let child = ValidationResult::invalid().with_prop("message", "child");

        let merged = parent.spread(child);
        assert!(merged.is_valid);
        assert_eq!(merged.message(), Some("child"));
        assert_eq!(merged.prop("kept"), Some(&json!(true)));
    }

    #[test]
    fn test_find_mixed_path() {
        let leaf = ValidationResult::invalid().with_prop("message", "leaf");
        let keyed = ValidationResult::valid().with_detail(
            OBJECT_PROPS,
            Detail::Keyed(IndexMap::from([("city".to_string(), leaf.clone())])),
        );
        let root = list_result(EVERY, vec![ValidationResult::valid(), keyed]);

        let path: ResultPath = "[1].city".parse().unwrap();
        assert_eq!(root.find(&path), Some(&leaf));
        assert!(root.find(&"[2]".parse().unwrap()).is_none());
        assert_eq!(root.find(&ResultPath::root()), Some(&root));
    }

    #[test]
    fn test_find_into_form() {
        let state = FormState {
            is_complete: false,
            validation_results: IndexMap::from([(
                "email".to_string(),
                ValidationResult::invalid(),
            )]),
            validation_errors: Vec::new(),
        };
        let result = ValidationResult::invalid().with_detail(FORM, Detail::Form(state));

        assert!(result.child(&PathSegment::field("email")).is_some());
        assert!(result.form().is_some());
    }

    #[test]
    fn test_outcome_conversions() {
        assert!(matches!(Outcome::from(true), Outcome::Bool(true)));
        assert!(matches!(Outcome::from(()), Outcome::Missing));
        assert!(matches!(Outcome::from(None::<bool>), Outcome::Missing));
        assert!(matches!(
            Outcome::from(Some(ValidationResult::valid())),
            Outcome::Result(_)
        ));
    }

    #[test]
    fn test_into_validation() {
        let valid = ValidationResult::valid().with_value(json!("x"));
        assert!(valid.into_validation().is_success());

        let invalid = ValidationResult::invalid();
        assert!(invalid.into_validation().is_failure());
    }

    #[test]
    fn test_form_state_to_validation() {
        let mut state = FormState::default();
        assert!(state.to_validation().is_success());

        state
            .validation_errors
            .push(FieldError::new("name", ValidationResult::invalid()));
        let errors = state.to_validation().into_result().unwrap_err();
        assert_eq!(errors.field_names(), vec!["name"]);
    }

    #[tokio::test]
    async fn test_settled_result_resolves_to_itself() {
        let result = ValidationResult::valid().with_value(json!(1));
        let resolved = result.resolve_async(ResolveInput::new()).await.unwrap();
        assert_eq!(resolved, result);
    }
}
