//! `form`: a property-set validator with field selection and carried state.
//!
//! A form validates a mapping of field validators against an object value,
//! like [`props`](crate::props), but keeps state across passes:
//!
//! - `context.form.fields` selects the fields validated by a pass; fields not
//!   selected keep the result carried in `context.form.validation_results`,
//!   including a pending one.
//! - Field validators see the whole form value as `context.form.values`.
//! - The result records every field result, the settled invalid fields, and
//!   whether every declared field has a settled result.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use verdict::{form, validators::required, Validator};
//!
//! let signup = form(Validator::keyed([
//!     ("first_name", required()),
//!     ("last_name", required()),
//! ]))
//! .unwrap();
//!
//! let value = json!({"first_name": "Ada", "last_name": ""});
//!
//! // Validate one field at a time, as a UI would on blur
//! let first = signup.validate_fields(&value, ["first_name"], None);
//! assert!(!first.form().unwrap().is_complete);
//!
//! let both = signup.validate_fields(&value, ["last_name"], Some(&first));
//! let state = both.form().unwrap();
//! assert!(state.is_complete);
//! assert!(!both.is_valid);
//! assert_eq!(state.validation_errors[0].field_name, "last_name");
//! ```

use std::sync::Arc;

use futures::future::{try_join_all, FutureExt};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use super::{expect_mapping, Children};
use super::object::{empty_keyed, keyed_core, keyed_current};
use crate::context::{FormContext, ValidationContext};
use crate::deferred::Deferred;
use crate::error::ValidatorError;
use crate::middleware::Pipeline;
use crate::props::PropsSource;
use crate::result::{Detail, FieldError, FormState, ValidationResult, FORM, PROPS};
use crate::validate::validate;
use crate::validator::Validator;

/// A form validator and its auxiliary operations.
#[derive(Clone)]
pub struct FormValidator {
    validators: Arc<IndexMap<String, Validator>>,
    props: PropsSource,
}

/// Creates a form validator from a mapping of field validators.
///
/// # Errors
///
/// Returns [`ValidatorError::InvalidValidator`] unless `validators` is a
/// mapping.
pub fn form(validators: impl Into<Validator>) -> Result<FormValidator, ValidatorError> {
    form_with(validators, PropsSource::default())
}

/// Like [`form`], with props.
pub fn form_with(
    validators: impl Into<Validator>,
    props: impl Into<PropsSource>,
) -> Result<FormValidator, ValidatorError> {
    let validators = expect_mapping(FORM, validators.into())?;
    Ok(FormValidator {
        validators,
        props: props.into(),
    })
}

impl FormValidator {
    /// Returns this form as a plain validator.
    pub fn validator(&self) -> Validator {
        let form = self.clone();
        Validator::leaf(move |value, context| form.validate(value, context))
    }

    /// Returns the declared field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    /// Validates the fields selected by `context.form.fields` (all fields when
    /// absent), carrying forward the results in `context.form.validation_results`.
    pub fn validate(&self, value: &Value, context: &ValidationContext) -> ValidationResult {
        let pipeline = self.pipeline(value.clone(), context.clone());
        let form_context = context.form();
        let selected: Vec<String> = self
            .field_names()
            .filter(|name| form_context.map_or(true, |form| form.selects(name)))
            .map(str::to_owned)
            .collect();

        let mut fresh: IndexMap<String, ValidationResult> = IndexMap::new();
        let child_context = context.with_form_values(value.clone());
        for (name, validator) in self.validators.iter() {
            if selected.contains(name) {
                let field_value = value.get(name).unwrap_or(&Value::Null);
                fresh.insert(name.clone(), validate(validator, field_value, &child_context));
            }
        }

        let carried = form_context.map(|form| &form.validation_results);
        debug!(
            combinator = FORM,
            selected = ?selected,
            carried = carried.map_or(0, |carried| carried.len()),
            "validating form fields"
        );

        let results = self
            .field_names()
            .filter_map(|name| {
                let result = fresh
                    .shift_remove(name)
                    .or_else(|| carried.and_then(|carried| carried.get(name)).cloned())?;
                Some((name.to_owned(), result))
            })
            .collect();

        Arc::new(FormRun {
            pipeline,
            field_names: self.field_names().map(str::to_owned).collect(),
            selected,
        })
        .conclude(results)
    }

    /// Returns the result of a form nothing has been validated for yet.
    pub fn empty_results(&self) -> ValidationResult {
        ValidationResult::invalid().with_detail(FORM, Detail::Form(FormState::default()))
    }

    /// Validates `fields` only, carrying forward the field results of
    /// `previous`.
    pub fn validate_fields<I, S>(
        &self,
        value: &Value,
        fields: I,
        previous: Option<&ValidationResult>,
    ) -> ValidationResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut form_context = FormContext::new().with_fields(fields);
        if let Some(state) = previous.and_then(ValidationResult::form) {
            form_context = form_context.with_results(state.validation_results.clone());
        }
        self.validate(value, &ValidationContext::new().with_form(form_context))
    }

    /// Replaces field results without running their validators.
    ///
    /// `Some(result)` records the result for the field; `None` removes the
    /// field's result. Completeness and errors are recomputed.
    ///
    /// The form result is rebuilt with an empty context: the form's props and
    /// props middleware apply, but context middleware used for the pass that
    /// produced `previous` does not run again.
    pub fn update_field_results<I, S>(
        &self,
        previous: &ValidationResult,
        patch: I,
    ) -> ValidationResult
    where
        I: IntoIterator<Item = (S, Option<ValidationResult>)>,
        S: Into<String>,
    {
        let mut results = previous
            .form()
            .map(|state| state.validation_results.clone())
            .unwrap_or_default();
        for (name, result) in patch {
            let name = name.into();
            match result {
                Some(result) => {
                    results.insert(name, result);
                }
                None => {
                    results.shift_remove(&name);
                }
            }
        }

        let field_names: Vec<String> = self.field_names().map(str::to_owned).collect();
        let results = field_names
            .iter()
            .filter_map(|name| results.shift_remove(name).map(|result| (name.clone(), result)))
            .collect();

        Arc::new(FormRun {
            pipeline: self.pipeline(previous.value.clone(), ValidationContext::new()),
            selected: field_names.clone(),
            field_names,
        })
        .conclude(results)
    }

    fn pipeline(&self, value: Value, context: ValidationContext) -> Arc<Pipeline> {
        Pipeline::new(value, &self.props, context, keyed_core(PROPS))
    }
}

impl From<FormValidator> for Validator {
    fn from(form: FormValidator) -> Self {
        form.validator()
    }
}

impl std::fmt::Debug for FormValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormValidator")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .field("props", &self.props)
            .finish()
    }
}

/// One form pass: reduces the selected fields and assembles the form state.
struct FormRun {
    pipeline: Arc<Pipeline>,
    field_names: Vec<String>,
    selected: Vec<String>,
}

impl FormRun {
    fn conclude(self: &Arc<Self>, results: IndexMap<String, ValidationResult>) -> ValidationResult {
        let value = self.pipeline.value.clone();
        let keys: Vec<String> = self
            .selected
            .iter()
            .filter(|name| results.contains_key(*name))
            .cloned()
            .collect();
        let current = keyed_current(PROPS, Arc::new(keys.clone()), value.clone());
        let pass = keys
            .iter()
            .filter_map(|name| results.get(name))
            .enumerate()
            .fold(empty_keyed(PROPS, &value), |accumulated, (index, result)| {
                self.pipeline.reduce(accumulated, &current(index, result.clone()))
            });

        let pending = results.values().any(ValidationResult::is_pending);
        let validation_errors: Vec<FieldError> = results
            .iter()
            .filter(|(_, result)| !result.is_valid && !result.is_pending())
            .map(|(name, result)| FieldError::new(name.clone(), result.clone()))
            .collect();
        let is_complete = !pending
            && results.len() == self.field_names.len()
            && self.field_names.iter().all(|name| results.contains_key(name));

        let mut result = pass;
        result.details.shift_remove(PROPS);
        result.is_valid = is_complete && result.is_valid && validation_errors.is_empty();
        let state = FormState {
            is_complete,
            validation_results: results.clone(),
            validation_errors,
        };
        let result = self
            .pipeline
            .prepare(result.with_detail(FORM, Detail::Form(state)));

        if pending {
            result.with_deferred(self.continuation(results))
        } else {
            result
        }
    }

    /// Settles pending fields (those selected by the resolution's
    /// `form.fields`, or all of them) and concludes again.
    fn continuation(self: &Arc<Self>, results: IndexMap<String, ValidationResult>) -> Deferred {
        let run = Arc::clone(self);
        Deferred::continuation(move |input| {
            let scope = input.context.as_ref().and_then(ValidationContext::form).cloned();
            let forwarded = Children::Parts.input(&input);
            let settling = try_join_all(
                results
                    .iter()
                    .filter(|(name, result)| {
                        result.is_pending() && scope.as_ref().map_or(true, |form| form.selects(name))
                    })
                    .map(|(name, result)| {
                        let name = name.clone();
                        let resolving = result.clone().settle(forwarded.clone());
                        async move { resolving.await.map(|settled| (name, settled)) }
                    }),
            );
            let run = Arc::clone(&run);
            let mut results = results.clone();
            async move {
                let settled = settling.await?;
                debug!(combinator = FORM, fields = settled.len(), "settled pending form fields");
                for (name, result) in settled {
                    results.insert(name, result);
                }
                Ok(run.conclude(results))
            }
            .boxed()
        })
    }
}
