//! The read-only context passed alongside every validated value.
//!
//! A [`ValidationContext`] carries ambient data for leaf validators, middleware
//! applied by every composite it reaches, per-child overrides, and the form
//! state a [`form`](crate::form) validator reads. Validators never modify the
//! context they receive; composites derive child contexts from it instead.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::middleware::Middleware;
use crate::path::PathSegment;
use crate::result::{FormState, ValidationResult};

/// Context passed to validators.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::ValidationContext;
///
/// // The element at index 1 gets its own data
/// let context = ValidationContext::new()
///     .with("strict", true)
///     .with_override("arrayOf", 1usize, ValidationContext::new().with("strict", false));
///
/// let scoped = context.override_for("arrayOf", &1usize.into()).unwrap();
/// assert_eq!(scoped.get("strict"), Some(&json!(false)));
/// ```
#[derive(Clone, Default)]
pub struct ValidationContext {
    data: Map<String, Value>,
    middleware: Vec<Arc<dyn Middleware>>,
    overrides: IndexMap<String, IndexMap<PathSegment, ValidationContext>>,
    form: Option<FormContext>,
}

impl ValidationContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an ambient value readable by validators.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Returns the ambient value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns every ambient value.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Adds middleware applied by every composite this context reaches.
    ///
    /// Context middleware wraps outside the middleware a composite carries in
    /// its own props.
    pub fn with_middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Returns the context middleware, in application order.
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// Registers a context merged into one child's context.
    ///
    /// `scope` is the detail name of the composite (`"objectProps"`, `"props"`,
    /// `"arrayOf"`, `"arrayElements"`) and `key` selects the child.
    pub fn with_override(
        mut self,
        scope: impl Into<String>,
        key: impl Into<PathSegment>,
        context: ValidationContext,
    ) -> Self {
        self.overrides
            .entry(scope.into())
            .or_default()
            .insert(key.into(), context);
        self
    }

    /// Returns the override registered for one child.
    pub fn override_for(&self, scope: &str, key: &PathSegment) -> Option<&ValidationContext> {
        self.overrides.get(scope).and_then(|children| children.get(key))
    }

    /// Sets the form context.
    pub fn with_form(mut self, form: FormContext) -> Self {
        self.form = Some(form);
        self
    }

    /// Returns the form context.
    pub fn form(&self) -> Option<&FormContext> {
        self.form.as_ref()
    }

    /// Returns a copy with `other` merged over it.
    ///
    /// Ambient values and override scopes of `other` win; its middleware
    /// replaces this context's middleware when non-empty, and its form context
    /// replaces this one when present.
    pub fn merged(&self, other: &ValidationContext) -> ValidationContext {
        let mut merged = self.clone();
        merged
            .data
            .extend(other.data.iter().map(|(k, v)| (k.clone(), v.clone())));
        if !other.middleware.is_empty() {
            merged.middleware = other.middleware.clone();
        }
        merged.overrides.extend(
            other
                .overrides
                .iter()
                .map(|(scope, children)| (scope.clone(), children.clone())),
        );
        if let Some(form) = &other.form {
            merged.form = Some(form.clone());
        }
        merged
    }

    /// The context of one child of the composite named `scope`: the scope's
    /// override map is dropped so sibling overrides never leak into children,
    /// then the child's own override (if any) is merged in.
    pub(crate) fn scoped(&self, scope: &str, key: &PathSegment) -> ValidationContext {
        let own = self.override_for(scope, key).cloned();
        let mut child = self.clone();
        child.overrides.shift_remove(scope);
        match own {
            Some(own) => child.merged(&own),
            None => child,
        }
    }

    /// A copy whose form context exposes `values` to field validators.
    pub(crate) fn with_form_values(&self, values: Value) -> ValidationContext {
        let mut child = self.clone();
        child.form.get_or_insert_with(FormContext::default).values = Some(values);
        child
    }

    /// A copy with `middleware` applied inside the existing context middleware.
    pub(crate) fn prepend_middleware(&self, middleware: Arc<dyn Middleware>) -> ValidationContext {
        let mut child = self.clone();
        child.middleware.insert(0, middleware);
        child
    }
}

impl fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("data", &self.data)
            .field("middleware", &self.middleware.len())
            .field("overrides", &self.overrides)
            .field("form", &self.form)
            .finish()
    }
}

/// The form-related part of a context.
#[derive(Debug, Clone, Default)]
pub struct FormContext {
    /// Fields to (re)validate; `None` means every declared field.
    pub fields: Option<Vec<String>>,
    /// Results from previous passes, carried forward for unselected fields.
    pub validation_results: IndexMap<String, ValidationResult>,
    /// The whole form value, set by the form for its field validators.
    pub values: Option<Value>,
}

impl FormContext {
    /// Creates an empty form context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts validation to `fields`.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the results carried forward from previous passes.
    pub fn with_results(mut self, results: IndexMap<String, ValidationResult>) -> Self {
        self.validation_results = results;
        self
    }

    /// Creates a form context carrying the results of a previous pass.
    pub fn from_state(state: &FormState) -> Self {
        Self::new().with_results(state.validation_results.clone())
    }

    /// Returns true if `field` is selected for validation.
    pub fn selects(&self, field: &str) -> bool {
        self.fields
            .as_ref()
            .map_or(true, |fields| fields.iter().any(|f| f == field))
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationContext>();
    assert_sync::<ValidationContext>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Noop;

    impl Middleware for Noop {}

    #[test]
    fn test_builders_and_getters() {
        let context = ValidationContext::new()
            .with("locale", "en")
            .with_middleware(Noop);

        assert_eq!(context.get("locale"), Some(&json!("en")));
        assert!(context.get("missing").is_none());
        assert_eq!(context.middleware().len(), 1);
        assert!(context.form().is_none());
    }

    #[test]
    fn test_merged_prefers_other() {
        let base = ValidationContext::new().with("a", 1).with("b", 2);
        let other = ValidationContext::new().with("b", 3);

        let merged = base.merged(&other);
        assert_eq!(merged.get("a"), Some(&json!(1)));
        assert_eq!(merged.get("b"), Some(&json!(3)));
    }

    #[test]
    fn test_merged_keeps_middleware_when_other_has_none() {
        let base = ValidationContext::new().with_middleware(Noop);
        let merged = base.merged(&ValidationContext::new());
        assert_eq!(merged.middleware().len(), 1);
    }

    #[test]
    fn test_scoped_applies_own_override() {
        let context = ValidationContext::new()
            .with("message", "default")
            .with_override(
                "objectProps",
                "email",
                ValidationContext::new().with("message", "bad email"),
            );

        let email = context.scoped("objectProps", &PathSegment::field("email"));
        let name = context.scoped("objectProps", &PathSegment::field("name"));
        assert_eq!(email.get("message"), Some(&json!("bad email")));
        assert_eq!(name.get("message"), Some(&json!("default")));
    }

    #[test]
    fn test_scoped_drops_sibling_overrides() {
        let context = ValidationContext::new()
            .with_override("objectProps", "a", ValidationContext::new().with("x", 1))
            .with_override("arrayOf", 0usize, ValidationContext::new().with("y", 2));

        let child = context.scoped("objectProps", &PathSegment::field("a"));
        assert!(child.override_for("objectProps", &PathSegment::field("a")).is_none());
        assert!(child.override_for("arrayOf", &PathSegment::index(0)).is_some());
    }

    #[test]
    fn test_with_form_values_keeps_form_state() {
        let form = FormContext::new().with_fields(["email"]);
        let context = ValidationContext::new().with_form(form);

        let child = context.with_form_values(json!({"email": "a@b.c"}));
        let form = child.form().unwrap();
        assert_eq!(form.fields, Some(vec!["email".to_string()]));
        assert_eq!(form.values, Some(json!({"email": "a@b.c"})));
        assert!(context.form().unwrap().values.is_none());
    }

    #[test]
    fn test_form_context_selects() {
        assert!(FormContext::new().selects("anything"));

        let scoped = FormContext::new().with_fields(["a", "b"]);
        assert!(scoped.selects("a"));
        assert!(!scoped.selects("c"));
    }
}
