//! Validator props: descriptive configuration merged onto composite results.
//!
//! Props carry metadata such as a custom `message` without affecting the
//! computed fields of a result. They may also carry middleware that applies to
//! the composite they configure (and only to it).

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::context::ValidationContext;
use crate::middleware::Middleware;

/// Configuration for a composite validator.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{every, validators::required, Validator, ValidatorProps};
///
/// let validator = every(Validator::sequence([required()]))
///     .unwrap();
/// let with_message = verdict::every_with(
///     Validator::sequence([required()]),
///     ValidatorProps::new().with("message", "name is required"),
/// )
/// .unwrap();
///
/// assert_eq!(validator.validate(&json!("")).message(), None);
/// assert_eq!(with_message.validate(&json!("")).message(), Some("name is required"));
/// ```
#[derive(Clone, Default)]
pub struct ValidatorProps {
    data: Map<String, Value>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl ValidatorProps {
    /// Creates empty props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptive property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Adds middleware applied by the configured composite.
    pub fn with_middleware<M>(mut self, middleware: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Returns the descriptive properties.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Returns the configured middleware, in application order.
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }
}

impl From<Map<String, Value>> for ValidatorProps {
    fn from(data: Map<String, Value>) -> Self {
        Self {
            data,
            middleware: Vec::new(),
        }
    }
}

impl fmt::Debug for ValidatorProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorProps")
            .field("data", &self.data)
            .field("middleware", &self.middleware.len())
            .finish()
    }
}

type PropsFn = dyn Fn(&ValidationContext) -> ValidatorProps + Send + Sync;

/// Props given either up front or computed from the validation context.
#[derive(Clone)]
pub enum PropsSource {
    /// Props fixed at construction.
    Static(ValidatorProps),
    /// Props computed from the context on every validation.
    Dynamic(Arc<PropsFn>),
}

impl PropsSource {
    /// Creates a source that computes props from the context.
    pub fn dynamic<F>(props: F) -> Self
    where
        F: Fn(&ValidationContext) -> ValidatorProps + Send + Sync + 'static,
    {
        PropsSource::Dynamic(Arc::new(props))
    }

    /// Returns the props for `context`.
    pub fn resolve(&self, context: &ValidationContext) -> ValidatorProps {
        match self {
            PropsSource::Static(props) => props.clone(),
            PropsSource::Dynamic(props) => props(context),
        }
    }
}

impl Default for PropsSource {
    fn default() -> Self {
        PropsSource::Static(ValidatorProps::default())
    }
}

impl From<ValidatorProps> for PropsSource {
    fn from(props: ValidatorProps) -> Self {
        PropsSource::Static(props)
    }
}

impl From<Map<String, Value>> for PropsSource {
    fn from(data: Map<String, Value>) -> Self {
        PropsSource::Static(data.into())
    }
}

impl fmt::Debug for PropsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropsSource::Static(props) => f.debug_tuple("Static").field(props).finish(),
            PropsSource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<PropsSource>();
    assert_sync::<PropsSource>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_props_resolve_to_themselves() {
        let source: PropsSource = ValidatorProps::new().with("message", "required").into();
        let props = source.resolve(&ValidationContext::new());
        assert_eq!(props.data().get("message"), Some(&json!("required")));
    }

    #[test]
    fn test_dynamic_props_read_context() {
        let source = PropsSource::dynamic(|context| {
            let locale = context.get("locale").and_then(Value::as_str).unwrap_or("en");
            let message = if locale == "fr" { "obligatoire" } else { "required" };
            ValidatorProps::new().with("message", message)
        });

        let french = source.resolve(&ValidationContext::new().with("locale", "fr"));
        let default = source.resolve(&ValidationContext::new());
        assert_eq!(french.data().get("message"), Some(&json!("obligatoire")));
        assert_eq!(default.data().get("message"), Some(&json!("required")));
    }

    #[test]
    fn test_from_map() {
        let mut data = Map::new();
        data.insert("min".to_string(), json!(3));
        let props = ValidatorProps::from(data);
        assert_eq!(props.data().len(), 1);
        assert!(props.middleware().is_empty());
    }
}
