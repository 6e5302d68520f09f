//! Deferred resolution handles.
//!
//! A validator that cannot decide synchronously returns a [`Deferred`] handle
//! (or a result carrying one). Handles come in two forms:
//!
//! - **lazy** ([`Deferred::new`]): a function run each time the result is
//!   resolved, receiving the [`ResolveInput`] of that resolution;
//! - **memoized** ([`Deferred::from_future`]): a future started once and shared,
//!   so resolving the same result twice never repeats the work.
//!
//! Resolving a handle flattens handles that resolve to further handles and then
//! normalizes the settled outcome against the validated value.
//!
//! # Race conditions
//!
//! A continuation captures the value and context of the synchronous pass that
//! created it. When the underlying value can change before resolution finishes,
//! resolve with a [`ValueSource::Getter`]: the getter is read when the
//! resolution completes and the resolved result echoes what it returned, so the
//! caller can compare it with the value it validated and discard a stale result.
//! The library does not cancel or discard anything itself.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;

use crate::context::ValidationContext;
use crate::error::ValidatorError;
use crate::result::{Outcome, ValidationResult};
use crate::validate::normalize;

/// The future returned when a result is resolved.
pub type ResolveFuture = BoxFuture<'static, Result<ValidationResult, ValidatorError>>;

type OutcomeFuture = BoxFuture<'static, Result<Outcome, ValidatorError>>;

type Resolver = Arc<dyn Fn(ResolveInput) -> OutcomeFuture + Send + Sync>;

/// Where a resolution reads the current value from.
#[derive(Clone, Default)]
pub enum ValueSource {
    /// The value captured by the synchronous pass.
    #[default]
    Captured,
    /// A fixed replacement value.
    Fixed(Value),
    /// A getter read when the resolution completes.
    Getter(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl ValueSource {
    /// Creates a source backed by a getter.
    pub fn getter<F>(getter: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        ValueSource::Getter(Arc::new(getter))
    }

    /// Returns the current value, falling back to `captured`.
    pub fn current(&self, captured: &Value) -> Value {
        match self {
            ValueSource::Captured => captured.clone(),
            ValueSource::Fixed(value) => value.clone(),
            ValueSource::Getter(getter) => getter(),
        }
    }
}

impl From<Value> for ValueSource {
    fn from(value: Value) -> Self {
        ValueSource::Fixed(value)
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Captured => f.write_str("Captured"),
            ValueSource::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            ValueSource::Getter(_) => f.write_str("Getter(..)"),
        }
    }
}

/// Arguments of one resolution.
///
/// `context` is the continuation context handed to the result being resolved
/// directly; a form uses its `form.fields` to scope which pending fields it
/// resolves. Composites forward only the value source, and only to children
/// validating the composite's own value; element, property and field results
/// resolve against the value they captured.
#[derive(Debug, Clone, Default)]
pub struct ResolveInput {
    /// Where to read the current value from.
    pub source: ValueSource,
    /// The continuation context, if any.
    pub context: Option<ValidationContext>,
}

impl ResolveInput {
    /// Creates an input that echoes the captured value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves against a fixed value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.source = ValueSource::Fixed(value);
        self
    }

    /// Resolves against a getter read at completion time.
    pub fn with_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.source = ValueSource::getter(getter);
        self
    }

    /// Sets the value source.
    pub fn with_source(mut self, source: ValueSource) -> Self {
        self.source = source;
        self
    }

    /// Sets the continuation context.
    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the current value, falling back to `captured`.
    pub fn current_value(&self, captured: &Value) -> Value {
        self.source.current(captured)
    }

    /// The input handed to same-value children: the same value source, no
    /// context.
    pub(crate) fn forwarded(&self) -> Self {
        Self {
            source: self.source.clone(),
            context: None,
        }
    }
}

/// A handle on validation work that has not finished.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{validate_async, Deferred, Validator, ValidatorError, ValidationContext};
///
/// let available = Validator::leaf(|value, _context| {
///     let taken = value.as_str() == Some("admin");
///     Deferred::new(move |_input| async move { Ok::<_, ValidatorError>(!taken) })
/// });
///
/// let result = futures::executor::block_on(validate_async(
///     &available,
///     &json!("ada"),
///     &ValidationContext::new(),
/// ))
/// .unwrap();
/// assert!(result.is_valid);
/// ```
#[derive(Clone)]
pub struct Deferred(Handle);

#[derive(Clone)]
enum Handle {
    Lazy(Resolver),
    Memoized(Shared<OutcomeFuture>),
}

impl Deferred {
    /// Creates a lazy handle; `resolve` runs on every resolution.
    pub fn new<F, Fut, O>(resolve: F) -> Self
    where
        F: Fn(ResolveInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, ValidatorError>> + Send + 'static,
        O: Into<Outcome> + 'static,
    {
        Deferred(Handle::Lazy(Arc::new(move |input| -> OutcomeFuture {
            resolve(input).map(|outcome| outcome.map(Into::into)).boxed()
        })))
    }

    /// Creates a memoized handle around a future that is polled at most once.
    pub fn from_future<Fut, O>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<O, ValidatorError>> + Send + 'static,
        O: Into<Outcome> + 'static,
    {
        let future: OutcomeFuture = future.map(|outcome| outcome.map(Into::into)).boxed();
        Deferred(Handle::Memoized(future.shared()))
    }

    /// Creates a lazy handle whose resolution is already a normalized result.
    pub(crate) fn continuation<F>(resolve: F) -> Self
    where
        F: Fn(ResolveInput) -> ResolveFuture + Send + Sync + 'static,
    {
        Deferred(Handle::Lazy(Arc::new(move |input| -> OutcomeFuture {
            resolve(input).map(|result| result.map(Outcome::Result)).boxed()
        })))
    }

    /// Returns a handle that resolves this one against `value` and passes the
    /// normalized result through `then`.
    pub(crate) fn map_result<F>(self, value: Value, then: F) -> Self
    where
        F: Fn(ValidationResult) -> ValidationResult + Send + Sync + 'static,
    {
        let then = Arc::new(then);
        Deferred::continuation(move |input| {
            let resolving = self.resolve(value.clone(), input);
            let then = Arc::clone(&then);
            async move { resolving.await.map(|result| then(result)) }.boxed()
        })
    }

    fn invoke(&self, input: ResolveInput) -> OutcomeFuture {
        match &self.0 {
            Handle::Lazy(resolve) => resolve(input),
            Handle::Memoized(shared) => shared.clone().boxed(),
        }
    }

    /// Runs the handle, following handles that resolve to further handles, and
    /// normalizes the settled outcome against the current value.
    pub(crate) fn resolve(&self, captured: Value, input: ResolveInput) -> ResolveFuture {
        let first = self.invoke(input.clone());
        async move {
            let mut outcome = first.await?;
            let outcome = loop {
                match outcome {
                    Outcome::Deferred(next) => outcome = next.invoke(input.clone()).await?,
                    settled => break settled,
                }
            };
            let current = input.current_value(&captured);
            Ok(normalize(outcome, &current))
        }
        .boxed()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Handle::Lazy(_) => f.write_str("Deferred::Lazy(..)"),
            Handle::Memoized(_) => f.write_str("Deferred::Memoized(..)"),
        }
    }
}
