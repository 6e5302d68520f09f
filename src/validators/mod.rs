//! Leaf validators.
//!
//! Simple predicates conforming to the validator contract. Each takes its
//! configuration at construction and records it on its result as props
//! (`required: true`, `min: 3`, ...). Every validator except [`required`]
//! accepts empty values (`null` and `""`), so optional fields need no extra
//! wrapping; compose with `required` when a value must be present.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use verdict::{validators::{length, required}, Validator};
//!
//! let username = Validator::sequence([required(), length(3..=16)]);
//!
//! assert!(username.validate(&json!("ada")).is_valid);
//! assert!(!username.validate(&json!("")).is_valid);
//! assert!(!username.validate(&json!("ad")).is_valid);
//!
//! // Without `required`, an empty value passes
//! assert!(length(3..=16).validate(&json!("")).is_valid);
//! ```

mod compare;
mod length;
mod numeric;
mod pattern;
mod required;

pub use compare::{compare, compare_field};
pub use length::{length, max_length, min_length};
pub use numeric::{max, min, range};
pub use pattern::pattern;
pub use required::required;

pub use crate::validate::is_empty_value;

use serde_json::{Map, Value};

use crate::context::ValidationContext;
use crate::result::ValidationResult;
use crate::validator::Validator;

/// A leaf that accepts empty values and otherwise applies `predicate`,
/// recording `props` on every result.
fn optional<F>(props: Map<String, Value>, predicate: F) -> Validator
where
    F: Fn(&Value, &ValidationContext) -> bool + Send + Sync + 'static,
{
    Validator::leaf(move |value, context| {
        let is_valid = is_empty_value(value) || predicate(value, context);
        ValidationResult::new(is_valid).with_props(props.clone())
    })
}

/// Builds a props map from `(key, value)` pairs.
fn props<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Returns the length of a string (in characters) or an array.
fn measure(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}
