use std::ops::RangeInclusive;

use serde_json::Value;

use super::{optional, props};
use crate::validator::Validator;

/// Requires a number of at least `min`.
///
/// Non-numeric values are invalid.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::validators::min;
///
/// let adult = min(18.0);
/// assert!(adult.validate(&json!(18)).is_valid);
/// assert!(!adult.validate(&json!(17.5)).is_valid);
/// assert!(!adult.validate(&json!("eighteen")).is_valid);
/// ```
pub fn min(min: f64) -> Validator {
    optional(props([("min", Value::from(min))]), move |value, _| {
        value.as_f64().map_or(false, |n| n >= min)
    })
}

/// Requires a number of at most `max`.
pub fn max(max: f64) -> Validator {
    optional(props([("max", Value::from(max))]), move |value, _| {
        value.as_f64().map_or(false, |n| n <= max)
    })
}

/// Requires a number within `range`, bounds included.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::validators::range;
///
/// let percentage = range(0.0..=100.0);
/// assert!(percentage.validate(&json!(100)).is_valid);
/// assert!(!percentage.validate(&json!(-1)).is_valid);
/// ```
pub fn range(range: RangeInclusive<f64>) -> Validator {
    let (min, max) = range.into_inner();
    optional(
        props([("min", Value::from(min)), ("max", Value::from(max))]),
        move |value, _| value.as_f64().map_or(false, |n| n >= min && n <= max),
    )
}
