use std::ops::RangeInclusive;

use serde_json::Value;

use super::{measure, optional, props};
use crate::validator::Validator;

/// Requires a string of at least `min` characters or an array of at least
/// `min` elements.
pub fn min_length(min: usize) -> Validator {
    optional(props([("min_length", Value::from(min))]), move |value, _| {
        measure(value).map_or(false, |len| len >= min)
    })
}

/// Requires a string of at most `max` characters or an array of at most
/// `max` elements.
pub fn max_length(max: usize) -> Validator {
    optional(props([("max_length", Value::from(max))]), move |value, _| {
        measure(value).map_or(false, |len| len <= max)
    })
}

/// Requires a string or array length within `range`, bounds included.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::validators::length;
///
/// let code = length(4..=6);
/// assert!(code.validate(&json!("1234")).is_valid);
/// assert!(code.validate(&json!([1, 2, 3, 4, 5])).is_valid);
/// assert!(!code.validate(&json!("123")).is_valid);
/// ```
pub fn length(range: RangeInclusive<usize>) -> Validator {
    let (min, max) = range.into_inner();
    optional(
        props([
            ("min_length", Value::from(min)),
            ("max_length", Value::from(max)),
        ]),
        move |value, _| measure(value).map_or(false, |len| len >= min && len <= max),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_counts_characters_not_bytes() {
        assert!(max_length(3).validate(&json!("héé")).is_valid);
        assert!(!min_length(4).validate(&json!("héé")).is_valid);
    }

    #[test]
    fn test_arrays() {
        assert!(min_length(2).validate(&json!([1, 2])).is_valid);
        assert!(!max_length(1).validate(&json!([1, 2])).is_valid);
    }

    #[test]
    fn test_unmeasurable_values_fail() {
        assert!(!min_length(0).validate(&json!(5)).is_valid);
        assert!(!length(0..=10).validate(&json!({"a": 1})).is_valid);
    }

    #[test]
    fn test_props() {
        let result = length(2..=4).validate(&json!("x"));
        assert!(!result.is_valid);
        assert_eq!(result.prop("min_length"), Some(&json!(2)));
        assert_eq!(result.prop("max_length"), Some(&json!(4)));
    }
}
