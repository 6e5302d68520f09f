use regex::Regex;
use serde_json::Value;

use super::{optional, props};
use crate::validator::Validator;

/// Requires a string matching the regular expression `pattern`.
///
/// Non-string values are invalid.
///
/// # Errors
///
/// Returns an error if `pattern` is not a valid regular expression.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::validators::pattern;
///
/// let digits = pattern(r"^\d+$").unwrap();
/// assert!(digits.validate(&json!("12345")).is_valid);
/// assert!(!digits.validate(&json!("12a45")).is_valid);
///
/// assert!(pattern("(").is_err());
/// ```
pub fn pattern(pattern: &str) -> Result<Validator, regex::Error> {
    let regex = Regex::new(pattern)?;
    Ok(optional(
        props([("pattern", Value::String(pattern.to_string()))]),
        move |value, _| value.as_str().map_or(false, |s| regex.is_match(s)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pattern_matches_strings_only() {
        let validator = pattern("^[a-z]+$").unwrap();
        assert!(validator.validate(&json!("abc")).is_valid);
        assert!(!validator.validate(&json!("ABC")).is_valid);
        assert!(!validator.validate(&json!(123)).is_valid);
        assert!(validator.validate(&json!(null)).is_valid);
    }

    #[test]
    fn test_invalid_regex_pattern() {
        assert!(pattern("[unclosed").is_err());
    }

    #[test]
    fn test_pattern_prop() {
        let result = pattern("^x$").unwrap().validate(&json!("y"));
        assert_eq!(result.prop("pattern"), Some(&json!("^x$")));
    }
}
