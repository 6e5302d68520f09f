use serde_json::Value;

use crate::result::ValidationResult;
use crate::validator::Validator;

/// Requires a value to be present.
///
/// Invalid for `null`, `false`, and strings that are empty after trimming.
/// Every other value is valid, including `0`, `true`, and empty arrays.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::validators::required;
///
/// let validator = required();
/// assert!(validator.validate(&json!(0)).is_valid);
/// assert!(!validator.validate(&json!("   ")).is_valid);
/// assert!(!validator.validate(&json!(false)).is_valid);
/// ```
pub fn required() -> Validator {
    Validator::leaf(|value, _| {
        let present = match value {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        };
        ValidationResult::new(present).with_prop("required", true)
    })
}
