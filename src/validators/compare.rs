use serde_json::Value;

use super::{optional, props};
use crate::validator::Validator;

/// Requires a value equal to `expected`.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::validators::compare;
///
/// let accepted = compare(true);
/// assert!(accepted.validate(&json!(true)).is_valid);
/// assert!(!accepted.validate(&json!(false)).is_valid);
/// ```
pub fn compare(expected: impl Into<Value>) -> Validator {
    let expected = expected.into();
    optional(props([("compare", expected.clone())]), move |value, _| {
        *value == expected
    })
}

/// Requires a value equal to the sibling form field `field`.
///
/// The sibling is read from `context.form.values`, which a
/// [`form`](crate::form) sets for its field validators. Outside a form there
/// is nothing to compare with and the value is invalid.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use verdict::{form, validators::{compare_field, required}, Validator};
///
/// let signup = form(Validator::keyed([
///     ("password", required()),
///     ("confirm", compare_field("password")),
/// ]))
/// .unwrap();
///
/// let result = signup.validate_fields(&json!({"password": "pw", "confirm": "wp"}), ["confirm"], None);
/// assert!(!result.form().unwrap().field("confirm").unwrap().is_valid);
/// ```
pub fn compare_field(field: impl Into<String>) -> Validator {
    let field = field.into();
    optional(
        props([("compare_field", Value::String(field.clone()))]),
        move |value, context| {
            context
                .form()
                .and_then(|form| form.values.as_ref())
                .and_then(|values| values.get(&field))
                .map_or(false, |other| other == value)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FormContext, ValidationContext};
    use serde_json::json;

    #[test]
    fn test_compare() {
        let validator = compare("yes");
        assert!(validator.validate(&json!("yes")).is_valid);
        assert!(!validator.validate(&json!("no")).is_valid);
        assert!(validator.validate(&json!("")).is_valid);
        assert_eq!(validator.validate(&json!("no")).prop("compare"), Some(&json!("yes")));
    }

    #[test]
    fn test_compare_field_reads_form_values() {
        let validator = compare_field("password");
        let mut form = FormContext::new();
        form.values = Some(json!({"password": "secret"}));
        let context = ValidationContext::new().with_form(form);

        assert!(validator.validate_with(&json!("secret"), &context).is_valid);
        assert!(!validator.validate_with(&json!("other"), &context).is_valid);
        assert!(!validator.validate(&json!("secret")).is_valid);
    }
}
