//! Field-level error collection shared by every HTML form.

use std::collections::BTreeMap;

use validator::ValidationErrors;

/// Key under which errors not tied to a single field are stored.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Errors produced while cleaning a submitted form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an error set holding a single message for `field`.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    /// Moves every message from `other` into `self`.
    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Messages for `field`, empty when the field is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD_ERRORS)
    }

    /// Returns `Ok(value)` when no errors were collected.
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_empty_errors() {
        let errors = FormErrors::new();
        assert!(errors.is_empty());
        assert!(errors.get("email").is_empty());
        assert_eq!(errors.into_result(5), Ok(5));
    }

    #[test]
    fn test_add_and_get() {
        let mut errors = FormErrors::new();
        errors.add("email", "Enter a valid email address.");
        errors.add("email", "Already taken.");
        errors.add_non_field("Something went wrong.");

        assert!(errors.has("email"));
        assert_eq!(errors.get("email").len(), 2);
        assert_eq!(errors.non_field(), ["Something went wrong.".to_string()]);
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_merge() {
        let mut a = FormErrors::single("title", "Required.");
        let b = FormErrors::single("title", "Too long.");
        a.merge(b);
        assert_eq!(a.get("title").len(), 2);
    }

    #[test]
    fn test_from_validation_errors() {
        let mut validation = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("Too long".into());
        validation.add("city", err);
        validation.add("address", ValidationError::new("required"));

        let errors = FormErrors::from(validation);
        assert_eq!(errors.get("city"), ["Too long".to_string()]);
        assert_eq!(errors.get("address"), ["Invalid value (required)".to_string()]);
    }
}
