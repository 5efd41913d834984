//! Validation helpers for configuration values

pub use crate::error::ValidationError;

/// A configuration section that checks its own values
pub trait ConfigSection: Default {
    /// Returns every problem found; `Ok` means the section is usable as is
    fn validate(&self) -> Result<(), Vec<ValidationError>>;
}

/// Common validators for config values
pub struct Validator;

impl Validator {
    /// Validates that a string is not blank
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Validates that a value is one of the allowed options
    pub fn one_of<T>(value: &T, allowed: &[T], field: &str) -> Result<(), ValidationError>
    where
        T: PartialEq + std::fmt::Display,
    {
        if !allowed.contains(value) {
            let allowed_str = allowed
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Err(ValidationError::with_value(
                field,
                format!("must be one of: {}", allowed_str),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Validates a field delimiter: one ASCII character, or `\t`
    pub fn delimiter(value: &str, field: &str) -> Result<(), ValidationError> {
        let single_ascii = value.len() == 1 && value.is_ascii();
        if single_ascii || value == "\\t" {
            Ok(())
        } else {
            Err(ValidationError::with_value(
                field,
                "must be a single ASCII character",
                value,
            ))
        }
    }

    /// Collects multiple validation results into a single result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
