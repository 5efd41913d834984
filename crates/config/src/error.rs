//! Config errors

use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A present but blank file is treated as damage, not as "use defaults"
    #[error("{} is empty", path.display())]
    Empty { path: PathBuf },

    #[error("{} is not valid TOML: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("refusing to save an invalid config: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no config file path: {0}")]
    NoPath(&'static str),
}

/// One rejected setting, addressed as `section.key`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}{}", got(.value))]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new(field, message)
        }
    }
}

fn got(value: &Option<String>) -> String {
    value
        .as_ref()
        .map(|v| format!(" (got '{}')", v))
        .unwrap_or_default()
}

pub(crate) fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("app.database_path", "must not be empty");
        assert_eq!(err.to_string(), "app.database_path must not be empty");

        let err = ValidationError::with_value("library.default_order", "must be asc or desc", "up");
        assert_eq!(
            err.to_string(),
            "library.default_order must be asc or desc (got 'up')"
        );
    }

    #[test]
    fn test_invalid_lists_every_field() {
        let err = ConfigError::Invalid(vec![
            ValidationError::new("app.database_path", "must not be empty"),
            ValidationError::with_value("library.import_delimiter", "is too long", "::"),
        ]);
        let message = err.to_string();
        assert!(message.contains("app.database_path must not be empty; "));
        assert!(message.ends_with("library.import_delimiter is too long (got '::')"));
    }
}
