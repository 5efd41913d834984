//! Listing and import configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use readlog_core::SortColumn;
use serde::{Deserialize, Serialize};

const ORDERS: [&str; 2] = ["asc", "desc"];

/// Default listing order and import settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
    /// Sort column for listings and searches
    pub default_sort: String,

    /// `asc` or `desc`
    pub default_order: String,

    /// Sort column inside a series
    pub series_sort: String,

    /// Field delimiter for imported tables
    pub import_delimiter: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            default_sort: SortColumn::Title.as_str().to_string(),
            default_order: "asc".to_string(),
            series_sort: SortColumn::FinishedAt.as_str().to_string(),
            import_delimiter: ",".to_string(),
        }
    }
}

fn sort_column(value: &str, field: &str) -> Result<(), ValidationError> {
    let allowed: Vec<&str> = SortColumn::ALL.iter().map(|c| c.as_str()).collect();
    Validator::one_of(&value, &allowed, field)
}

impl ConfigSection for LibraryConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            sort_column(&self.default_sort, "library.default_sort"),
            sort_column(&self.series_sort, "library.series_sort"),
            Validator::one_of(&self.default_order.as_str(), &ORDERS, "library.default_order"),
            Validator::delimiter(&self.import_delimiter, "library.import_delimiter"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = LibraryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_sort, "title");
        assert_eq!(config.series_sort, "finished_at");
    }

    #[test]
    fn test_invalid_values_are_all_reported() {
        let config = LibraryConfig {
            default_sort: "rating".to_string(),
            default_order: "DESC".to_string(),
            series_sort: "started_at".to_string(),
            import_delimiter: "||".to_string(),
        };
        let errors = config.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "library.default_sort",
                "library.default_order",
                "library.import_delimiter"
            ]
        );
    }
}
