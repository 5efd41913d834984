//! readlog library engine
//!
//! Book lifecycle rules (status derivation and validation), queries,
//! grouping and renaming of authors and series, yearly statistics, and
//! bulk import/export on top of `readlog-database`.

pub mod error;
pub mod export;
pub mod import;
pub mod manager;

pub use error::{LibraryError, LibraryResult};
pub use export::{export_file_name, format_export_date, write_csv, write_json, EXPORT_HEADER};
pub use import::{
    column_options, parse_delimiter, parse_import_date, BookImporter, ColumnMapping,
    ImportField, ImportReport, ImportTable, RowOutcome, UNMAPPED_COLUMN,
};
pub use manager::LibraryManager;

/// Library configuration
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Database file path
    pub database_path: String,
    /// Log every SQL statement at debug level
    pub log_statements: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            database_path: "readlog.db".to_string(),
            log_statements: false,
        }
    }
}

impl LibraryConfig {
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }
}
