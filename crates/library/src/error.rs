use readlog_core::{AppError, BookAttribute, BookId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// First validation message of a rejected book
    #[error("{0}")]
    Validation(String),

    #[error("Invalid {0} name")]
    InvalidName(BookAttribute),

    #[error("ID not found")]
    NotFound(BookId),

    /// The store accepted a write but reported no affected rows
    #[error("DB error")]
    NoRowsWritten,

    #[error("Database error: {0}")]
    Database(#[from] AppError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Import failed: {0}")]
    ImportFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),
}

impl LibraryError {
    /// True for defects in caller input, as opposed to store or I/O faults
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidName(_) | Self::NotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
pub type LibraryResult<T> = std::result::Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            LibraryError::Validation("Title is required".into()).to_string(),
            "Title is required"
        );
        assert_eq!(
            LibraryError::InvalidName(BookAttribute::Author).to_string(),
            "Invalid author name"
        );
        assert_eq!(
            LibraryError::InvalidName(BookAttribute::Series).to_string(),
            "Invalid series name"
        );
        assert_eq!(LibraryError::NotFound(BookId::new(3)).to_string(), "ID not found");
        assert_eq!(LibraryError::NoRowsWritten.to_string(), "DB error");
    }

    #[test]
    fn test_is_user_error() {
        assert!(LibraryError::Validation("x".into()).is_user_error());
        assert!(LibraryError::NotFound(BookId::new(1)).is_user_error());
        assert!(!LibraryError::NoRowsWritten.is_user_error());
        assert!(!LibraryError::ImportFailed("x".into()).is_user_error());
    }
}
