//! Core domain types for readlog
//!
//! Everything in this crate is pure: no I/O, no database access. The database
//! and library crates build on these types.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use types::{
    normalize_order, sort_criteria, AttributeGroup, Book, BookAttribute, BookId, ReadStatus,
    SortColumn, SortOrder, StatusCounts, Timestamp, Validator, YearRecord,
};
