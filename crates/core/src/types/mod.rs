//! Domain types for readlog
//!
//! - `book`: the Book record, its id and status derivation
//! - `ordering`: sort direction and sortable columns
//! - `attribute`: groupable text attributes (author, series)
//! - `stats`: status counts and yearly statistics
//! - `common`: shared traits and utilities

mod attribute;
mod book;
mod common;
mod ordering;
mod stats;

// Re-export all public types
pub use attribute::{AttributeGroup, BookAttribute};
pub use book::{Book, BookId, ReadStatus, DATE_ORDER_INVALID, TITLE_REQUIRED};
pub use common::{Timestamp, Validator};
pub use ordering::{normalize_order, sort_criteria, SortColumn, SortOrder};
pub use stats::{scale_base, StatusCounts, YearRecord, MIN_SCALE_BASE};
