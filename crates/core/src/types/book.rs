//! Book domain model and its status lifecycle

use crate::error::AppError;
use crate::types::{Timestamp, Validator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Validation message for a blank title
pub const TITLE_REQUIRED: &str = "Title is required";

/// Validation message for a start date after the finish date
pub const DATE_ORDER_INVALID: &str = "Date format is invalid";

/// Store-assigned identifier for a book
///
/// Zero means the book has not been persisted yet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    /// The id of a book that has not been persisted
    pub const UNASSIGNED: Self = Self(0);

    /// Wraps a raw store id
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    pub fn get(&self) -> i64 {
        self.0
    }

    /// Returns true once the store has assigned this id
    pub fn is_assigned(&self) -> bool {
        self.0 > 0
    }
}

impl From<i64> for BookId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for BookId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(Self)
            .ok_or_else(|| AppError::invalid_argument("id", format!("'{}' is not a book id", s)))
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reading status of a book, always derived from its dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadStatus {
    #[default]
    #[serde(rename = "to-read")]
    ToRead,
    #[serde(rename = "reading")]
    Reading,
    #[serde(rename = "read")]
    Read,
}

impl ReadStatus {
    pub const ALL: [ReadStatus; 3] = [ReadStatus::ToRead, ReadStatus::Reading, ReadStatus::Read];

    /// Returns the stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToRead => "to-read",
            Self::Reading => "reading",
            Self::Read => "read",
        }
    }

    /// Derives the status from a (started, finished) date pair
    pub fn derive(started_at: Option<NaiveDate>, finished_at: Option<NaiveDate>) -> Self {
        match (started_at, finished_at) {
            (None, None) => Self::ToRead,
            (Some(_), None) => Self::Reading,
            (_, Some(_)) => Self::Read,
        }
    }
}

impl FromStr for ReadStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "to-read" => Ok(Self::ToRead),
            "reading" => Ok(Self::Reading),
            "read" => Ok(Self::Read),
            other => Err(AppError::invalid_argument(
                "status",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

impl fmt::Display for ReadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reading-log record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub series: String,
    pub isbn: String,
    pub comments: String,
    pub status: ReadStatus,
    pub started_at: Option<NaiveDate>,
    pub finished_at: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Book {
    /// Creates an unsaved book with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_series(mut self, series: impl Into<String>) -> Self {
        self.series = series.into();
        self
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = isbn.into();
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    pub fn started(mut self, date: NaiveDate) -> Self {
        self.started_at = Some(date);
        self
    }

    pub fn finished(mut self, date: NaiveDate) -> Self {
        self.finished_at = Some(date);
        self
    }

    /// Recomputes `status` from the dates, overwriting whatever was set
    ///
    /// A book finished without a start date is treated as started the day it
    /// was finished.
    pub fn fix_status(&mut self) {
        if self.started_at.is_none() && self.finished_at.is_some() {
            self.started_at = self.finished_at;
        }
        self.status = ReadStatus::derive(self.started_at, self.finished_at);
    }

    /// Year the book was finished, if it was
    pub fn finished_year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.finished_at.map(|d| d.year())
    }

    /// Returns true if the book has been saved to the store
    pub fn is_persisted(&self) -> bool {
        self.id.is_assigned()
    }
}

impl Validator for Book {
    fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(TITLE_REQUIRED.to_string());
        }

        if let (Some(started), Some(finished)) = (self.started_at, self.finished_at) {
            if started > finished {
                errors.push(DATE_ORDER_INVALID.to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_book_id_unassigned() {
        assert!(!BookId::UNASSIGNED.is_assigned());
        assert!(BookId::new(1).is_assigned());
        assert_eq!(BookId::default(), BookId::UNASSIGNED);
    }

    #[test]
    fn test_book_id_parse() {
        assert_eq!("42".parse::<BookId>().unwrap(), BookId::new(42));
        assert!("0".parse::<BookId>().is_err());
        assert!("-3".parse::<BookId>().is_err());
        assert!("abc".parse::<BookId>().is_err());
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in ReadStatus::ALL {
            assert_eq!(status.as_str().parse::<ReadStatus>().unwrap(), status);
        }
        assert!("finished".parse::<ReadStatus>().is_err());
        assert!("".parse::<ReadStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_stored_value() {
        let json = serde_json::to_string(&ReadStatus::ToRead).unwrap();
        assert_eq!(json, "\"to-read\"");
    }

    #[test]
    fn test_fix_status_no_dates() {
        let mut book = Book::new("A");
        book.status = ReadStatus::Read;
        book.fix_status();
        assert_eq!(book.status, ReadStatus::ToRead);
        assert!(book.started_at.is_none());
    }

    #[test]
    fn test_fix_status_started_only() {
        let mut book = Book::new("A").started(date(2024, 1, 1));
        book.fix_status();
        assert_eq!(book.status, ReadStatus::Reading);
        assert!(book.finished_at.is_none());
    }

    #[test]
    fn test_fix_status_finished_only_backfills_start() {
        let mut book = Book::new("A").finished(date(2024, 2, 3));
        book.fix_status();
        assert_eq!(book.status, ReadStatus::Read);
        assert_eq!(book.started_at, Some(date(2024, 2, 3)));
        assert_eq!(book.finished_at, Some(date(2024, 2, 3)));
    }

    #[test]
    fn test_fix_status_both_dates() {
        let mut book = Book::new("A")
            .started(date(2024, 1, 1))
            .finished(date(2024, 2, 1));
        book.fix_status();
        assert_eq!(book.status, ReadStatus::Read);
        assert_eq!(book.started_at, Some(date(2024, 1, 1)));
    }

    #[test]
    fn test_validate_empty_title() {
        let book = Book::new("   ");
        assert_eq!(book.errors(), vec![TITLE_REQUIRED]);
    }

    #[test]
    fn test_validate_start_after_finish() {
        let book = Book::new("A")
            .started(date(2024, 3, 2))
            .finished(date(2024, 3, 1));
        assert_eq!(book.errors(), vec![DATE_ORDER_INVALID]);
    }

    #[test]
    fn test_validate_both_defects_in_order() {
        let book = Book::new("")
            .started(date(2024, 3, 2))
            .finished(date(2024, 3, 1));
        assert_eq!(book.errors(), vec![TITLE_REQUIRED, DATE_ORDER_INVALID]);
    }

    #[test]
    fn test_validate_same_day_is_valid() {
        let book = Book::new("A")
            .started(date(2024, 3, 1))
            .finished(date(2024, 3, 1));
        assert!(book.is_valid());
        assert!(book.errors().is_empty());
    }

    #[test]
    fn test_finished_year() {
        assert_eq!(Book::new("A").finished_year(), None);
        assert_eq!(
            Book::new("A").finished(date(2021, 12, 31)).finished_year(),
            Some(2021)
        );
    }
}
