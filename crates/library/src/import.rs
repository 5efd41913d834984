//! Bulk import of books from delimited text tables

use crate::error::{LibraryError, Result};
use crate::manager::LibraryManager;
use chrono::{DateTime, NaiveDate};
use log::{info, warn};
use readlog_core::{Book, BookId, Validator};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Mapping choice meaning "this field has no source column"
pub const UNMAPPED_COLUMN: &str = "-";

/// Book fields that can be filled from a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportField {
    Title,
    Author,
    Series,
    Isbn,
    Comments,
    Started,
    Finished,
}

impl ImportField {
    pub const ALL: [ImportField; 7] = [
        ImportField::Title,
        ImportField::Author,
        ImportField::Series,
        ImportField::Isbn,
        ImportField::Comments,
        ImportField::Started,
        ImportField::Finished,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Author => "Author",
            Self::Series => "Series",
            Self::Isbn => "ISBN",
            Self::Comments => "Comments",
            Self::Started => "Started",
            Self::Finished => "Finished",
        }
    }
}

impl fmt::Display for ImportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which header column feeds each book field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: HashMap<ImportField, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a field to a header name; [`UNMAPPED_COLUMN`] clears the mapping
    pub fn map(mut self, field: ImportField, column: impl Into<String>) -> Self {
        self.set(field, column);
        self
    }

    pub fn set(&mut self, field: ImportField, column: impl Into<String>) {
        let column = column.into();
        if column == UNMAPPED_COLUMN {
            self.columns.remove(&field);
        } else {
            self.columns.insert(field, column);
        }
    }

    /// Header name mapped to `field`, if any
    pub fn column(&self, field: ImportField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }
}

/// Options offered when choosing a source column for a field
pub fn column_options(headers: &[String]) -> Vec<String> {
    std::iter::once(UNMAPPED_COLUMN.to_string())
        .chain(headers.iter().cloned())
        .collect()
}

/// Converts a delimiter setting such as `","` or `"\t"` to a byte
pub fn parse_delimiter(value: &str) -> Result<u8> {
    match value {
        "\\t" | "\t" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(LibraryError::ImportFailed(format!(
                "delimiter must be a single ASCII character, got '{}'",
                value
            ))),
        },
    }
}

/// Parses a full RFC 3339 timestamp or a plain `YYYY-MM-DD` date
///
/// Anything else yields `None`.
pub fn parse_import_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

/// A header row plus data rows read from a delimited file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn decode_record(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

impl ImportTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Reads a table; rows may be shorter or longer than the header
    ///
    /// Bytes that are not UTF-8 become U+FFFD instead of failing the whole
    /// file.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = decode_record(reader.byte_headers()?);
        let mut rows = Vec::new();
        let mut record = csv::ByteRecord::new();
        while reader.read_byte_record(&mut record)? {
            rows.push(decode_record(&record));
        }

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: impl AsRef<Path>, delimiter: u8) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file, delimiter)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn cell<'r>(&self, row: &'r [String], mapping: &ColumnMapping, field: ImportField) -> &'r str {
        mapping
            .column(field)
            .and_then(|name| self.column_index(name))
            .and_then(|index| row.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Builds the book described by one row
    ///
    /// Unmapped fields and cells past the end of the row read as empty;
    /// dates that do not parse are left unset.
    pub fn book_for_row(&self, row: &[String], mapping: &ColumnMapping) -> Book {
        let cell = |field| self.cell(row, mapping, field);

        Book {
            title: cell(ImportField::Title).to_string(),
            author: cell(ImportField::Author).to_string(),
            series: cell(ImportField::Series).to_string(),
            isbn: cell(ImportField::Isbn).to_string(),
            comments: cell(ImportField::Comments).to_string(),
            started_at: parse_import_date(cell(ImportField::Started)),
            finished_at: parse_import_date(cell(ImportField::Finished)),
            ..Default::default()
        }
    }
}

/// What happened to one imported row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Imported(BookId),
    /// Failed validation; nothing was written
    Rejected(Vec<String>),
    /// Passed validation but the store refused the write
    StoreFailed(String),
}

/// Summary of an import run
///
/// `succeed` and `failed` count validation results; a row that validated
/// but could not be stored still counts as `succeed` and shows up as
/// [`RowOutcome::StoreFailed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub total: usize,
    pub succeed: usize,
    pub failed: usize,
    pub outcomes: Vec<RowOutcome>,
}

impl ImportReport {
    /// Number of rows actually written
    pub fn imported(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Imported(_)))
            .count()
    }
}

/// Runs table rows through the regular create path
pub struct BookImporter<'a> {
    manager: &'a LibraryManager,
}

impl<'a> BookImporter<'a> {
    pub fn new(manager: &'a LibraryManager) -> Self {
        Self { manager }
    }

    /// Imports every row; a failing row never stops the ones after it
    pub async fn import(&self, table: &ImportTable, mapping: &ColumnMapping) -> ImportReport {
        let mut report = ImportReport::default();

        for (index, row) in table.rows().iter().enumerate() {
            report.total += 1;
            let mut book = table.book_for_row(row, mapping);
            book.fix_status();

            if let Err(errors) = book.validate() {
                report.failed += 1;
                report.outcomes.push(RowOutcome::Rejected(errors));
                continue;
            }
            report.succeed += 1;

            let outcome = match self.manager.create(book).await {
                Ok(created) => RowOutcome::Imported(created.id),
                Err(e) => {
                    warn!("Import row {} could not be stored: {}", index + 1, e);
                    RowOutcome::StoreFailed(e.to_string())
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            "Import finished: {} rows, {} succeeded, {} failed",
            report.total, report.succeed, report.failed
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_import_date() {
        assert_eq!(parse_import_date("2024-03-01"), Some(date(2024, 3, 1)));
        assert_eq!(
            parse_import_date("2024-03-01T10:20:30Z"),
            Some(date(2024, 3, 1))
        );
        assert_eq!(
            parse_import_date(" 2023-12-31T23:00:00+02:00 "),
            Some(date(2023, 12, 31))
        );
        assert_eq!(parse_import_date("03/01/2024"), None);
        assert_eq!(parse_import_date(""), None);
        assert_eq!(parse_import_date("2024-02-30"), None);
    }

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter(";;").is_err());
    }

    #[test]
    fn test_column_options() {
        let headers = vec!["Name".to_string(), "Writer".to_string()];
        assert_eq!(column_options(&headers), vec!["-", "Name", "Writer"]);
        assert_eq!(column_options(&[]), vec!["-"]);
    }

    #[test]
    fn test_mapping_sentinel_clears() {
        let mapping = ColumnMapping::new()
            .map(ImportField::Title, "Name")
            .map(ImportField::Title, UNMAPPED_COLUMN);
        assert_eq!(mapping.column(ImportField::Title), None);
    }

    #[test]
    fn test_from_reader_flexible_rows() {
        let data = "Name;Writer;Done\nDune;Herbert;2024-01-05\nShort\n";
        let table = ImportTable::from_reader(data.as_bytes(), b';').unwrap();

        assert_eq!(table.headers(), &["Name", "Writer", "Done"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1], vec!["Short"]);
    }

    #[test]
    fn test_book_for_row() {
        let table = ImportTable::new(
            vec!["Name".into(), "Writer".into(), "Done".into()],
            vec![],
        );
        let mapping = ColumnMapping::new()
            .map(ImportField::Title, "Name")
            .map(ImportField::Author, "Writer")
            .map(ImportField::Finished, "Done")
            .map(ImportField::Series, "Missing");

        let row = vec!["Dune".to_string(), "Herbert".to_string(), "2024-01-05".to_string()];
        let book = table.book_for_row(&row, &mapping);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
        assert_eq!(book.series, "");
        assert_eq!(book.finished_at, Some(date(2024, 1, 5)));

        let short = vec!["Only".to_string()];
        let book = table.book_for_row(&short, &mapping);
        assert_eq!(book.title, "Only");
        assert_eq!(book.author, "");
        assert_eq!(book.finished_at, None);
    }

    #[test]
    fn test_report_imported_count() {
        let report = ImportReport {
            total: 3,
            succeed: 2,
            failed: 1,
            outcomes: vec![
                RowOutcome::Imported(BookId::new(1)),
                RowOutcome::Rejected(vec!["Title is required".into()]),
                RowOutcome::StoreFailed("DB error".into()),
            ],
        };
        assert_eq!(report.imported(), 1);
    }
}
