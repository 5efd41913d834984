//! Book export as CSV or JSON

use crate::error::{LibraryError, Result};
use chrono::{NaiveDate, NaiveTime, SecondsFormat};
use readlog_core::Book;
use std::io::Write;

/// Header row of exported CSV files
pub const EXPORT_HEADER: [&str; 7] = [
    "Title", "Author", "Series", "ISBN", "Comments", "Started", "Finished",
];

/// Suggested file name for an export made on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("readlog-{}.csv", date.format("%Y-%m-%d"))
}

/// Formats a date as an RFC 3339 timestamp at midnight UTC; empty when absent
pub fn format_export_date(date: Option<NaiveDate>) -> String {
    date.map(|d| {
        d.and_time(NaiveTime::MIN)
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    })
    .unwrap_or_default()
}

/// Writes books as CSV with a header row, returning the number of data rows
pub fn write_csv<W: Write>(books: &[Book], writer: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(EXPORT_HEADER)?;

    for book in books {
        writer.write_record([
            book.title.as_str(),
            book.author.as_str(),
            book.series.as_str(),
            book.isbn.as_str(),
            book.comments.as_str(),
            format_export_date(book.started_at).as_str(),
            format_export_date(book.finished_at).as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(books.len())
}

/// Writes full book records as a pretty-printed JSON array
pub fn write_json<W: Write>(books: &[Book], mut writer: W) -> Result<usize> {
    serde_json::to_writer_pretty(&mut writer, books)
        .map_err(|e| LibraryError::ExportFailed(e.to_string()))?;
    writer.write_all(b"\n")?;
    Ok(books.len())
}
