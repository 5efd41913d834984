//! Book database operations

use crate::DbPool;
use chrono::NaiveDate;
use readlog_core::{
    AppError, Book, BookId, ReadStatus, SortColumn, SortOrder, StatusCounts, Timestamp,
    YearRecord,
};
use sqlx::Row;

pub(crate) const BOOK_COLUMNS: &str = "id, title, author, series, isbn, comments, status, \
     started_at, finished_at, created_at, updated_at";

/// Inserts a book and returns the id the store assigned
///
/// `book.id` and the timestamps are ignored. Returns `None` if the store
/// reported that no row was written.
pub async fn insert_book(pool: &DbPool, book: &Book) -> Result<Option<BookId>, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO books (
            title, author, series, isbn, comments, status, started_at, finished_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.series)
    .bind(&book.isbn)
    .bind(&book.comments)
    .bind(book.status.as_str())
    .bind(book.started_at)
    .bind(book.finished_at)
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to create book", e))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(BookId::new(result.last_insert_rowid())))
}

/// Gets a book by ID
pub async fn get_book(pool: &DbPool, id: BookId) -> Result<Option<Book>, AppError> {
    let sql = format!("SELECT {} FROM books WHERE id = ?", BOOK_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id.get())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch book", e))?;

    row.map(row_to_book).transpose()
}

/// Overwrites the mutable fields of the book with the given id
///
/// id, created_at and updated_at are never written here; the store maintains
/// updated_at itself. Returns the number of rows matched.
pub async fn update_book(pool: &DbPool, id: BookId, book: &Book) -> Result<u64, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE books SET
            title = ?, author = ?, isbn = ?, series = ?, comments = ?,
            status = ?, started_at = ?, finished_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.isbn)
    .bind(&book.series)
    .bind(&book.comments)
    .bind(book.status.as_str())
    .bind(book.started_at)
    .bind(book.finished_at)
    .bind(id.get())
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to update book", e))?;

    Ok(result.rows_affected())
}

/// Deletes a book (hard delete), returning the number of rows removed
pub async fn delete_book(pool: &DbPool, id: BookId) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id.get())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to delete book", e))?;

    Ok(result.rows_affected())
}

/// Deletes every book, returning the number of rows removed
pub async fn clear_books(pool: &DbPool) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM books")
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to clear books", e))?;

    Ok(result.rows_affected())
}

/// Lists all books in insertion order
pub async fn list_books(pool: &DbPool) -> Result<Vec<Book>, AppError> {
    let sql = format!("SELECT {} FROM books", BOOK_COLUMNS);
    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to list books", e))?;

    rows.into_iter().map(row_to_book).collect()
}

/// Gets books with the given status
pub async fn get_books_by_status(
    pool: &DbPool,
    status: ReadStatus,
) -> Result<Vec<Book>, AppError> {
    let sql = format!("SELECT {} FROM books WHERE status = ?", BOOK_COLUMNS);
    let rows = sqlx::query(&sql)
        .bind(status.as_str())
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to get books by status", e))?;

    rows.into_iter().map(row_to_book).collect()
}

/// Gets books finished in the given calendar year
pub async fn get_books_by_year(pool: &DbPool, year: i32) -> Result<Vec<Book>, AppError> {
    let sql = format!(
        "SELECT {} FROM books WHERE CAST(strftime('%Y', finished_at) AS INTEGER) = ?",
        BOOK_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(year)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to get books by year", e))?;

    rows.into_iter().map(row_to_book).collect()
}

/// Gets books whose author is exactly `author`
pub async fn get_books_by_author(pool: &DbPool, author: &str) -> Result<Vec<Book>, AppError> {
    let sql = format!("SELECT {} FROM books WHERE author = ?", BOOK_COLUMNS);
    let rows = sqlx::query(&sql)
        .bind(author)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to get books by author", e))?;

    rows.into_iter().map(row_to_book).collect()
}

/// Gets books whose series is exactly `series`, sorted case-insensitively
pub async fn get_books_by_series(
    pool: &DbPool,
    series: &str,
    column: SortColumn,
    order: SortOrder,
) -> Result<Vec<Book>, AppError> {
    let sql = format!(
        "SELECT {} FROM books WHERE series = ? ORDER BY {} COLLATE NOCASE {}, id",
        BOOK_COLUMNS,
        column.as_str(),
        order.as_str()
    );
    let rows = sqlx::query(&sql)
        .bind(series)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to get books by series", e))?;

    rows.into_iter().map(row_to_book).collect()
}

/// Counts all books
pub async fn count_books(pool: &DbPool) -> Result<i64, AppError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database("Failed to count books", e))
}

/// Counts books with the given status
pub async fn count_with_status(pool: &DbPool, status: ReadStatus) -> Result<i64, AppError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE status = ?")
        .bind(status.as_str())
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database("Failed to count books by status", e))
}

/// Counts books per status
pub async fn count_by_status(pool: &DbPool) -> Result<StatusCounts, AppError> {
    Ok(StatusCounts {
        to_read: count_with_status(pool, ReadStatus::ToRead).await?,
        reading: count_with_status(pool, ReadStatus::Reading).await?,
        finished: count_with_status(pool, ReadStatus::Read).await?,
    })
}

/// Counts finished books per year, most recent year first, with ratios filled in
pub async fn count_finished_by_year(pool: &DbPool) -> Result<Vec<YearRecord>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(strftime('%Y', finished_at) AS INTEGER) AS year, COUNT(*) AS count
        FROM books
        WHERE finished_at IS NOT NULL
        GROUP BY year
        HAVING year IS NOT NULL
        ORDER BY year DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to count finished books by year", e))?;

    let mut records = rows
        .into_iter()
        .map(|row| {
            let year: i64 = row
                .try_get("year")
                .map_err(|e| AppError::database("Missing year", e))?;
            let count: i64 = row
                .try_get("count")
                .map_err(|e| AppError::database("Missing count", e))?;
            Ok(YearRecord::new(year as i32, count))
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    YearRecord::normalize(&mut records);
    Ok(records)
}

/// Converts a database row to a Book
pub(crate) fn row_to_book(row: sqlx::sqlite::SqliteRow) -> Result<Book, AppError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing book ID", e))?;

    let status: String = row
        .try_get("status")
        .map_err(|e| AppError::database("Missing status", e))?;

    let started_at: Option<NaiveDate> = row
        .try_get("started_at")
        .map_err(|e| AppError::database("Invalid started_at", e))?;
    let finished_at: Option<NaiveDate> = row
        .try_get("finished_at")
        .map_err(|e| AppError::database("Invalid finished_at", e))?;

    let created_at: i64 = row
        .try_get("created_at")
        .map_err(|e| AppError::database("Missing created_at", e))?;
    let updated_at: i64 = row
        .try_get("updated_at")
        .map_err(|e| AppError::database("Missing updated_at", e))?;

    Ok(Book {
        id: BookId::new(id),
        title: row
            .try_get("title")
            .map_err(|e| AppError::database("Missing title", e))?,
        author: row
            .try_get("author")
            .map_err(|e| AppError::database("Missing author", e))?,
        series: row
            .try_get("series")
            .map_err(|e| AppError::database("Missing series", e))?,
        isbn: row
            .try_get("isbn")
            .map_err(|e| AppError::database("Missing isbn", e))?,
        comments: row
            .try_get("comments")
            .map_err(|e| AppError::database("Missing comments", e))?,
        status: status.parse()?,
        started_at,
        finished_at,
        created_at: Timestamp::from_millis(created_at),
        updated_at: Timestamp::from_millis(updated_at),
    })
}
