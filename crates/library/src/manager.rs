use crate::error::{LibraryError, Result};
use crate::export;
use crate::import::{BookImporter, ColumnMapping, ImportReport, ImportTable};
pub use crate::LibraryConfig;
use chrono::NaiveDate;
use log::{debug, info};
use readlog_core::{
    AttributeGroup, Book, BookAttribute, BookId, ReadStatus, SortColumn, SortOrder,
    StatusCounts, Validator, YearRecord,
};
use readlog_database::{
    connection::{connect, DatabaseConfig},
    migrations::run_migrations,
    queries::{attributes, books},
    search::{search_books, KeywordQuery},
    DbPool,
};
use std::io::Write;

/// Book lifecycle, query and aggregation engine
///
/// All writes to the `books` table go through this type, so every stored
/// row has a derived status and passed validation.
pub struct LibraryManager {
    pool: DbPool,
}

impl LibraryManager {
    /// Opens (or creates) the database and applies pending migrations
    pub async fn new(config: LibraryConfig) -> Result<Self> {
        info!("Opening library database: {}", config.database_path);

        let db_config =
            DatabaseConfig::new(&config.database_path).with_statement_logging(config.log_statements);
        let pool = connect(db_config).await?;
        run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Derives status and validates, returning the first message on failure
    fn prepare(book: &mut Book) -> Result<()> {
        book.fix_status();
        book.validate().map_err(|errors| {
            let first = errors.into_iter().next().unwrap_or_default();
            debug!("Rejected book '{}': {}", book.title, first);
            LibraryError::Validation(first)
        })
    }

    /// Stores a new book and returns it as persisted
    ///
    /// Any id on the input is ignored.
    pub async fn create(&self, mut book: Book) -> Result<Book> {
        book.id = BookId::UNASSIGNED;
        Self::prepare(&mut book)?;

        let id = books::insert_book(&self.pool, &book)
            .await?
            .ok_or(LibraryError::NoRowsWritten)?;
        info!("Created book {} '{}'", id, book.title);

        books::get_book(&self.pool, id)
            .await?
            .ok_or(LibraryError::NotFound(id))
    }

    /// Overwrites the editable fields of the book with the given id
    pub async fn update(&self, id: BookId, mut book: Book) -> Result<Book> {
        book.id = id;
        Self::prepare(&mut book)?;

        let matched = books::update_book(&self.pool, id, &book).await?;
        if matched == 0 {
            return Err(LibraryError::NotFound(id));
        }
        info!("Updated book {} '{}'", id, book.title);

        books::get_book(&self.pool, id)
            .await?
            .ok_or(LibraryError::NotFound(id))
    }

    /// Moves a book to `status`, dating the change `today`
    ///
    /// `to-read` clears both dates and `reading` restarts the book today.
    /// `read` finishes it today; a book that was never started gets today as
    /// its start date too.
    pub async fn change_status(
        &self,
        id: BookId,
        status: ReadStatus,
        today: NaiveDate,
    ) -> Result<Book> {
        let mut book = self.get_by_id(id).await?.ok_or(LibraryError::NotFound(id))?;

        match status {
            ReadStatus::ToRead => {
                book.started_at = None;
                book.finished_at = None;
            }
            ReadStatus::Reading => {
                book.started_at = Some(today);
                book.finished_at = None;
            }
            ReadStatus::Read => book.finished_at = Some(today),
        }

        debug!("Moving book {} to {}", id, status);
        self.update(id, book).await
    }

    /// Hard-deletes a book
    pub async fn delete(&self, id: BookId) -> Result<()> {
        let removed = books::delete_book(&self.pool, id).await?;
        if removed == 0 {
            return Err(LibraryError::NotFound(id));
        }
        info!("Deleted book {}", id);
        Ok(())
    }

    /// Deletes every book, returning how many were removed
    pub async fn reset(&self) -> Result<u64> {
        let removed = books::clear_books(&self.pool).await?;
        info!("Removed all {} books", removed);
        Ok(removed)
    }

    /// All books in insertion order
    pub async fn get_all(&self) -> Result<Vec<Book>> {
        Ok(books::list_books(&self.pool).await?)
    }

    pub async fn get_by_id(&self, id: BookId) -> Result<Option<Book>> {
        Ok(books::get_book(&self.pool, id).await?)
    }

    pub async fn get_by_status(&self, status: ReadStatus) -> Result<Vec<Book>> {
        Ok(books::get_books_by_status(&self.pool, status).await?)
    }

    /// Books finished in the given calendar year
    pub async fn get_by_year(&self, year: i32) -> Result<Vec<Book>> {
        Ok(books::get_books_by_year(&self.pool, year).await?)
    }

    pub async fn get_by_author(&self, name: &str) -> Result<Vec<Book>> {
        Ok(books::get_books_by_author(&self.pool, name).await?)
    }

    /// Books of one series, sorted by a whitelisted column
    pub async fn get_by_series(&self, name: &str, sort: &str, order: &str) -> Result<Vec<Book>> {
        let column = SortColumn::from_requested(sort);
        let order = SortOrder::normalize(order);
        Ok(books::get_books_by_series(&self.pool, name, column, order).await?)
    }

    /// Books whose title or author contains `keyword`
    ///
    /// An empty `status` means any status; a status that is not one of the
    /// three known values matches nothing.
    pub async fn search(
        &self,
        keyword: &str,
        sort: &str,
        order: &str,
        status: &str,
    ) -> Result<Vec<Book>> {
        let mut query = KeywordQuery::new(keyword.trim())
            .sorted_by(SortColumn::from_requested(sort), SortOrder::normalize(order));

        let status = status.trim();
        if !status.is_empty() {
            match status.parse::<ReadStatus>() {
                Ok(status) => query = query.with_status(status),
                Err(_) => {
                    debug!("Unknown status filter '{}'", status);
                    return Ok(Vec::new());
                }
            }
        }

        Ok(search_books(&self.pool, &query).await?)
    }

    pub async fn count_by_status(&self) -> Result<StatusCounts> {
        Ok(books::count_by_status(&self.pool).await?)
    }

    /// Finished books per year, most recent first, with ratios
    pub async fn count_finished_by_year(&self) -> Result<Vec<YearRecord>> {
        Ok(books::count_finished_by_year(&self.pool).await?)
    }

    /// Distinct values of an attribute with their book counts
    pub async fn list_groups(
        &self,
        attribute: BookAttribute,
        filter: &str,
        order: &str,
    ) -> Result<Vec<AttributeGroup>> {
        let order = SortOrder::normalize(order);
        Ok(attributes::list_distinct(&self.pool, attribute, filter, order).await?)
    }

    /// Distinct values of an attribute, without counts or filtering
    pub async fn list_group_names(&self, attribute: BookAttribute) -> Result<Vec<String>> {
        Ok(attributes::list_distinct_names(&self.pool, attribute).await?)
    }

    /// Renames every occurrence of an attribute value in one statement
    ///
    /// Both names are trimmed; a blank name fails before anything is written.
    /// Returns the number of books changed.
    pub async fn rename(
        &self,
        attribute: BookAttribute,
        old_name: &str,
        new_name: &str,
    ) -> Result<u64> {
        let old_name = old_name.trim();
        let new_name = new_name.trim();
        if old_name.is_empty() || new_name.is_empty() {
            return Err(LibraryError::InvalidName(attribute));
        }

        let changed = attributes::rename_value(&self.pool, attribute, old_name, new_name).await?;
        info!(
            "Renamed {} '{}' to '{}' on {} books",
            attribute, old_name, new_name, changed
        );
        Ok(changed)
    }

    /// Creates one book per table row
    pub async fn import_table(
        &self,
        table: &ImportTable,
        mapping: &ColumnMapping,
    ) -> ImportReport {
        BookImporter::new(self).import(table, mapping).await
    }

    /// Writes every book as CSV, returning the number of data rows
    pub async fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let books = self.get_all().await?;
        export::write_csv(&books, writer)
    }

    /// Writes every book as a JSON array, returning the number of records
    pub async fn export_json<W: Write>(&self, writer: W) -> Result<usize> {
        let books = self.get_all().await?;
        export::write_json(&books, writer)
    }
}
