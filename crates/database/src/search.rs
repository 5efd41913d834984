//! Keyword search over title and author

use crate::queries::books::{row_to_book, BOOK_COLUMNS};
use crate::DbPool;
use readlog_core::{AppError, Book, ReadStatus, SortColumn, SortOrder};

/// Parameters of a keyword search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordQuery {
    /// Substring to look for in title or author; empty matches every book
    pub keyword: String,
    pub sort: SortColumn,
    pub order: SortOrder,
    pub status: Option<ReadStatus>,
}

impl Default for KeywordQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            sort: SortColumn::Title,
            order: SortOrder::Asc,
            status: None,
        }
    }
}

impl KeywordQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    pub fn sorted_by(mut self, sort: SortColumn, order: SortOrder) -> Self {
        self.sort = sort;
        self.order = order;
        self
    }

    pub fn with_status(mut self, status: ReadStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Finds books whose title or author contains the keyword, ignoring ASCII case
pub async fn search_books(pool: &DbPool, query: &KeywordQuery) -> Result<Vec<Book>, AppError> {
    let keyword = query.keyword.trim();

    let mut clauses: Vec<&str> = Vec::new();
    if !keyword.is_empty() {
        clauses.push("(instr(lower(title), lower(?)) > 0 OR instr(lower(author), lower(?)) > 0)");
    }
    if query.status.is_some() {
        clauses.push("status = ?");
    }

    let mut sql = format!("SELECT {} FROM books", BOOK_COLUMNS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(&format!(
        " ORDER BY {} COLLATE NOCASE {}, id",
        query.sort.as_str(),
        query.order.as_str()
    ));

    let mut statement = sqlx::query(&sql);
    if !keyword.is_empty() {
        statement = statement.bind(keyword).bind(keyword);
    }
    if let Some(status) = query.status {
        statement = statement.bind(status.as_str());
    }

    let rows = statement
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to search books", e))?;

    log::debug!("Keyword search '{}' matched {} books", keyword, rows.len());

    rows.into_iter().map(row_to_book).collect()
}
