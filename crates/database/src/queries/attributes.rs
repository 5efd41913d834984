//! Grouping and bulk renaming of a single text attribute (author or series)
//!
//! Column names come from [`BookAttribute::column`], never from caller input.

use crate::DbPool;
use readlog_core::{AppError, AttributeGroup, BookAttribute, SortOrder};
use sqlx::Row;

/// Lists distinct non-empty values of `attribute` with the number of books per value
///
/// A non-empty `filter` keeps only values containing it, ignoring ASCII case.
/// Values are ordered case-insensitively in the given direction.
pub async fn list_distinct(
    pool: &DbPool,
    attribute: BookAttribute,
    filter: &str,
    order: SortOrder,
) -> Result<Vec<AttributeGroup>, AppError> {
    let column = attribute.column();
    let filter = filter.trim();

    let mut sql = format!(
        "SELECT {col} AS name, COUNT(*) AS count FROM books WHERE {col} <> ''",
        col = column
    );
    if !filter.is_empty() {
        sql.push_str(&format!(" AND instr(lower({}), lower(?)) > 0", column));
    }
    sql.push_str(&format!(
        " GROUP BY {col} ORDER BY {col} COLLATE NOCASE {dir}, {col}",
        col = column,
        dir = order.as_str()
    ));

    let mut query = sqlx::query(&sql);
    if !filter.is_empty() {
        query = query.bind(filter);
    }

    let rows = query
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list {} groups", attribute), e))?;

    rows.into_iter()
        .map(|row| {
            let name: String = row
                .try_get("name")
                .map_err(|e| AppError::database("Missing group name", e))?;
            let count: i64 = row
                .try_get("count")
                .map_err(|e| AppError::database("Missing group count", e))?;
            Ok(AttributeGroup::new(name, count))
        })
        .collect()
}

/// Lists distinct non-empty values of `attribute`, case-insensitively ascending
pub async fn list_distinct_names(
    pool: &DbPool,
    attribute: BookAttribute,
) -> Result<Vec<String>, AppError> {
    let sql = format!(
        "SELECT DISTINCT {col} FROM books WHERE {col} <> '' ORDER BY {col} COLLATE NOCASE ASC, {col}",
        col = attribute.column()
    );

    sqlx::query_scalar(&sql)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list {} names", attribute), e))
}

/// Replaces `old_name` with `new_name` on every book carrying it, in one statement
///
/// Names are bound as given; trimming and emptiness checks are the caller's job.
/// Returns the number of rows changed.
pub async fn rename_value(
    pool: &DbPool,
    attribute: BookAttribute,
    old_name: &str,
    new_name: &str,
) -> Result<u64, AppError> {
    let sql = format!(
        "UPDATE books SET {col} = ? WHERE {col} = ?",
        col = attribute.column()
    );

    let result = sqlx::query(&sql)
        .bind(new_name)
        .bind(old_name)
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to rename {}", attribute), e))?;

    Ok(result.rows_affected())
}
