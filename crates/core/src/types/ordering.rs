//! Sort direction and sort column policies
//!
//! Both types only ever render to a fixed set of SQL fragments, so requested
//! values coming from users can be spliced into an `ORDER BY` safely.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Normalizes a requested direction; anything but `asc`/`desc` becomes `asc`
    pub fn normalize(requested: &str) -> Self {
        match requested {
            "desc" => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `requested` if it is exactly `asc` or `desc`, otherwise `asc`
pub fn normalize_order(requested: &str) -> &'static str {
    SortOrder::normalize(requested).as_str()
}

/// Columns a book listing may be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    Title,
    Author,
    CreatedAt,
    StartedAt,
    FinishedAt,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Title,
        SortColumn::Author,
        SortColumn::CreatedAt,
        SortColumn::StartedAt,
        SortColumn::FinishedAt,
    ];

    /// Whitelists a requested column name, defaulting to `title`
    pub fn from_requested(requested: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|column| column.as_str() == requested)
            .unwrap_or_default()
    }

    /// Column name in the `books` table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::CreatedAt => "created_at",
            Self::StartedAt => "started_at",
            Self::FinishedAt => "finished_at",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `requested` if it is a sortable column, otherwise `title`
pub fn sort_criteria(requested: &str) -> &'static str {
    SortColumn::from_requested(requested).as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_order() {
        assert_eq!(normalize_order("asc"), "asc");
        assert_eq!(normalize_order("desc"), "desc");
        assert_eq!(normalize_order(""), "asc");
        assert_eq!(normalize_order("DESC"), "asc");
        assert_eq!(normalize_order("desc; DROP TABLE books"), "asc");
    }

    #[test]
    fn test_sort_criteria_defaults_to_title() {
        assert_eq!(sort_criteria(""), "title");
        assert_eq!(sort_criteria("xxx"), "title");
        assert_eq!(sort_criteria("created"), "title");
        assert_eq!(sort_criteria("title"), "title");
    }

    #[test]
    fn test_sort_criteria_accepts_whitelist() {
        assert_eq!(sort_criteria("author"), "author");
        assert_eq!(sort_criteria("created_at"), "created_at");
        assert_eq!(sort_criteria("started_at"), "started_at");
        assert_eq!(sort_criteria("finished_at"), "finished_at");
    }

    #[test]
    fn test_sort_column_display_matches_column() {
        for column in SortColumn::ALL {
            assert_eq!(SortColumn::from_requested(&column.to_string()), column);
        }
    }
}
