//! Groupable text attributes of a book

use crate::types::Book;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A nameable text attribute that books can be grouped and bulk-renamed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookAttribute {
    Author,
    Series,
}

impl BookAttribute {
    /// Column name in the `books` table
    pub fn column(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Series => "series",
        }
    }

    /// Reads the attribute from a book
    pub fn value<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            Self::Author => &book.author,
            Self::Series => &book.series,
        }
    }

    /// Writes the attribute on a book
    pub fn set(&self, book: &mut Book, value: impl Into<String>) {
        match self {
            Self::Author => book.author = value.into(),
            Self::Series => book.series = value.into(),
        }
    }
}

impl fmt::Display for BookAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One distinct attribute value and the number of books carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeGroup {
    pub name: String,
    pub count: i64,
}

impl AttributeGroup {
    pub fn new(name: impl Into<String>, count: i64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}
