//! Database query operations organized by concern

pub mod attributes;
pub mod books;

pub use attributes::{list_distinct, list_distinct_names, rename_value};
pub use books::{
    clear_books, count_books, count_by_status, count_finished_by_year, count_with_status,
    delete_book, get_book, get_books_by_author, get_books_by_series, get_books_by_status,
    get_books_by_year, insert_book, list_books, update_book,
};
