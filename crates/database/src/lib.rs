//! readlog database layer
//!
//! SQLite persistence for book records using sqlx. This crate only stores and
//! fetches rows; status derivation and validation happen in `readlog-library`.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod search;

pub use connection::{connect, DatabaseConfig, DbPool};
pub use migrations::{current_version, run_migrations};
pub use search::{search_books, KeywordQuery};
