//! SQLite store bootstrap.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the fitcoach store.
//! - Create the consumed schema (`users`, `workouts`, `knowledge_base`) on
//!   first open.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Loader/repository code must not touch a connection before bootstrap
//!   succeeds.

use thiserror::Error;

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory, open_store};

pub type DbResult<T> = Result<T, DbError>;

/// Storage bootstrap and transport error.
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
