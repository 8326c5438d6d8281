//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Keep SQL for `users`, `workouts` and `knowledge_base` inside the
//!   persistence boundary.
//! - Provide upsert-by-id writes and typed read-back.
//!
//! # Invariants
//! - Writes are pure overwrites keyed on `id`; replaying a write is a no-op
//!   apart from `updated_at`.
//! - Read paths reject undecodable persisted JSON instead of masking it.

use crate::db::DbError;
use thiserror::Error;

pub mod knowledge_repo;
pub mod user_repo;
pub mod workout_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and read-back.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("failed to encode {column} as JSON: {source}")]
    Encode {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn encode_json(
    column: &'static str,
    value: &crate::model::RawPayload,
) -> RepoResult<String> {
    serde_json::to_string(value).map_err(|source| RepoError::Encode { column, source })
}

pub(crate) fn decode_json(
    table: &str,
    column: &str,
    text: &str,
) -> RepoResult<crate::model::RawPayload> {
    serde_json::from_str(text).map_err(|err| {
        RepoError::InvalidData(format!("invalid JSON object in {table}.{column}: {err}"))
    })
}
