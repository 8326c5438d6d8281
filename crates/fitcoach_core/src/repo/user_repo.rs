//! User reference repository.
//!
//! Users carry no attributes here; the table exists so workout and knowledge
//! rows can reference an owner through a foreign key.

use crate::repo::RepoResult;
use rusqlite::Connection;

/// Repository interface for user references.
pub trait UserRepository {
    /// Inserts the user id unless it already exists. Returns `true` on insert.
    fn ensure_user(&self, user_id: &str) -> RepoResult<bool>;
    fn user_exists(&self, user_id: &str) -> RepoResult<bool>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn ensure_user(&self, user_id: &str) -> RepoResult<bool> {
        let inserted = self
            .conn
            .execute("INSERT OR IGNORE INTO users (id) VALUES (?1);", [user_id])?;
        Ok(inserted > 0)
    }

    fn user_exists(&self, user_id: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}
