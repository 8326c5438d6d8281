//! Knowledge-base repository contracts and SQLite implementation.

use crate::model::knowledge::KnowledgeRecord;
use crate::repo::{decode_json, encode_json, RepoResult};
use rusqlite::{named_params, Connection, Row};

const KNOWLEDGE_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    type,
    text,
    metadata
FROM knowledge_base";

/// Repository interface for knowledge-base entries.
pub trait KnowledgeRepository {
    fn upsert_knowledge_record(&self, record: &KnowledgeRecord) -> RepoResult<()>;
    fn get_knowledge_record(&self, id: &str) -> RepoResult<Option<KnowledgeRecord>>;
    /// Lists one user's entries ordered by `id ASC`.
    fn list_knowledge_records(&self, user_id: &str) -> RepoResult<Vec<KnowledgeRecord>>;
}

/// SQLite-backed knowledge-base repository.
pub struct SqliteKnowledgeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKnowledgeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl KnowledgeRepository for SqliteKnowledgeRepository<'_> {
    fn upsert_knowledge_record(&self, record: &KnowledgeRecord) -> RepoResult<()> {
        let metadata = encode_json("knowledge_base.metadata", &record.metadata)?;

        self.conn.execute(
            "INSERT INTO knowledge_base (id, user_id, type, text, metadata)
             VALUES (:id, :user_id, :type, :text, :metadata)
             ON CONFLICT (id) DO UPDATE SET
                type = excluded.type,
                text = excluded.text,
                metadata = excluded.metadata;",
            named_params! {
                ":id": record.id.as_str(),
                ":user_id": record.user_id.as_str(),
                ":type": record.kind.as_str(),
                ":text": record.text.as_str(),
                ":metadata": metadata,
            },
        )?;

        Ok(())
    }

    fn get_knowledge_record(&self, id: &str) -> RepoResult<Option<KnowledgeRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{KNOWLEDGE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_knowledge_row(row)?));
        }

        Ok(None)
    }

    fn list_knowledge_records(&self, user_id: &str) -> RepoResult<Vec<KnowledgeRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{KNOWLEDGE_SELECT_SQL} WHERE user_id = ?1 ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query([user_id])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_knowledge_row(row)?);
        }

        Ok(records)
    }
}

fn parse_knowledge_row(row: &Row<'_>) -> RepoResult<KnowledgeRecord> {
    let metadata_text: String = row.get("metadata")?;

    Ok(KnowledgeRecord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        kind: row.get("type")?,
        text: row.get("text")?,
        metadata: decode_json("knowledge_base", "metadata", &metadata_text)?,
    })
}
