//! Batch loader for transform output.
//!
//! # Responsibility
//! - Ensure every referenced user exists before dependent rows are written.
//! - Upsert workouts and knowledge entries keyed on `id`.
//!
//! # Invariants
//! - Each load call runs in one `IMMEDIATE` transaction and commits once after
//!   the whole batch; any failure rolls the batch back.
//! - No retries. Store errors propagate to the caller unchanged.
//! - Loading the same batch twice leaves the same stored state as loading it
//!   once (apart from `updated_at`).

use crate::model::knowledge::KnowledgeRecord;
use crate::model::workout::WorkoutRecord;
use crate::repo::knowledge_repo::{KnowledgeRepository, SqliteKnowledgeRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use crate::repo::workout_repo::{SqliteWorkoutRepository, WorkoutRepository};
use crate::repo::RepoError;
use crate::transform::TransformOutput;
use log::{error, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

pub type LoadResult<T> = Result<T, LoadError>;

/// Loader error.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("failed to read transform output `{path}`: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed transform output `{path}`: {source}")]
    ParseInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<rusqlite::Error> for LoadError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

/// Counts reported after a full batch load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Distinct non-empty user ids referenced by the batch.
    pub users_referenced: usize,
    /// User ids that did not exist before this load.
    pub users_created: usize,
    pub workouts_loaded: usize,
    pub knowledge_loaded: usize,
}

/// Reads a transform output file produced by the transform step.
pub fn read_transform_output(path: impl AsRef<Path>) -> LoadResult<TransformOutput> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Loader bound to one open store connection.
pub struct Loader<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> Loader<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Inserts the user reference when absent. Returns `true` on insert.
    pub fn ensure_user(&self, user_id: &str) -> LoadResult<bool> {
        Ok(SqliteUserRepository::new(&*self.conn).ensure_user(user_id)?)
    }

    /// Ensures a set of user ids in one transaction. Returns how many were new.
    pub fn ensure_users<'a, I>(&mut self, user_ids: I) -> LoadResult<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let user_ids: Vec<&str> = user_ids.into_iter().collect();
        run_batch(self.conn, "users", |tx| {
            let repo = SqliteUserRepository::new(tx);
            let mut created = 0;
            for user_id in &user_ids {
                if repo.ensure_user(user_id)? {
                    created += 1;
                }
            }
            Ok(created)
        })
    }

    /// Upserts a workout batch. Returns the number of rows written.
    pub fn load_workouts(&mut self, records: &[WorkoutRecord]) -> LoadResult<usize> {
        run_batch(self.conn, "workouts", |tx| {
            let repo = SqliteWorkoutRepository::new(tx);
            for record in records {
                repo.upsert_workout(&with_workout_id(record))?;
            }
            Ok(records.len())
        })
    }

    /// Upserts a knowledge-base batch. Returns the number of rows written.
    pub fn load_knowledge_records(&mut self, records: &[KnowledgeRecord]) -> LoadResult<usize> {
        run_batch(self.conn, "knowledge_base", |tx| {
            let repo = SqliteKnowledgeRepository::new(tx);
            for record in records {
                repo.upsert_knowledge_record(&with_knowledge_id(record))?;
            }
            Ok(records.len())
        })
    }

    /// Runs the full ensure-users then load sequence for one transform output.
    pub fn load_transform_output(&mut self, output: &TransformOutput) -> LoadResult<LoadReport> {
        let workouts = output.workouts.as_deref().unwrap_or_default();
        let knowledge = output.knowledge_base.as_deref().unwrap_or_default();

        let user_ids: BTreeSet<&str> = workouts
            .iter()
            .map(|record| record.user_id.as_str())
            .chain(knowledge.iter().map(|record| record.user_id.as_str()))
            .filter(|user_id| !user_id.is_empty())
            .collect();

        let mut report = LoadReport {
            users_referenced: user_ids.len(),
            ..LoadReport::default()
        };
        report.users_created = self.ensure_users(user_ids.iter().copied())?;

        if !workouts.is_empty() {
            report.workouts_loaded = self.load_workouts(workouts)?;
        }
        if !knowledge.is_empty() {
            report.knowledge_loaded = self.load_knowledge_records(knowledge)?;
        }

        Ok(report)
    }
}

fn run_batch<F>(conn: &mut Connection, table: &str, apply: F) -> LoadResult<usize>
where
    F: FnOnce(&Transaction<'_>) -> LoadResult<usize>,
{
    let started_at = Instant::now();
    info!("event=load_batch module=loader status=start table={table}");

    let result = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(LoadError::from)
        .and_then(|tx| {
            let count = apply(&tx)?;
            tx.commit()?;
            Ok(count)
        });

    match &result {
        Ok(count) => info!(
            "event=load_batch module=loader status=ok table={table} rows={count} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=load_batch module=loader status=error table={table} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }

    result
}

fn with_workout_id(record: &WorkoutRecord) -> Cow<'_, WorkoutRecord> {
    if !record.id.is_empty() {
        return Cow::Borrowed(record);
    }
    let mut owned = record.clone();
    owned.id = WorkoutRecord::generate_id(&record.date);
    warn!(
        "event=load_generate_id module=loader table=workouts id={}",
        owned.id
    );
    Cow::Owned(owned)
}

fn with_knowledge_id(record: &KnowledgeRecord) -> Cow<'_, KnowledgeRecord> {
    if !record.id.is_empty() {
        return Cow::Borrowed(record);
    }
    let mut owned = record.clone();
    owned.id = KnowledgeRecord::generate_id();
    warn!(
        "event=load_generate_id module=loader table=knowledge_base id={}",
        owned.id
    );
    Cow::Owned(owned)
}
