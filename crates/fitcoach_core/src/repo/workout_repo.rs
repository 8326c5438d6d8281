//! Workout repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `upsert_workout` replaces every mutable column and refreshes
//!   `updated_at`; `user_id` stays with the row that created it.
//! - `raw` is stored as JSON text and must decode back into an object.

use crate::model::workout::WorkoutRecord;
use crate::repo::{decode_json, encode_json, RepoResult};
use rusqlite::types::Value;
use rusqlite::{named_params, params_from_iter, Connection, Row};

const WORKOUT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    date,
    type,
    status,
    distance_m,
    duration_s,
    heart_rate,
    pace_str,
    raw
FROM workouts";

/// Filter for listing persisted workouts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutListQuery {
    pub user_id: Option<String>,
    /// Inclusive lower bound on `date` (lexicographic).
    pub start_date: Option<String>,
    /// Inclusive upper bound on `date` (lexicographic).
    pub end_date: Option<String>,
}

/// Repository interface for workouts.
pub trait WorkoutRepository {
    fn upsert_workout(&self, record: &WorkoutRecord) -> RepoResult<()>;
    fn get_workout(&self, id: &str) -> RepoResult<Option<WorkoutRecord>>;
    /// Lists workouts ordered by `date ASC, id ASC`.
    fn list_workouts(&self, query: &WorkoutListQuery) -> RepoResult<Vec<WorkoutRecord>>;
}

/// SQLite-backed workout repository.
pub struct SqliteWorkoutRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkoutRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl WorkoutRepository for SqliteWorkoutRepository<'_> {
    fn upsert_workout(&self, record: &WorkoutRecord) -> RepoResult<()> {
        let raw = encode_json("workouts.raw", &record.raw)?;

        self.conn.execute(
            "INSERT INTO workouts (
                id,
                user_id,
                date,
                type,
                status,
                distance_m,
                duration_s,
                heart_rate,
                pace_str,
                raw
            ) VALUES (
                :id, :user_id, :date, :type, :status,
                :distance_m, :duration_s, :heart_rate, :pace_str, :raw
            )
            ON CONFLICT (id) DO UPDATE SET
                date = excluded.date,
                type = excluded.type,
                status = excluded.status,
                distance_m = excluded.distance_m,
                duration_s = excluded.duration_s,
                heart_rate = excluded.heart_rate,
                pace_str = excluded.pace_str,
                raw = excluded.raw,
                updated_at = (strftime('%s', 'now') * 1000);",
            named_params! {
                ":id": record.id.as_str(),
                ":user_id": record.user_id.as_str(),
                ":date": record.date.as_str(),
                ":type": record.kind.as_str(),
                ":status": record.status.as_str(),
                ":distance_m": record.distance_m,
                ":duration_s": record.duration_s,
                ":heart_rate": record.heart_rate,
                ":pace_str": record.pace_str.as_str(),
                ":raw": raw,
            },
        )?;

        Ok(())
    }

    fn get_workout(&self, id: &str) -> RepoResult<Option<WorkoutRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{WORKOUT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_workout_row(row)?));
        }

        Ok(None)
    }

    fn list_workouts(&self, query: &WorkoutListQuery) -> RepoResult<Vec<WorkoutRecord>> {
        let mut sql = format!("{WORKOUT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user_id) = query.user_id.as_ref() {
            sql.push_str(" AND user_id = ?");
            bind_values.push(Value::Text(user_id.clone()));
        }
        if let Some(start_date) = query.start_date.as_ref() {
            sql.push_str(" AND date >= ?");
            bind_values.push(Value::Text(start_date.clone()));
        }
        if let Some(end_date) = query.end_date.as_ref() {
            sql.push_str(" AND date <= ?");
            bind_values.push(Value::Text(end_date.clone()));
        }

        sql.push_str(" ORDER BY date ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut workouts = Vec::new();

        while let Some(row) = rows.next()? {
            workouts.push(parse_workout_row(row)?);
        }

        Ok(workouts)
    }
}

fn parse_workout_row(row: &Row<'_>) -> RepoResult<WorkoutRecord> {
    let raw_text: String = row.get("raw")?;

    Ok(WorkoutRecord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        date: row.get("date")?,
        kind: row.get("type")?,
        status: row.get("status")?,
        distance_m: row.get("distance_m")?,
        duration_s: row.get("duration_s")?,
        heart_rate: row.get("heart_rate")?,
        pace_str: row.get("pace_str")?,
        raw: decode_json("workouts", "raw", &raw_text)?,
    })
}
