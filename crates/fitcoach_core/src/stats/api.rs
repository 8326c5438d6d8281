//! Statistics endpoint request/response contract.
//!
//! The HTTP routing layer is external; it deserializes a [`StatsRequest`],
//! calls [`handle_stats_request`] and serializes the [`StatsResponse`].
//! Responses are always well-formed: `value` is `null` when there is no data
//! or the field is unknown.

use super::{calculate_stats, StatField};
use crate::repo::workout_repo::{SqliteWorkoutRepository, WorkoutListQuery, WorkoutRepository};
use crate::repo::RepoResult;
use log::debug;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Statistics request over an in-memory workout collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsRequest {
    /// Workouts in export shape (`runDistance` km, `runDuration` min, ...).
    #[serde(default)]
    pub workouts: Vec<Value>,
    pub start_date: String,
    pub end_date: String,
    pub field: String,
}

/// Statistics response echoing the request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub value: Option<f64>,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub unit: String,
}

/// Liveness payload for the statistics service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// Returns the liveness payload.
pub fn health() -> HealthStatus {
    HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }
}

/// Unit label for a wire field name; empty for unknown fields.
pub fn unit_for_field(field: &str) -> &'static str {
    StatField::parse(field).map_or("", StatField::unit)
}

/// Computes the requested statistic over the request's workouts.
pub fn handle_stats_request(request: &StatsRequest) -> StatsResponse {
    let value = calculate_stats(
        &request.workouts,
        &request.start_date,
        &request.end_date,
        &request.field,
    );
    debug!(
        "event=stats module=stats field={} workouts={} has_value={}",
        request.field,
        request.workouts.len(),
        value.is_some()
    );

    StatsResponse {
        value,
        field: request.field.clone(),
        start_date: request.start_date.clone(),
        end_date: request.end_date.clone(),
        unit: unit_for_field(&request.field).to_string(),
    }
}

/// Computes a statistic over one user's persisted workouts.
///
/// Stored rows are projected back into export units before aggregation.
pub fn handle_store_stats_request(
    conn: &Connection,
    user_id: &str,
    start_date: &str,
    end_date: &str,
    field: &str,
) -> RepoResult<StatsResponse> {
    let query = WorkoutListQuery {
        user_id: Some(user_id.to_string()),
        start_date: Some(start_date.to_string()),
        end_date: Some(end_date.to_string()),
    };
    let workouts = SqliteWorkoutRepository::new(conn)
        .list_workouts(&query)?
        .iter()
        .map(|record| record.to_export_value())
        .collect();

    Ok(handle_stats_request(&StatsRequest {
        workouts,
        start_date: start_date.to_string(),
        end_date: end_date.to_string(),
        field: field.to_string(),
    }))
}
