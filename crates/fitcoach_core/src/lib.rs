//! Core logic for the fitcoach workout pipeline.
//!
//! Exported records flow through `transform` into canonical records, the
//! `service::loader` persists them, and `stats` aggregates completed runs
//! over a date range.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;
pub mod transform;

pub use config::{ConfigError, StoreConfig, StoreLocation};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::knowledge::KnowledgeRecord;
pub use model::workout::WorkoutRecord;
pub use model::RawPayload;
pub use repo::knowledge_repo::{KnowledgeRepository, SqliteKnowledgeRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::workout_repo::{SqliteWorkoutRepository, WorkoutListQuery, WorkoutRepository};
pub use repo::{RepoError, RepoResult};
pub use service::loader::{read_transform_output, LoadError, LoadReport, LoadResult, Loader};
pub use stats::api::{
    handle_stats_request, handle_store_stats_request, health, HealthStatus, StatsRequest,
    StatsResponse,
};
pub use stats::{calculate_stats, compute_stat, StatField};
pub use transform::{
    parse_float_tolerant, strip_html, transform_export, transform_knowledge_batch,
    transform_knowledge_record, transform_workout, transform_workouts_batch, ExportDocument,
    TransformOutput, UNKNOWN_USER_ID,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
