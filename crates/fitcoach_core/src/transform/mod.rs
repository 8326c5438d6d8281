//! Export-to-canonical record transformation.
//!
//! # Responsibility
//! - Convert raw exported workouts/knowledge entries into canonical records.
//! - Drop records that fail the minimum viability check instead of erroring.
//!
//! # Invariants
//! - Workouts without a `date` and knowledge entries without text are dropped.
//! - Distance is km → meters, duration is minutes → seconds.
//! - Batch transforms preserve the relative order of surviving records.

use crate::model::knowledge::{KnowledgeRecord, DEFAULT_KNOWLEDGE_TYPE};
use crate::model::workout::{WorkoutRecord, DEFAULT_WORKOUT_STATUS, DEFAULT_WORKOUT_TYPE};
use crate::model::RawPayload;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod html;
pub mod parse;

pub use html::strip_html;
pub use parse::{parse_float_tolerant, parse_numeric_text, parse_pace_text};

use parse::{first_truthy, first_truthy_str};

/// User id used when the export does not name one.
pub const UNKNOWN_USER_ID: &str = "unknown";

const DISTANCE_KEYS: &[&str] = &["runDistance", "distance"];
const DURATION_KEYS: &[&str] = &["runDuration", "duration"];
const HEART_RATE_KEY: &str = "runHeartRate";
const PACE_KEYS: &[&str] = &["runPace", "pace_str"];

/// Output field names; every other input key is kept in `raw`.
const WORKOUT_CANONICAL_KEYS: &[&str] = &[
    "id",
    "user_id",
    "date",
    "type",
    "status",
    "distance_m",
    "duration_s",
    "heart_rate",
    "pace_str",
];

/// Transforms one exported workout.
///
/// Returns `None` when the record has no non-empty `date` string.
pub fn transform_workout(raw: &RawPayload, user_id: &str) -> Option<WorkoutRecord> {
    let date = first_truthy_str(raw, &["date"])?.to_string();

    let distance_km = first_truthy(raw, DISTANCE_KEYS).and_then(parse_float_tolerant);
    let duration_min = first_truthy(raw, DURATION_KEYS).and_then(parse_float_tolerant);
    let heart_rate = raw
        .get(HEART_RATE_KEY)
        .and_then(parse_float_tolerant)
        .filter(|bpm| *bpm > 0.0);

    let id = first_truthy_str(raw, &["id"])
        .map(str::to_string)
        .unwrap_or_else(|| WorkoutRecord::generate_id(&date));

    let passthrough = raw
        .iter()
        .filter(|(key, _)| !WORKOUT_CANONICAL_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(WorkoutRecord {
        id,
        user_id: user_id.to_string(),
        date,
        kind: first_truthy_str(raw, &["type"])
            .unwrap_or(DEFAULT_WORKOUT_TYPE)
            .to_string(),
        status: first_truthy_str(raw, &["status"])
            .unwrap_or(DEFAULT_WORKOUT_STATUS)
            .to_string(),
        distance_m: non_zero(distance_km).map(|km| km * 1000.0),
        duration_s: non_zero(duration_min).map(|min| min * 60.0),
        heart_rate,
        pace_str: first_truthy_str(raw, PACE_KEYS).unwrap_or("").to_string(),
        raw: passthrough,
    })
}

/// Transforms one exported knowledge-base entry.
///
/// Returns `None` when `text` is missing, not a string, or empty once tags
/// and surrounding whitespace are removed.
pub fn transform_knowledge_record(raw: &RawPayload, user_id: &str) -> Option<KnowledgeRecord> {
    let text = strip_html(raw.get("text").and_then(Value::as_str)?);
    if text.is_empty() {
        return None;
    }

    let metadata = match raw.get("metadata") {
        Some(Value::Object(fields)) => fields.clone(),
        _ => RawPayload::new(),
    };

    Some(KnowledgeRecord {
        id: first_truthy_str(raw, &["id"])
            .map(str::to_string)
            .unwrap_or_else(KnowledgeRecord::generate_id),
        user_id: user_id.to_string(),
        kind: first_truthy_str(raw, &["type"])
            .unwrap_or(DEFAULT_KNOWLEDGE_TYPE)
            .to_string(),
        text,
        metadata,
    })
}

/// Transforms a batch of workouts, skipping dropped and non-object entries.
pub fn transform_workouts_batch(records: &[Value], user_id: &str) -> Vec<WorkoutRecord> {
    let out: Vec<WorkoutRecord> = records
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|raw| transform_workout(raw, user_id))
        .collect();
    debug!(
        "event=transform_batch module=transform kind=workout input={} output={}",
        records.len(),
        out.len()
    );
    out
}

/// Transforms a batch of knowledge entries, skipping dropped and non-object entries.
pub fn transform_knowledge_batch(records: &[Value], user_id: &str) -> Vec<KnowledgeRecord> {
    let out: Vec<KnowledgeRecord> = records
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|raw| transform_knowledge_record(raw, user_id))
        .collect();
    debug!(
        "event=transform_batch module=transform kind=knowledge input={} output={}",
        records.len(),
        out.len()
    );
    out
}

/// Raw export document accepted by the transform entry point.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportDocument {
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub workouts: Option<Vec<Value>>,
    #[serde(default)]
    pub knowledge_base: Option<Vec<Value>>,
}

/// Transform output, also the input of the loader.
///
/// A section is present only when the export carried it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workouts: Option<Vec<WorkoutRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base: Option<Vec<KnowledgeRecord>>,
}

/// Transforms a whole export document.
///
/// `user_id` falls back to [`UNKNOWN_USER_ID`] when missing or not a string.
pub fn transform_export(doc: &ExportDocument) -> TransformOutput {
    let user_id = doc
        .user_id
        .as_ref()
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_USER_ID);

    TransformOutput {
        workouts: doc
            .workouts
            .as_deref()
            .map(|records| transform_workouts_batch(records, user_id)),
        knowledge_base: doc
            .knowledge_base
            .as_deref()
            .map(|records| transform_knowledge_batch(records, user_id)),
    }
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}
