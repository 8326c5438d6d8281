//! Workout domain model.
//!
//! # Responsibility
//! - Hold one normalized workout as produced by the transformer.
//! - Project a stored workout back into export units for statistics.
//!
//! # Invariants
//! - `distance_m` is meters and `duration_s` is seconds.
//! - `heart_rate`, when set, is strictly positive.
//! - `raw` keeps every unmapped input field verbatim.

use super::{null_as_default, short_hex_id, RawPayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_WORKOUT_TYPE: &str = "run";
pub const DEFAULT_WORKOUT_STATUS: &str = "completed";

/// Canonical workout record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    /// Stable upsert key. Empty only for hand-written load input.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub user_id: String,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    /// Serialized as `type` to match the store column.
    #[serde(rename = "type", default = "default_workout_type")]
    pub kind: String,
    #[serde(default = "default_workout_status")]
    pub status: String,
    #[serde(default)]
    pub distance_m: Option<f64>,
    #[serde(default)]
    pub duration_s: Option<f64>,
    #[serde(default)]
    pub heart_rate: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pace_str: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw: RawPayload,
}

impl WorkoutRecord {
    /// Builds an id of the form `w_<date>_<12 hex>`.
    pub fn generate_id(date: &str) -> String {
        format!("w_{date}_{}", short_hex_id())
    }

    /// Projects this record into the export shape consumed by the stats engine.
    ///
    /// Starts from `raw` and overwrites it with the canonical values converted
    /// back to kilometers and minutes, so persisted values win over stale raw
    /// input.
    pub fn to_export_value(&self) -> Value {
        let mut out = self.raw.clone();
        out.insert("id".to_string(), Value::from(self.id.as_str()));
        out.insert("date".to_string(), Value::from(self.date.as_str()));
        out.insert("type".to_string(), Value::from(self.kind.as_str()));
        out.insert("status".to_string(), Value::from(self.status.as_str()));
        set_or_remove(&mut out, "runDistance", self.distance_m.map(|m| m / 1000.0));
        set_or_remove(&mut out, "runDuration", self.duration_s.map(|s| s / 60.0));
        set_or_remove(&mut out, "runHeartRate", self.heart_rate);
        if self.pace_str.is_empty() {
            out.remove("runPace");
        } else {
            out.insert("runPace".to_string(), Value::from(self.pace_str.as_str()));
        }
        Value::Object(out)
    }
}

fn set_or_remove(out: &mut RawPayload, key: &str, value: Option<f64>) {
    match value {
        Some(v) => {
            out.insert(key.to_string(), Value::from(v));
        }
        None => {
            out.remove(key);
        }
    }
}

fn default_workout_type() -> String {
    DEFAULT_WORKOUT_TYPE.to_string()
}

fn default_workout_status() -> String {
    DEFAULT_WORKOUT_STATUS.to_string()
}
