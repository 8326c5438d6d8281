//! Date-range workout statistics.
//!
//! # Responsibility
//! - Filter exported workouts down to completed runs inside a date range.
//! - Reduce the filtered set to one scalar per requested field.
//!
//! # Invariants
//! - Stateless: output depends only on the inputs.
//! - Dates compare lexicographically, which matches chronological order for
//!   ISO `YYYY-MM-DD`; both range ends are inclusive.
//! - `None` means "no data", never zero. Unknown fields yield `None`.
//! - Values are read in export units (km, minutes), not canonical units.

use crate::transform::parse::{first_truthy_str, parse_float_tolerant, parse_pace_text};
use serde_json::{Map, Value};

pub mod api;

/// Aggregate fields the engine knows how to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatField {
    AvgHeartRate,
    TotalDistance,
    TotalDuration,
    RunCount,
    AvgPaceMinPerKm,
}

impl StatField {
    pub const ALL: [StatField; 5] = [
        StatField::AvgHeartRate,
        StatField::TotalDistance,
        StatField::TotalDuration,
        StatField::RunCount,
        StatField::AvgPaceMinPerKm,
    ];

    /// Resolves a wire field name. Unknown names are `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AvgHeartRate => "avg_heart_rate",
            Self::TotalDistance => "total_distance",
            Self::TotalDuration => "total_duration",
            Self::RunCount => "run_count",
            Self::AvgPaceMinPerKm => "avg_pace_min_per_km",
        }
    }

    /// Unit label reported next to the value.
    pub fn unit(self) -> &'static str {
        match self {
            Self::AvgHeartRate => "bpm",
            Self::TotalDistance => "km",
            Self::TotalDuration => "min",
            Self::RunCount => "runs",
            Self::AvgPaceMinPerKm => "min/km",
        }
    }
}

/// Computes one statistic by wire field name.
pub fn calculate_stats(
    workouts: &[Value],
    start_date: &str,
    end_date: &str,
    field: &str,
) -> Option<f64> {
    compute_stat(workouts, start_date, end_date, StatField::parse(field)?)
}

/// Computes one statistic over completed runs within `[start_date, end_date]`.
pub fn compute_stat(
    workouts: &[Value],
    start_date: &str,
    end_date: &str,
    field: StatField,
) -> Option<f64> {
    let runs = filter_completed_runs(workouts, start_date, end_date);
    if runs.is_empty() {
        return None;
    }

    match field {
        StatField::RunCount => Some(runs.len() as f64),
        StatField::TotalDistance => {
            let total: f64 = runs.iter().map(|run| number_or_zero(run, "runDistance")).sum();
            (total > 0.0).then(|| round_to(total, 2))
        }
        StatField::TotalDuration => {
            let total: f64 = runs.iter().map(|run| number_or_zero(run, "runDuration")).sum();
            (total > 0.0).then(|| round_to(total, 1))
        }
        StatField::AvgHeartRate => {
            let rates: Vec<f64> = runs
                .iter()
                .map(|run| number_or_zero(run, "runHeartRate"))
                .filter(|bpm| *bpm > 0.0)
                .collect();
            mean(&rates).map(|avg| round_to(avg, 1))
        }
        StatField::AvgPaceMinPerKm => {
            let paces: Vec<f64> = runs.iter().filter_map(|run| run_pace(run)).collect();
            mean(&paces).map(|avg| round_to(avg, 2))
        }
    }
}

/// Keeps `type == "run"` and `status == "completed"` records dated inside the
/// inclusive range. The date comes from `date`, falling back to `dateStr`.
pub fn filter_completed_runs<'a>(
    workouts: &'a [Value],
    start_date: &str,
    end_date: &str,
) -> Vec<&'a Map<String, Value>> {
    workouts
        .iter()
        .filter_map(Value::as_object)
        .filter(|run| run.get("type").and_then(Value::as_str) == Some("run"))
        .filter(|run| run.get("status").and_then(Value::as_str) == Some("completed"))
        .filter(|run| {
            first_truthy_str(run, &["date", "dateStr"])
                .is_some_and(|date| start_date <= date && date <= end_date)
        })
        .collect()
}

/// Minutes per kilometer for one run: computed ratio first, textual pace second.
fn run_pace(run: &Map<String, Value>) -> Option<f64> {
    let distance = number_or_zero(run, "runDistance");
    let duration = number_or_zero(run, "runDuration");
    if distance > 0.0 && duration > 0.0 {
        return Some(duration / distance);
    }

    first_truthy_str(run, &["runPace"]).and_then(parse_pace_text)
}

fn number_or_zero(run: &Map<String, Value>, key: &str) -> f64 {
    run.get(key).and_then(parse_float_tolerant).unwrap_or(0.0)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Rounds to `places` decimals; exact halves go to the even neighbour.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}
