//! Tolerant numeric and pace parsing for exported values.
//!
//! # Invariants
//! - Parsing never fails loudly; `None` means "no usable value".
//! - A hyphen past index 0 marks a range and only the lower bound is read.
//! - Non-finite results (`inf`, `NaN`) are treated as unusable.

use serde_json::{Map, Value};

const UNIT_MARKERS: &[&str] = &["bpm", "BPM", "km", "min", " "];

/// Parses a JSON value into a float the way exported data is usually written.
///
/// Numbers are taken as-is; strings go through [`parse_numeric_text`]. Every
/// other JSON type has no usable value.
pub fn parse_float_tolerant(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|v| v.is_finite()),
        Value::String(text) => parse_numeric_text(text),
        _ => None,
    }
}

/// Parses free text such as `"140-150 bpm"`, `"5 km"` or `"30min"`.
pub fn parse_numeric_text(text: &str) -> Option<f64> {
    let mut trimmed = text.trim();
    if let Some(hyphen) = trimmed.find('-') {
        if hyphen > 0 {
            trimmed = trimmed[..hyphen].trim();
        }
    }

    let cleaned = UNIT_MARKERS
        .iter()
        .fold(trimmed.to_string(), |acc, marker| acc.replace(marker, ""));
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a textual pace like `5:30`, `5:30/km` or `5:30"` into minutes.
pub fn parse_pace_text(pace: &str) -> Option<f64> {
    if !pace.contains(':') {
        return None;
    }

    let cleaned = pace.replace("/km", "").replace('"', "");
    let mut parts = cleaned.split(':');
    let minutes = parts.next()?.trim().parse::<f64>().ok()?;
    let seconds = parts.next()?.trim().parse::<f64>().ok()?;
    let pace = minutes + seconds / 60.0;
    pace.is_finite().then_some(pace)
}

/// Mirrors loose truthiness of exported JSON: null, `false`, `0`, `""`,
/// `[]` and `{}` count as absent.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |v| v != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Returns the first truthy value among alternate field names.
pub(crate) fn first_truthy<'a>(raw: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| is_truthy(value))
}

/// Returns the first truthy string among alternate field names.
pub(crate) fn first_truthy_str<'a>(raw: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    first_truthy(raw, keys).and_then(Value::as_str)
}
