//! Normalized record shapes shared by transform, load and stats.
//!
//! # Responsibility
//! - Define canonical workout and knowledge records as persisted in the store.
//! - Keep serialized field names identical to the store column names.
//!
//! # Invariants
//! - Workout distance/duration are always canonical units (meters, seconds).
//! - Every record references exactly one user id.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub mod knowledge;
pub mod workout;

/// Open key-value bag for fields the transformer does not map.
pub type RawPayload = serde_json::Map<String, serde_json::Value>;

/// Returns the first 12 hex characters of a fresh v4 uuid.
pub(crate) fn short_hex_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}

/// Treats an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
