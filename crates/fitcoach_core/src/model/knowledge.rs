//! Knowledge-base entry model.
//!
//! Embeddings are produced by a downstream pipeline and are not part of this
//! record.

use super::{null_as_default, short_hex_id, RawPayload};
use serde::{Deserialize, Serialize};

pub const DEFAULT_KNOWLEDGE_TYPE: &str = "note";

/// Canonical knowledge-base record with HTML-free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type", default = "default_knowledge_type")]
    pub kind: String,
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: RawPayload,
}

impl KnowledgeRecord {
    /// Builds an id of the form `kb_<12 hex>`.
    pub fn generate_id() -> String {
        format!("kb_{}", short_hex_id())
    }
}

fn default_knowledge_type() -> String {
    DEFAULT_KNOWLEDGE_TYPE.to_string()
}
