//! `object.json` metadata block. Never part of `function_hash`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata carried alongside a `PoolFunction`'s canonical code.
///
/// Excluded from hashing by construction: `forge::hash_function` only ever
/// sees `normalized_code`, never this struct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    pub created: DateTime<Utc>,
    pub author: String,
}

impl Metadata {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            created: Utc::now(),
            author: author.into(),
        }
    }
}
