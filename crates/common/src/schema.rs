//! On-disk JSON shapes. `ObjectRecord` is `object.json`; `OverlayFields`
//! is the four-field value whose canonical JSON is `mapping.json`'s hash
//! preimage (see spec §6.1).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Metadata;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectRecord {
    pub schema_version: u32,
    pub hash: String,
    pub normalized_code: String,
    pub metadata: Metadata,
}

/// The hashed content of a language overlay. `BTreeMap` keeps
/// `name_mapping`/`alias_mapping` in sorted key order on their own, which
/// matters because [`crate::canonical::canonical_json`] sorts top-level
/// keys but a nested map still needs to arrive pre-sorted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OverlayFields {
    pub docstring: String,
    pub name_mapping: BTreeMap<String, String>,
    pub alias_mapping: BTreeMap<String, String>,
    pub comment: String,
}
