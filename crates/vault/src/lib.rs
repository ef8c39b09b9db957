//! # Vault: content-addressed storage layer
//!
//! Owns the on-disk CAS layout (spec §4.6): two-level hash fan-out under a
//! storage root, atomic temp-write-then-rename for every file, and
//! directory-walk based listing. Nothing in this crate knows how a
//! `normalized_code` string or an overlay's four fields were produced —
//! that's `forge`'s job. This crate only persists and retrieves the bytes
//! `forge` and `common` agree on.

pub mod atomic;
pub mod paths;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use common::{validate, ObjectRecord, OverlayFields, PoolError};

/// A single pool storage root. Cheap to construct and clone-by-reference;
/// every method takes `&self` since the core contract (spec §5) forbids
/// in-process locking across calls.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_function(&self, hash: &str) -> bool {
        paths::object_path(&self.root, hash).is_file()
    }

    pub fn has_language(&self, hash: &str, lang: &str) -> bool {
        let dir = paths::language_dir(&self.root, hash, lang);
        dir.is_dir() && fs::read_dir(&dir).map(|mut d| d.next().is_some()).unwrap_or(false)
    }

    pub fn write_object(&self, record: &ObjectRecord) -> Result<(), PoolError> {
        validate::require_hash(&record.hash)?;
        let path = paths::object_path(&self.root, &record.hash);
        let bytes = serde_json::to_vec_pretty(record)
            .map_err(|e| PoolError::SchemaMismatch(e.to_string()))?;
        atomic::write_if_absent(&path, &bytes)
    }

    pub fn read_object(&self, hash: &str) -> Result<ObjectRecord, PoolError> {
        validate::require_hash(hash)?;
        atomic::read_json(&paths::object_path(&self.root, hash))
    }

    pub fn write_overlay(
        &self,
        hash: &str,
        lang: &str,
        overlay_hash: &str,
        fields: &OverlayFields,
    ) -> Result<(), PoolError> {
        validate::require_hash(hash)?;
        validate::require_hash(overlay_hash)?;
        validate::require_language_tag(lang)?;
        let path = paths::overlay_path(&self.root, hash, lang, overlay_hash);
        let bytes = serde_json::to_vec_pretty(fields)
            .map_err(|e| PoolError::SchemaMismatch(e.to_string()))?;
        atomic::write_if_absent(&path, &bytes)
    }

    pub fn read_overlay(
        &self,
        hash: &str,
        lang: &str,
        overlay_hash: &str,
    ) -> Result<OverlayFields, PoolError> {
        validate::require_hash(hash)?;
        validate::require_hash(overlay_hash)?;
        validate::require_language_tag(lang)?;
        atomic::read_json(&paths::overlay_path(&self.root, hash, lang, overlay_hash))
    }

    /// Every language-tag subdirectory directly under the function's
    /// directory that is present and non-empty.
    pub fn list_languages(&self, hash: &str) -> Result<HashSet<String>, PoolError> {
        validate::require_hash(hash)?;
        let function_dir = paths::function_dir(&self.root, hash);
        if !function_dir.is_dir() {
            return Err(PoolError::NotFound(hash.to_string()));
        }
        let mut langs = HashSet::new();
        for entry in fs::read_dir(&function_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.has_language(hash, &name) {
                langs.insert(name);
            }
        }
        Ok(langs)
    }

    /// Enumerates the two-level overlay directories under a language,
    /// reconstructing each `overlay_hash` from its directory path rather
    /// than recomputing it from content (spec §4.6).
    pub fn list_overlays(&self, hash: &str, lang: &str) -> Result<Vec<(String, String)>, PoolError> {
        validate::require_hash(hash)?;
        validate::require_language_tag(lang)?;
        let lang_dir = paths::language_dir(&self.root, hash, lang);
        if !lang_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        for prefix_entry in fs::read_dir(&lang_dir)? {
            let prefix_entry = prefix_entry?;
            if !prefix_entry.file_type()?.is_dir() {
                continue;
            }
            let prefix = prefix_entry.file_name().to_string_lossy().into_owned();

            for suffix_entry in fs::read_dir(prefix_entry.path())? {
                let suffix_entry = suffix_entry?;
                if !suffix_entry.file_type()?.is_dir() {
                    continue;
                }
                let suffix = suffix_entry.file_name().to_string_lossy().into_owned();
                let overlay_hash = paths::overlay_hash_from_dirs(&prefix, &suffix);

                let mapping_path = suffix_entry.path().join("mapping.json");
                if !mapping_path.is_file() {
                    continue;
                }
                let fields: OverlayFields = atomic::read_json(&mapping_path)?;
                out.push((overlay_hash, fields.comment));
            }
        }
        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Metadata;

    fn sample_hash(byte: u8) -> String {
        format!("{byte:02x}").repeat(32)
    }

    #[test]
    fn write_then_read_object_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        let hash = sample_hash(0xab);
        let record = ObjectRecord {
            schema_version: 1,
            hash: hash.clone(),
            normalized_code: "def _bb_v_0():\n    pass\n".to_string(),
            metadata: Metadata::new("tester"),
        };
        assert!(!vault.has_function(&hash));
        vault.write_object(&record).unwrap();
        assert!(vault.has_function(&hash));
        let loaded = vault.read_object(&hash).unwrap();
        assert_eq!(loaded.normalized_code, record.normalized_code);
    }

    #[test]
    fn missing_function_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        let err = vault.read_object(&sample_hash(0x01)).unwrap_err();
        assert!(matches!(err, PoolError::NotFound(_)));
    }

    #[test]
    fn list_overlays_is_empty_for_absent_language() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        let hash = sample_hash(0x02);
        assert_eq!(vault.list_overlays(&hash, "eng").unwrap(), Vec::new());
        assert!(!vault.has_language(&hash, "eng"));
    }

    #[test]
    fn write_then_list_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        let hash = sample_hash(0x03);
        let overlay_hash = sample_hash(0x04);
        let fields = OverlayFields {
            docstring: "Adds two numbers".to_string(),
            name_mapping: Default::default(),
            alias_mapping: Default::default(),
            comment: "formal".to_string(),
        };
        vault.write_overlay(&hash, "eng", &overlay_hash, &fields).unwrap();
        assert!(vault.has_language(&hash, "eng"));
        let overlays = vault.list_overlays(&hash, "eng").unwrap();
        assert_eq!(overlays, vec![(overlay_hash.clone(), "formal".to_string())]);
        let loaded = vault.read_overlay(&hash, "eng", &overlay_hash).unwrap();
        assert_eq!(loaded.docstring, "Adds two numbers");
    }

    #[test]
    fn repeat_write_is_idempotent_noop() {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::new(dir.path());
        let hash = sample_hash(0x05);
        let record = ObjectRecord {
            schema_version: 1,
            hash: hash.clone(),
            normalized_code: "def _bb_v_0():\n    pass\n".to_string(),
            metadata: Metadata::new("a"),
        };
        vault.write_object(&record).unwrap();
        let stored_first = vault.read_object(&hash).unwrap();

        let record_again = ObjectRecord {
            metadata: Metadata::new("b"),
            ..record
        };
        vault.write_object(&record_again).unwrap();
        let stored_second = vault.read_object(&hash).unwrap();
        assert_eq!(stored_first.metadata.author, stored_second.metadata.author);
    }
}
