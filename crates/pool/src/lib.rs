//! # Pool: the public core interface
//!
//! Composes [`sigil`] (parse), [`forge`] (normalize/hash/denormalize), and
//! [`vault`] (storage) into the operations spec.md §4.9 exposes to
//! clients: `store`, `has_function`, `load_object`, `list_languages`,
//! `list_overlays`, `load_overlay`, `add_overlay`, `denormalize`,
//! `validate`, `parse_locator`. Nothing downstream of this crate (a CLI,
//! a remote-sync client, a search index) needs to know the CAS layout or
//! the normalization algorithm — this is the seam between them.

pub mod locator;

use std::collections::BTreeMap;
use std::path::PathBuf;

use common::{validate, Metadata, ObjectRecord, OverlayFields, PoolError};
use sigil::UnitParser;
use vault::Vault;

pub use locator::{parse_locator, Locator};

/// Spec §3 `PoolFunction`, renamed from the storage envelope's field names
/// to the spec's own vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolFunction {
    pub function_hash: String,
    pub canonical_code: String,
    pub metadata: Metadata,
}

impl From<ObjectRecord> for PoolFunction {
    fn from(record: ObjectRecord) -> Self {
        Self {
            function_hash: record.hash,
            canonical_code: record.normalized_code,
            metadata: record.metadata,
        }
    }
}

/// Spec §3 `LanguageOverlay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageOverlay {
    pub overlay_hash: String,
    pub docstring: String,
    pub name_mapping: BTreeMap<String, String>,
    pub alias_mapping: BTreeMap<String, String>,
    pub comment: String,
}

impl LanguageOverlay {
    fn from_fields(overlay_hash: String, fields: OverlayFields) -> Self {
        Self {
            overlay_hash,
            docstring: fields.docstring,
            name_mapping: fields.name_mapping,
            alias_mapping: fields.alias_mapping,
            comment: fields.comment,
        }
    }

    fn to_fields(&self) -> OverlayFields {
        OverlayFields {
            docstring: self.docstring.clone(),
            name_mapping: self.name_mapping.clone(),
            alias_mapping: self.alias_mapping.clone(),
            comment: self.comment.clone(),
        }
    }
}

pub struct Pool {
    vault: Vault,
}

impl Pool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { vault: Vault::new(root) }
    }

    pub fn root(&self) -> &std::path::Path {
        self.vault.root()
    }

    /// Parses, normalizes, hashes, and stores `source_text` under
    /// `language_tag` with the given overlay `comment`. No author is
    /// threaded through spec.md §4.9's three-argument signature, so
    /// `Metadata::author` defaults to empty — see DESIGN.md.
    pub fn store(
        &self,
        source_text: &str,
        language_tag: &str,
        comment: &str,
    ) -> Result<(String, String), PoolError> {
        validate::require_language_tag(language_tag)?;

        let mut parser = UnitParser::new()?;
        let module = parser.parse_unit(source_text)?;
        let normalized = forge::normalize(&module);
        let function_hash = forge::function_hash(&normalized.canonical_code);

        if !self.vault.has_function(&function_hash) {
            let record = ObjectRecord {
                schema_version: common::SCHEMA_VERSION,
                hash: function_hash.clone(),
                normalized_code: normalized.canonical_code.clone(),
                metadata: Metadata::new(""),
            };
            self.vault.write_object(&record)?;
        }

        let overlay_fields = OverlayFields {
            docstring: normalized.docstring,
            name_mapping: normalized.reverse,
            alias_mapping: normalized.alias_mapping,
            comment: comment.to_string(),
        };
        let overlay_hash = forge::overlay_hash(&overlay_fields)?;
        self.vault
            .write_overlay(&function_hash, language_tag, &overlay_hash, &overlay_fields)?;

        Ok((function_hash, overlay_hash))
    }

    pub fn has_function(&self, function_hash: &str) -> bool {
        self.vault.has_function(function_hash)
    }

    pub fn load_object(&self, function_hash: &str) -> Result<PoolFunction, PoolError> {
        self.vault.read_object(function_hash).map(Into::into)
    }

    pub fn list_languages(&self, function_hash: &str) -> Result<std::collections::HashSet<String>, PoolError> {
        self.vault.list_languages(function_hash)
    }

    pub fn list_overlays(
        &self,
        function_hash: &str,
        language_tag: &str,
    ) -> Result<Vec<(String, String)>, PoolError> {
        self.vault.list_overlays(function_hash, language_tag)
    }

    pub fn load_overlay(
        &self,
        function_hash: &str,
        language_tag: &str,
        overlay_hash: Option<&str>,
    ) -> Result<LanguageOverlay, PoolError> {
        match overlay_hash {
            Some(m) => {
                let fields = self.vault.read_overlay(function_hash, language_tag, m)?;
                Ok(LanguageOverlay::from_fields(m.to_string(), fields))
            }
            None => {
                let mut candidates = self.vault.list_overlays(function_hash, language_tag)?;
                match candidates.len() {
                    0 => Err(PoolError::NotFound(format!(
                        "no overlays for {function_hash}@{language_tag}"
                    ))),
                    1 => {
                        let (m, _) = candidates.remove(0);
                        let fields = self.vault.read_overlay(function_hash, language_tag, &m)?;
                        Ok(LanguageOverlay::from_fields(m, fields))
                    }
                    _ => Err(PoolError::AmbiguousOverlay(candidates)),
                }
            }
        }
    }

    pub fn add_overlay(
        &self,
        function_hash: &str,
        language_tag: &str,
        docstring: &str,
        name_mapping: BTreeMap<String, String>,
        alias_mapping: BTreeMap<String, String>,
        comment: &str,
    ) -> Result<String, PoolError> {
        if !self.vault.has_function(function_hash) {
            return Err(PoolError::NotFound(function_hash.to_string()));
        }
        validate::require_language_tag(language_tag)?;

        let overlay = LanguageOverlay {
            overlay_hash: String::new(),
            docstring: docstring.to_string(),
            name_mapping,
            alias_mapping,
            comment: comment.to_string(),
        };
        let fields = overlay.to_fields();
        let overlay_hash = forge::overlay_hash(&fields)?;
        self.vault
            .write_overlay(function_hash, language_tag, &overlay_hash, &fields)?;
        Ok(overlay_hash)
    }

    /// Composes `load_object`, `load_overlay`, and spec §4.7's denormalizer.
    pub fn denormalize(
        &self,
        function_hash: &str,
        language_tag: &str,
        overlay_hash: Option<&str>,
    ) -> Result<String, PoolError> {
        let object = self.load_object(function_hash)?;
        let overlay = self.load_overlay(function_hash, language_tag, overlay_hash)?;
        forge::denormalize(
            &object.canonical_code,
            &overlay.name_mapping,
            &overlay.alias_mapping,
            &overlay.docstring,
        )
    }

    /// Re-hashes `object.json` and every `mapping.json` under every
    /// language directory, returning every mismatch found (spec §4.8,
    /// Scenario F). `Ok(())` means everything re-hashes cleanly.
    pub fn validate(&self, function_hash: &str) -> Result<(), Vec<PoolError>> {
        validate::require_hash(function_hash).map_err(|e| vec![e])?;

        let mut errors = Vec::new();

        match self.vault.read_object(function_hash) {
            Ok(record) => {
                if record.schema_version != common::SCHEMA_VERSION {
                    errors.push(PoolError::SchemaMismatch(format!(
                        "object schema_version {} != {}",
                        record.schema_version,
                        common::SCHEMA_VERSION
                    )));
                }
                if record.hash != function_hash {
                    errors.push(PoolError::IntegrityFailure(format!(
                        "object.json hash field {} does not match directory {function_hash}",
                        record.hash
                    )));
                }
                let rehashed = forge::function_hash(&record.normalized_code);
                if rehashed != function_hash {
                    errors.push(PoolError::IntegrityFailure(format!(
                        "normalized_code rehashes to {rehashed}, expected {function_hash}"
                    )));
                }
            }
            Err(e) => errors.push(e),
        }

        if let Ok(langs) = self.vault.list_languages(function_hash) {
            for lang in langs {
                let Ok(overlays) = self.vault.list_overlays(function_hash, &lang) else {
                    continue;
                };
                for (overlay_hash, _comment) in overlays {
                    match self.vault.read_overlay(function_hash, &lang, &overlay_hash) {
                        Ok(fields) => match forge::overlay_hash(&fields) {
                            Ok(rehashed) if rehashed != overlay_hash => {
                                errors.push(PoolError::IntegrityFailure(format!(
                                    "overlay {lang}/{overlay_hash} rehashes to {rehashed}"
                                )));
                            }
                            Ok(_) => {}
                            Err(e) => errors.push(e),
                        },
                        Err(e) => errors.push(e),
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
