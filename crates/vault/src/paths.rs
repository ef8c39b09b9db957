//! Spec §4.6 directory layout: two-level hash fan-out under a storage root.
//!
//! ```text
//! <root>/pool/<h[0:2]>/<h[2:]>/object.json
//! <root>/pool/<h[0:2]>/<h[2:]>/<lang>/<m[0:2]>/<m[2:]>/mapping.json
//! ```

use std::path::{Path, PathBuf};

/// `<root>/pool/<h[0:2]>/<h[2:]>/`. Callers are expected to have already
/// validated `hash` with [`common::validate::require_hash`].
pub fn function_dir(root: &Path, hash: &str) -> PathBuf {
    root.join("pool").join(&hash[0..2]).join(&hash[2..])
}

pub fn object_path(root: &Path, hash: &str) -> PathBuf {
    function_dir(root, hash).join("object.json")
}

pub fn language_dir(root: &Path, hash: &str, lang: &str) -> PathBuf {
    function_dir(root, hash).join(lang)
}

pub fn overlay_dir(root: &Path, hash: &str, lang: &str, overlay_hash: &str) -> PathBuf {
    language_dir(root, hash, lang)
        .join(&overlay_hash[0..2])
        .join(&overlay_hash[2..])
}

pub fn overlay_path(root: &Path, hash: &str, lang: &str, overlay_hash: &str) -> PathBuf {
    overlay_dir(root, hash, lang, overlay_hash).join("mapping.json")
}

/// Reconstructs an overlay hash from its two-level directory name pair, as
/// spec §4.6 requires for listing ("reconstructed from the directory path,
/// not recomputed from content").
pub fn overlay_hash_from_dirs(prefix: &str, suffix: &str) -> String {
    format!("{prefix}{suffix}")
}
