//! Temp-write-then-rename discipline (spec §4.6, §5).
//!
//! Every write: create parent directories, write a uniquely-named sibling
//! temp file, `fsync`, then `rename` onto the final path. A reader never
//! observes a partially-written file, because a rename is atomic on the
//! same filesystem and every temp file lives next to its target.

use std::fs;
use std::io::Write;
use std::path::Path;

use common::PoolError;

/// Writes `bytes` to `path` atomically. If `path` already exists this is a
/// no-op: the layout is content-addressed, so an existing file already
/// holds the same logical bytes (spec §4.6 permits skip-or-overwrite for
/// idempotent writes; skipping avoids needless fsyncs on repeat stores).
pub fn write_if_absent(path: &Path, bytes: &[u8]) -> Result<(), PoolError> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| PoolError::IntegrityFailure(format!("path has no parent: {}", path.display())))?;
    fs::create_dir_all(parent)?;

    let tmp_name = format!(".tmp-{}", uuid::Uuid::new_v4());
    let tmp_path = parent.join(tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e.into())
        }
    }
}

/// Memory-maps `path` and deserializes it as JSON.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PoolError> {
    let file = fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PoolError::NotFound(path.display().to_string())
        } else {
            PoolError::IoError(e)
        }
    })?;
    // SAFETY: the file is treated as read-only input for the lifetime of
    // the mapping; nothing else in this process truncates pool files.
    let mapping = unsafe { memmap2::Mmap::map(&file)? };
    serde_json::from_slice(&mapping).map_err(|e| PoolError::SchemaMismatch(e.to_string()))
}
