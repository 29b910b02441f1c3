//! Utility functions for disk cache

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::types::StorageMode;

/// Convert a cache key to a SHA256 hex digest for use as a filename
pub fn key_to_hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate the entry file path for a key
pub fn entry_path(cache_dir: &Path, key: &str, mode: StorageMode) -> PathBuf {
    cache_dir.join(format!("{}.{}", key_to_hash(key), mode.extension()))
}

/// Lock identifier for an entry file, shared by foreground calls and sweeps
pub fn lock_id(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
