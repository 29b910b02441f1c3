//! Backend trait for filesystem operations

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

/// Abstraction over filesystem operations used by the disk cache
///
/// Errors are plain `std::io::Error`s so callers can tell `NotFound` apart from
/// real failures and pass the latter through unchanged.
#[async_trait]
pub trait DiskBackend: Send + Sync {
    /// Read entire file contents
    async fn read_file(&self, path: &Path) -> std::io::Result<Bytes>;

    /// Read at most `limit` bytes from the start of the file
    async fn read_head(&self, path: &Path, limit: usize) -> std::io::Result<Bytes>;

    /// Create or truncate the file and write `data` in place
    ///
    /// No temp file or rename: callers hold the entry's exclusive lock for the
    /// whole write instead.
    async fn write_file(&self, path: &Path, data: Bytes) -> std::io::Result<()>;

    /// Delete a file, returning false if it did not exist
    async fn delete_file(&self, path: &Path) -> std::io::Result<bool>;

    /// Create directory and all parent directories
    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// Remove a directory and everything in it; a missing directory is not an error
    async fn remove_dir_all(&self, path: &Path) -> std::io::Result<()>;

    /// List regular files directly inside `dir` whose extension is `extension`
    async fn list_files(&self, dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>>;
}
