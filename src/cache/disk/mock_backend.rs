//! Mock disk backend for testing (in-memory HashMap storage)

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::backend::DiskBackend;

/// Mock backend that stores files in memory for testing
#[derive(Clone, Default)]
pub struct MockDiskBackend {
    files: Arc<RwLock<HashMap<PathBuf, Bytes>>>,
    reads: Arc<RwLock<HashMap<PathBuf, usize>>>,
    bytes_read: Arc<RwLock<HashMap<PathBuf, usize>>>,
    /// Simulate errors if true
    simulate_storage_full: Arc<RwLock<bool>>,
    simulate_permission_denied: Arc<RwLock<bool>>,
    /// Paths whose deletion fails with PermissionDenied
    undeletable: Arc<RwLock<HashSet<PathBuf>>>,
    read_delay: Arc<RwLock<Option<Duration>>>,
}

impl MockDiskBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable storage full simulation for writes
    pub fn set_storage_full(&self, enabled: bool) {
        *self.simulate_storage_full.write() = enabled;
    }

    /// Enable permission denied simulation for every operation
    pub fn set_permission_denied(&self, enabled: bool) {
        *self.simulate_permission_denied.write() = enabled;
    }

    /// Make deletion of one path fail
    pub fn fail_delete_for(&self, path: &Path) {
        self.undeletable.write().insert(path.to_path_buf());
    }

    /// Sleep before every read, to keep operations in flight
    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.write() = Some(delay);
    }

    /// Store raw bytes, bypassing the cache
    pub fn insert_raw(&self, path: &Path, data: Bytes) {
        self.files.write().insert(path.to_path_buf(), data);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    /// Get number of stored files
    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    /// How many times `path` has been read, whole or head only
    pub fn read_count(&self, path: &Path) -> usize {
        self.reads.read().get(path).copied().unwrap_or(0)
    }

    /// Total bytes handed out for `path` across all reads
    pub fn bytes_read(&self, path: &Path) -> usize {
        self.bytes_read.read().get(path).copied().unwrap_or(0)
    }

    async fn read_prefix(&self, path: &Path, limit: usize) -> std::io::Result<Bytes> {
        self.check_permission()?;
        *self.reads.write().entry(path.to_path_buf()).or_insert(0) += 1;

        let delay = *self.read_delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let data = self
            .files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::NotFound, "File not found"))?;
        let data = data.slice(..limit.min(data.len()));
        *self.bytes_read.write().entry(path.to_path_buf()).or_insert(0) += data.len();
        Ok(data)
    }

    fn check_permission(&self) -> std::io::Result<()> {
        if *self.simulate_permission_denied.read() {
            return Err(Error::new(
                ErrorKind::PermissionDenied,
                "Simulated permission denied",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DiskBackend for MockDiskBackend {
    async fn read_file(&self, path: &Path) -> std::io::Result<Bytes> {
        self.read_prefix(path, usize::MAX).await
    }

    async fn read_head(&self, path: &Path, limit: usize) -> std::io::Result<Bytes> {
        self.read_prefix(path, limit).await
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> std::io::Result<()> {
        if *self.simulate_storage_full.read() {
            return Err(Error::new(ErrorKind::Other, "No space left on device"));
        }
        self.check_permission()?;

        self.files.write().insert(path.to_path_buf(), data);
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> std::io::Result<bool> {
        self.check_permission()?;
        if self.undeletable.read().contains(path) {
            return Err(Error::new(
                ErrorKind::PermissionDenied,
                "Simulated undeletable file",
            ));
        }

        Ok(self.files.write().remove(path).is_some())
    }

    async fn create_dir_all(&self, _path: &Path) -> std::io::Result<()> {
        self.check_permission()
    }

    async fn remove_dir_all(&self, path: &Path) -> std::io::Result<()> {
        self.check_permission()?;
        self.files.write().retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    async fn list_files(&self, dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
        self.check_permission()?;

        let files = self.files.read();
        let entries: Vec<PathBuf> = files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
            .cloned()
            .collect();

        Ok(entries)
    }
}
