//! Main DiskCache implementation

use bytes::Bytes;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Semaphore;

use super::backend::DiskBackend;
use super::codec::{EntryCodec, HEADER_READ_LIMIT};
use super::janitor::Janitor;
use super::tokio_backend::TokioFsBackend;
use super::types::{is_expired, unix_now, Expiry, StorageMode, SweepReport};
use super::utils::{entry_path, lock_id};
use crate::cache::config::CacheConfig;
use crate::cache::error::CacheError;
use crate::cache::lock::KeyLockRegistry;
use crate::cache::payload::{MessagePackCodec, PayloadCodec};
use crate::cache::stats::{CacheStats, CacheStatsTracker};

/// State shared between the public handle and the janitor task
pub(super) struct CacheInner {
    directory: PathBuf,
    codec: EntryCodec,
    backend: Arc<dyn DiskBackend>,
    locks: KeyLockRegistry,
    /// Single permit: at most one sweep in flight
    sweep_permit: Semaphore,
    stats: CacheStatsTracker,
}

impl CacheInner {
    /// Remove every expired entry file, unless a sweep is already running
    ///
    /// Returns None when skipped. Per-file failures are logged and counted; they
    /// never stop the sweep.
    pub(super) async fn delete_expired(&self) -> Option<SweepReport> {
        let _permit = match self.sweep_permit.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                self.stats.increment_sweeps_skipped();
                tracing::debug!(
                    directory = %self.directory.display(),
                    "Sweep already in progress, skipping"
                );
                return None;
            }
        };

        let extension = self.codec.mode().extension();
        let mut report = SweepReport::default();

        let files = match self.backend.list_files(&self.directory, extension).await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(
                    directory = %self.directory.display(),
                    error = %e,
                    "Failed to list cache directory"
                );
                self.stats.record_sweep(0);
                return Some(report);
            }
        };
        report.scanned = files.len();

        for path in files {
            match self.sweep_file(&path).await {
                Ok(true) => report.removed += 1,
                Ok(false) => {}
                Err(e) if e.is_corrupt() => {
                    report.corrupt += 1;
                    self.stats.increment_corrupt();
                    tracing::warn!(path = %path.display(), error = %e, "Skipping corrupt entry");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(path = %path.display(), error = %e, "Failed to sweep entry");
                }
            }
        }

        self.stats.record_sweep(report.removed as u64);
        tracing::info!(
            scanned = report.scanned,
            removed = report.removed,
            corrupt = report.corrupt,
            failed = report.failed,
            "Expired entry sweep finished"
        );
        Some(report)
    }

    /// Check and remove one file under its exclusive lock; true if removed
    async fn sweep_file(&self, path: &Path) -> Result<bool, CacheError> {
        let _guard = self.locks.write(&lock_id(path)).await;

        let head = match self.backend.read_head(path, HEADER_READ_LIMIT).await {
            Ok(head) => head,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let expires_at = self.codec.read_expiry(&head)?;
        if !is_expired(expires_at, unix_now()) {
            return Ok(false);
        }

        let removed = self.backend.delete_file(path).await?;
        if removed {
            tracing::debug!(path = %path.display(), expires_at, "Removed expired entry");
        }
        Ok(removed)
    }
}

/// File-backed cache: one file per key under a base directory
///
/// Operations on different keys run in parallel; operations on the same key are
/// serialized by a per-file read/write lock. With a nonzero cleanup interval a
/// background janitor periodically deletes expired files. Call [`close`](Self::close)
/// to stop it deterministically; dropping the cache only signals it.
pub struct DiskCache {
    inner: Arc<CacheInner>,
    janitor: Mutex<Option<Janitor>>,
}

impl DiskCache {
    /// Open (creating if needed) a cache on the local filesystem
    pub async fn new(config: CacheConfig) -> Result<Self, CacheError> {
        Self::with_backend(config, Arc::new(TokioFsBackend::new())).await
    }

    pub async fn with_backend(
        config: CacheConfig,
        backend: Arc<dyn DiskBackend>,
    ) -> Result<Self, CacheError> {
        config.validate().map_err(CacheError::Configuration)?;
        backend.create_dir_all(&config.directory).await?;

        let mode = StorageMode::from_compression(config.use_compression);
        let inner = Arc::new(CacheInner {
            directory: config.directory.clone(),
            codec: EntryCodec::new(mode, config.compression_level),
            backend,
            locks: KeyLockRegistry::new(),
            sweep_permit: Semaphore::new(1),
            stats: CacheStatsTracker::new(),
        });

        let janitor = config
            .cleanup_interval()
            .map(|interval| Janitor::start(Arc::clone(&inner), interval));

        tracing::info!(
            directory = %config.directory.display(),
            compression = config.use_compression,
            cleanup_interval_ms = config.cleanup_interval_ms,
            "Disk cache opened"
        );

        Ok(Self {
            inner,
            janitor: Mutex::new(janitor),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.inner.directory
    }

    pub fn mode(&self) -> StorageMode {
        self.inner.codec.mode()
    }

    pub fn is_compressed(&self) -> bool {
        self.mode() == StorageMode::Compressed
    }

    /// Path of the file that stores `key`
    pub fn entry_path(&self, key: &str) -> PathBuf {
        entry_path(&self.inner.directory, key, self.mode())
    }

    /// Store `payload` under `key`, replacing any existing entry
    ///
    /// `expiry` is either a TTL (`Duration`) or an absolute `SystemTime`/[`Expiry::At`].
    /// I/O failures are returned unchanged; nothing is retried.
    pub async fn set(
        &self,
        key: &str,
        payload: impl AsRef<[u8]>,
        expiry: impl Into<Expiry>,
    ) -> Result<(), CacheError> {
        let expires_at = expiry.into().resolve(SystemTime::now());
        let encoded = self.inner.codec.encode(expires_at, payload.as_ref())?;
        let path = self.entry_path(key);

        let _guard = self.inner.locks.write(&lock_id(&path)).await;
        self.inner
            .backend
            .write_file(&path, Bytes::from(encoded))
            .await?;

        self.inner.stats.increment_writes();
        tracing::debug!(key, expires_at, path = %path.display(), "Cache entry written");
        Ok(())
    }

    /// Read the payload stored under `key`
    ///
    /// Fails with `KeyNotFound` if there is no file, `KeyExpired` if the entry's
    /// expiry is at or before now (even if the janitor has not removed it yet),
    /// and `CorruptEntry` if the file cannot be decoded.
    pub async fn get(&self, key: &str) -> Result<Bytes, CacheError> {
        let path = self.entry_path(key);

        let data = {
            let _guard = self.inner.locks.read(&lock_id(&path)).await;
            match self.inner.backend.read_file(&path).await {
                Ok(data) => data,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    self.inner.stats.increment_misses();
                    return Err(CacheError::KeyNotFound);
                }
                Err(e) => return Err(e.into()),
            }
        };

        match self.inner.codec.decode(data, unix_now()) {
            Ok(payload) => {
                self.inner.stats.increment_hits();
                Ok(payload)
            }
            Err(e) => {
                if e.is_expired() {
                    self.inner.stats.increment_expired();
                } else if e.is_corrupt() {
                    self.inner.stats.increment_corrupt();
                    tracing::warn!(key, path = %path.display(), error = %e, "Corrupt cache entry");
                }
                Err(e)
            }
        }
    }

    /// Remove the entry for `key`; returns false if there was none
    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let path = self.entry_path(key);

        let _guard = self.inner.locks.write(&lock_id(&path)).await;
        let removed = self.inner.backend.delete_file(&path).await?;
        if removed {
            self.inner.stats.increment_deletes();
            tracing::debug!(key, path = %path.display(), "Cache entry deleted");
        }
        Ok(removed)
    }

    /// Remove and recreate the whole cache directory
    ///
    /// Not coordinated with per-key locks: concurrent set/get/delete calls may
    /// observe the directory missing or write into it while it is being wiped.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.inner.backend.remove_dir_all(&self.inner.directory).await?;
        self.inner.backend.create_dir_all(&self.inner.directory).await?;
        tracing::info!(directory = %self.inner.directory.display(), "Cache cleared");
        Ok(())
    }

    /// Run one sweep now; None if another sweep is already in progress
    pub async fn delete_expired(&self) -> Option<SweepReport> {
        self.inner.delete_expired().await
    }

    /// Serialize `value` with MessagePack and store it
    pub async fn set_value<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expiry: impl Into<Expiry>,
    ) -> Result<(), CacheError> {
        self.set_value_with(&MessagePackCodec, key, value, expiry)
            .await
    }

    /// Read and deserialize a value stored with [`set_value`](Self::set_value)
    pub async fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        self.get_value_with(&MessagePackCodec, key).await
    }

    pub async fn set_value_with<C: PayloadCodec, T: Serialize>(
        &self,
        codec: &C,
        key: &str,
        value: &T,
        expiry: impl Into<Expiry>,
    ) -> Result<(), CacheError> {
        let payload = codec.encode(value)?;
        self.set(key, payload, expiry).await
    }

    pub async fn get_value_with<C: PayloadCodec, T: DeserializeOwned>(
        &self,
        codec: &C,
        key: &str,
    ) -> Result<T, CacheError> {
        let payload = self.get(key).await?;
        codec.decode(&payload)
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot()
    }

    /// Number of distinct entry files locked so far
    pub fn tracked_locks(&self) -> usize {
        self.inner.locks.len()
    }

    pub fn janitor_running(&self) -> bool {
        self.janitor
            .lock()
            .as_ref()
            .map_or(false, |janitor| janitor.is_running())
    }

    /// Stop the janitor and wait for its loop to exit
    ///
    /// A sweep already in progress finishes on its own. Safe to call more than once.
    pub async fn close(&self) {
        let janitor = self.janitor.lock().take();
        if let Some(janitor) = janitor {
            janitor.stop().await;
        }
    }

    #[cfg(test)]
    pub(super) fn sweep_permit(&self) -> &Semaphore {
        &self.inner.sweep_permit
    }

    #[cfg(test)]
    pub(super) fn locks(&self) -> &KeyLockRegistry {
        &self.inner.locks
    }
}
