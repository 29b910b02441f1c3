//! Tokio-based filesystem backend

use super::backend::DiskBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Portable filesystem backend using tokio::fs
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioFsBackend;

impl TokioFsBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DiskBackend for TokioFsBackend {
    async fn read_file(&self, path: &Path) -> std::io::Result<Bytes> {
        let data = tokio::fs::read(path).await?;
        Ok(Bytes::from(data))
    }

    async fn read_head(&self, path: &Path, limit: usize) -> std::io::Result<Bytes> {
        let file = tokio::fs::File::open(path).await?;
        let mut data = Vec::with_capacity(limit.min(8 * 1024));
        file.take(limit as u64).read_to_end(&mut data).await?;
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(path).await?;
        file.write_all(&data).await?;
        // tokio::fs::File buffers in a blocking task; flush before the lock is released
        file.flush().await?;
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> std::io::Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> std::io::Result<()> {
        match tokio::fs::remove_dir_all(path).await {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    async fn list_files(&self, dir: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(extension) {
                files.push(path);
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_truncates_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entry.cache");
        let backend = TokioFsBackend::new();

        backend
            .write_file(&path, Bytes::from_static(b"a much longer first value"))
            .await
            .unwrap();
        backend
            .write_file(&path, Bytes::from_static(b"short"))
            .await
            .unwrap();

        assert_eq!(backend.read_file(&path).await.unwrap(), "short");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let backend = TokioFsBackend::new();
        let err = backend
            .read_file(&temp_dir.path().join("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_read_head_stops_at_limit() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entry.cache");
        let backend = TokioFsBackend::new();
        backend
            .write_file(&path, Bytes::from_static(b"1700000000
rest of the payload"))
            .await
            .unwrap();

        assert_eq!(backend.read_head(&path, 11).await.unwrap(), "1700000000\n");
        assert_eq!(
            backend.read_head(&path, 4096).await.unwrap(),
            "1700000000\nrest of the payload"
        );
    }

    #[tokio::test]
    async fn test_read_head_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let backend = TokioFsBackend::new();
        let err = backend
            .read_head(&temp_dir.path().join("missing"), 64)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_file_existed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entry.cache");
        let backend = TokioFsBackend::new();

        backend.write_file(&path, Bytes::from_static(b"x")).await.unwrap();
        assert!(backend.delete_file(&path).await.unwrap());
        assert!(!backend.delete_file(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_files_filters_by_extension_and_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let backend = TokioFsBackend::new();

        backend.write_file(&dir.join("a.cache"), Bytes::new()).await.unwrap();
        backend.write_file(&dir.join("b.cache"), Bytes::new()).await.unwrap();
        backend.write_file(&dir.join("c.gzip"), Bytes::new()).await.unwrap();
        backend.write_file(&dir.join("notes.txt"), Bytes::new()).await.unwrap();
        backend.create_dir_all(&dir.join("sub.cache")).await.unwrap();

        let mut files = backend.list_files(dir, "cache").await.unwrap();
        files.sort();
        assert_eq!(files, vec![dir.join("a.cache"), dir.join("b.cache")]);
    }

    #[tokio::test]
    async fn test_remove_dir_all_tolerates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let backend = TokioFsBackend::new();
        assert!(backend
            .remove_dir_all(&temp_dir.path().join("never-created"))
            .await
            .is_ok());
    }
}
