use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::storage::backend::StorageBackend;

/// A durable backend storing one file per key under a directory.
///
/// Survives process restarts; the directory is created on first write.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates a new `FileBackend` rooted at `dir`.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory records are persisted under.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Maps a record key to its on-disk path.
    ///
    /// Keys are plain names; path separators are rejected so a key can
    /// never escape the store directory.
    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
            return Err(StoreError::StorageUnavailable(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid record key: {:?}", key),
            )));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                tracing::error!("❌ Failed to read record {:?}: {}", path, e);
                Err(StoreError::StorageUnavailable(e))
            }
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, value).await?;
        tracing::debug!("💾 Record {} persisted ({} bytes)", key, value.len());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::StorageUnavailable(e)),
        }
    }
}
