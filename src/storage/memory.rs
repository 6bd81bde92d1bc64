use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::storage::backend::StorageBackend;

/// An in-process backend. Does not survive restarts; the test double
/// for anything that takes a `StorageBackend`.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    records: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryBackend {
    /// Creates a new, empty `MemoryBackend`.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut records = self.records.write().await;
        records.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_cycle() {
        let backend = MemoryBackend::new();

        assert_eq!(backend.get("k").await.unwrap(), None);

        backend.put("k", "v1").await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some("v1".to_string()));

        backend.put("k", "v2").await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some("v2".to_string()));

        backend.delete("k").await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), None);

        // Deleting again is not an error.
        backend.delete("k").await.unwrap();
    }
}
