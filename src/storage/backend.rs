use async_trait::async_trait;

use crate::error::Result;

/// A pluggable key-value persistence layer for the session vault.
///
/// Calls on distinct keys are independent and may interleave freely.
/// Calls on the same key have no mutual-exclusion guarantee beyond what
/// the backend itself provides; last write wins.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Reads the raw value stored under `key`.
    ///
    /// # Returns
    ///
    /// `None` when the key has never been written or was deleted.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, overwriting any prior value.
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes the entry under `key`. Idempotent; deleting a key that
    /// does not exist is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
