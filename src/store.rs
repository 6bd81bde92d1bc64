use std::sync::{Arc, OnceLock};

use serde::{de::DeserializeOwned, Serialize};
use zeroize::Zeroizing;

use crate::config::Config;
use crate::crypto::aes::SecureKey;
use crate::crypto::{envelope, kdf};
use crate::error::Result;
use crate::storage::backend::StorageBackend;
use crate::storage::file::FileBackend;

/// The encrypted persistent key-value store for session records.
///
/// Wraps the envelope codec around a pluggable persistence layer.
/// Every value saved through this store is sealed into an
/// `EncryptedEnvelope` first; plaintext never touches storage.
///
/// Explicitly constructed with a passphrase and a backend, no global
/// state. The encryption key is derived once per instance and reused
/// for every call.
pub struct SessionStore {
    passphrase: Zeroizing<String>,
    key: OnceLock<SecureKey>,
    backend: Arc<dyn StorageBackend>,
}

impl SessionStore {
    /// Creates a new `SessionStore`.
    ///
    /// # Arguments
    ///
    /// * `passphrase` - The secret the encryption key is derived from.
    /// * `backend` - The persistence layer envelopes are written to.
    pub fn new(passphrase: &str, backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.to_string()),
            key: OnceLock::new(),
            backend,
        }
    }

    /// Creates a new `SessionStore` from configuration, wired to the
    /// file backend under the configured directory.
    pub fn open(config: &Config) -> Self {
        let backend = Arc::new(FileBackend::new(config.store_path.clone()));
        Self::new(&config.passphrase, backend)
    }

    /// The derived encryption key, computed on first use.
    fn key(&self) -> &SecureKey {
        self.key.get_or_init(|| kdf::derive_key(&self.passphrase))
    }

    /// Seals `value` into an envelope and persists it under `key`,
    /// overwriting any prior value.
    ///
    /// Propagates every codec and storage error; never retries. Callers
    /// must await completion before navigating into guarded routes,
    /// otherwise a concurrently mounted guard can read a stale absence.
    pub async fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let sealed = envelope::seal(self.key(), value)?;
        self.backend.put(key, &sealed).await?;
        tracing::debug!("🔒 Session record saved under '{}'", key);
        Ok(())
    }

    /// Loads and opens the envelope persisted under `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` when the key was never saved, and also when the
    ///   record at rest is unreadable (malformed envelope, failed
    ///   authentication, bad JSON). A corrupted or tampered record is
    ///   indistinguishable from "no session" at this boundary.
    /// * `Err` only for environment failures (`StorageUnavailable`,
    ///   `CryptoUnavailable`), where there is no safe default.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = match self.backend.get(key).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match envelope::open(self.key(), &raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_corruption() => {
                tracing::warn!("⚠️  Discarding unreadable record under '{}': {}", key, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes the record under `key`. Idempotent.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.backend.delete(key).await?;
        tracing::debug!("🗑️  Session record removed under '{}'", key);
        Ok(())
    }

    /// The persistence layer this store writes to. Side-band consumers
    /// (plaintext preference records) share it under distinct keys.
    pub fn backend(&self) -> Arc<dyn StorageBackend> {
        Arc::clone(&self.backend)
    }
}
