use thiserror::Error;

/// The session vault's error type.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The environment lacks a working cryptographic provider (secure RNG).
    /// Fatal to the store; never retried.
    #[error("Crypto provider unavailable: {0}")]
    CryptoUnavailable(String),

    /// A persisted envelope does not match the `nonce:ciphertext` grammar.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The authentication tag did not verify (tampered data or wrong key).
    #[error("Envelope authentication failed")]
    AuthenticationFailed,

    /// The decrypted payload is not valid JSON for the requested type.
    #[error("Payload deserialization failed: {0}")]
    DeserializationFailed(String),

    /// A value could not be serialized for encryption.
    #[error("Payload serialization failed: {0}")]
    Serialization(String),

    /// The underlying persistence layer is inaccessible.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] std::io::Error),
}

/// A `Result` type that uses `StoreError` as the error type.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Whether this error means the record at rest is unreadable rather
    /// than the environment being broken. Unreadable records are
    /// indistinguishable from "no session" at the store boundary.
    pub(crate) fn is_corruption(&self) -> bool {
        matches!(
            self,
            StoreError::MalformedEnvelope(_)
                | StoreError::AuthenticationFailed
                | StoreError::DeserializationFailed(_)
        )
    }
}
