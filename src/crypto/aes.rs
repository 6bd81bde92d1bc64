use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use aes_gcm::aead::rand_core::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};
use crate::error::{Result, StoreError};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// A secure key wrapper that ensures the key is zeroized on drop.
///
/// Constructed only by key derivation; the raw bytes never leave the
/// crypto layer.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecureKey([u8; KEY_SIZE]);

impl SecureKey {
    /// Creates a new `SecureKey` from a byte array.
    ///
    /// # Arguments
    ///
    /// * `key` - A 32-byte array representing the AES-256 key.
    pub(crate) fn new(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    /// Returns a reference to the key as a byte slice.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Generates a new random AES-GCM nonce.
///
/// A fresh draw on every call; the nonce is never reused for the same
/// key within the store's write volume.
///
/// # Returns
///
/// A `Result` containing the 12-byte nonce, or `CryptoUnavailable` when
/// the OS entropy source cannot be read.
pub fn generate_nonce() -> Result<[u8; NONCE_SIZE]> {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| StoreError::CryptoUnavailable(format!("Secure RNG unavailable: {}", e)))?;
    Ok(nonce)
}

/// Encrypts a plaintext using AES-256-GCM.
///
/// # Arguments
///
/// * `key` - The derived session key.
/// * `plaintext` - The data to encrypt.
///
/// # Returns
///
/// A tuple containing the ciphertext (authentication tag appended) and
/// the nonce used for encryption.
pub fn encrypt(key: &SecureKey, plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_SIZE])> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let nonce_bytes = generate_nonce()?;
    let nonce = Nonce::from(nonce_bytes);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| StoreError::CryptoUnavailable(format!("Encryption failed: {}", e)))?;

    Ok((ciphertext, nonce_bytes))
}

/// Decrypts a ciphertext using AES-256-GCM.
///
/// Fails with `AuthenticationFailed` when the tag does not verify; no
/// partial plaintext is ever returned.
///
/// # Arguments
///
/// * `key` - The derived session key.
/// * `ciphertext` - The data to decrypt, tag appended.
/// * `nonce` - The nonce used for encryption.
///
/// # Returns
///
/// The decrypted plaintext.
pub fn decrypt(key: &SecureKey, ciphertext: &[u8], nonce: &[u8; NONCE_SIZE]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let nonce = Nonce::from(*nonce);

    cipher
        .decrypt(&nonce, ciphertext)
        .map_err(|_| StoreError::AuthenticationFailed)
}
