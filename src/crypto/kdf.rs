use crate::crypto::aes::{SecureKey, KEY_SIZE};

/// The number of PBKDF2 rounds applied to the passphrase.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derives the session encryption key from a passphrase using
/// PBKDF2-HMAC-SHA256.
///
/// Deterministic for a fixed passphrase. The passphrase bytes double as
/// the salt, so records sealed by earlier builds keep decrypting.
/// Changing the salt strategy orphans every envelope at rest.
///
/// Pure and side-effect-free, safe to call concurrently. The iteration
/// cost makes this expensive; `SessionStore` memoizes the result per
/// instance instead of re-deriving on every call.
///
/// # Arguments
///
/// * `passphrase` - The secret the key is derived from.
///
/// # Returns
///
/// A `SecureKey` holding the 256-bit derived key, zeroized on drop.
pub fn derive_key(passphrase: &str) -> SecureKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(
        passphrase.as_bytes(),
        passphrase.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut key,
    );
    SecureKey::new(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_key("correct horse battery staple");
        let b = derive_key("correct horse battery staple");
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn distinct_passphrases_yield_distinct_keys() {
        let a = derive_key("passphrase-one");
        let b = derive_key("passphrase-two");
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn derived_key_is_not_the_passphrase() {
        let key = derive_key("vaultgate-dev-passphrase-change-me");
        assert_ne!(
            &key.as_bytes()[..],
            "vaultgate-dev-passphrase-change-me".as_bytes()
        );
    }
}
