use base64::{engine::general_purpose, Engine as _};
use serde::{de::DeserializeOwned, Serialize};

use crate::crypto::aes::{self, SecureKey, NONCE_SIZE};
use crate::error::{Result, StoreError};

/// Separator between the encoded nonce and the encoded ciphertext.
const SEPARATOR: char = ':';

/// Seals a serializable value into a textual envelope.
///
/// The envelope grammar is `base64(nonce) ":" base64(ciphertext || tag)`
/// with the standard alphabet and padding. A fresh random nonce is drawn
/// on every call, so sealing the same value twice yields different
/// envelopes.
///
/// # Arguments
///
/// * `key` - The derived session key.
/// * `value` - The value to serialize and encrypt.
///
/// # Returns
///
/// The envelope string, the only form the value ever takes at rest.
pub fn seal<T: Serialize>(key: &SecureKey, value: &T) -> Result<String> {
    let plaintext = sonic_rs::to_string(value)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    let (ciphertext, nonce) = aes::encrypt(key, plaintext.as_bytes())?;

    Ok(format!(
        "{}{}{}",
        general_purpose::STANDARD.encode(nonce),
        SEPARATOR,
        general_purpose::STANDARD.encode(ciphertext)
    ))
}

/// Opens a textual envelope back into a value.
///
/// # Arguments
///
/// * `key` - The derived session key.
/// * `envelope` - The `nonce:ciphertext` string read from storage.
///
/// # Returns
///
/// The decrypted value, or:
///
/// * `MalformedEnvelope` when the separator is missing, either half is
///   not valid base64, or the nonce does not decode to 12 bytes.
/// * `AuthenticationFailed` when the tag does not verify (tampered or
///   corrupted data, or a key derived from a different passphrase).
/// * `DeserializationFailed` when the recovered plaintext is not valid
///   JSON for the requested type.
pub fn open<T: DeserializeOwned>(key: &SecureKey, envelope: &str) -> Result<T> {
    let (nonce_b64, ciphertext_b64) = envelope
        .split_once(SEPARATOR)
        .ok_or_else(|| StoreError::MalformedEnvelope("Missing separator".to_string()))?;

    let nonce_bytes = general_purpose::STANDARD
        .decode(nonce_b64)
        .map_err(|e| StoreError::MalformedEnvelope(format!("Invalid nonce encoding: {}", e)))?;

    let nonce: [u8; NONCE_SIZE] = nonce_bytes
        .try_into()
        .map_err(|_| StoreError::MalformedEnvelope("Nonce is not 12 bytes".to_string()))?;

    let ciphertext = general_purpose::STANDARD
        .decode(ciphertext_b64)
        .map_err(|e| StoreError::MalformedEnvelope(format!("Invalid ciphertext encoding: {}", e)))?;

    let plaintext = aes::decrypt(key, &ciphertext, &nonce)?;

    sonic_rs::from_slice(&plaintext)
        .map_err(|e| StoreError::DeserializationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf;
    use crate::models::user::User;

    fn test_key() -> SecureKey {
        kdf::derive_key("envelope-test-passphrase")
    }

    fn sample_user() -> User {
        User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            phone_number: "+15550001111".to_string(),
            role: 2,
        }
    }

    #[test]
    fn seal_then_open_round_trips() {
        let key = test_key();
        let user = sample_user();

        let envelope = seal(&key, &user).unwrap();
        let recovered: User = open(&key, &envelope).unwrap();

        assert_eq!(recovered, user);
    }

    #[test]
    fn sealing_twice_yields_distinct_envelopes() {
        let key = test_key();
        let user = sample_user();

        let first = seal(&key, &user).unwrap();
        let second = seal(&key, &user).unwrap();

        assert_ne!(first, second);

        let (first_nonce, first_ct) = first.split_once(':').unwrap();
        let (second_nonce, second_ct) = second.split_once(':').unwrap();
        assert_ne!(first_nonce, second_nonce);
        assert_ne!(first_ct, second_ct);
    }

    #[test]
    fn envelope_grammar_holds() {
        let key = test_key();
        let envelope = seal(&key, &sample_user()).unwrap();

        let (nonce_b64, ciphertext_b64) = envelope.split_once(':').unwrap();
        let nonce = general_purpose::STANDARD.decode(nonce_b64).unwrap();
        assert_eq!(nonce.len(), NONCE_SIZE);
        assert!(general_purpose::STANDARD.decode(ciphertext_b64).is_ok());
    }

    #[test]
    fn flipping_any_ciphertext_byte_fails_authentication() {
        let key = test_key();
        let envelope = seal(&key, &sample_user()).unwrap();
        let (nonce_b64, ciphertext_b64) = envelope.split_once(':').unwrap();
        let ciphertext = general_purpose::STANDARD.decode(ciphertext_b64).unwrap();

        for position in 0..ciphertext.len() {
            let mut tampered = ciphertext.clone();
            tampered[position] ^= 0x01;
            let tampered_envelope = format!(
                "{}:{}",
                nonce_b64,
                general_purpose::STANDARD.encode(&tampered)
            );

            let result = open::<User>(&key, &tampered_envelope);
            assert!(
                matches!(result, Err(StoreError::AuthenticationFailed)),
                "byte {} flip was not caught",
                position
            );
        }
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let envelope = seal(&test_key(), &sample_user()).unwrap();
        let other_key = kdf::derive_key("a-different-passphrase");

        let result = open::<User>(&other_key, &envelope);
        assert!(matches!(result, Err(StoreError::AuthenticationFailed)));
    }

    #[test]
    fn missing_separator_is_malformed() {
        let result = open::<User>(&test_key(), "bm9zZXBhcmF0b3I=");
        assert!(matches!(result, Err(StoreError::MalformedEnvelope(_))));
    }

    #[test]
    fn invalid_base64_is_malformed() {
        let result = open::<User>(&test_key(), "not base64!:also not base64!");
        assert!(matches!(result, Err(StoreError::MalformedEnvelope(_))));
    }

    #[test]
    fn short_nonce_is_malformed() {
        let key = test_key();
        let envelope = seal(&key, &sample_user()).unwrap();
        let (_, ciphertext_b64) = envelope.split_once(':').unwrap();

        // 8-byte nonce instead of 12
        let short_nonce = general_purpose::STANDARD.encode([0u8; 8]);
        let result = open::<User>(&key, &format!("{}:{}", short_nonce, ciphertext_b64));
        assert!(matches!(result, Err(StoreError::MalformedEnvelope(_))));
    }

    #[test]
    fn valid_ciphertext_with_wrong_shape_fails_deserialization() {
        let key = test_key();
        // Seal a plain string, then try to open it as a User.
        let envelope = seal(&key, &"just a string".to_string()).unwrap();

        let result = open::<User>(&key, &envelope);
        assert!(matches!(result, Err(StoreError::DeserializationFailed(_))));
    }
}
