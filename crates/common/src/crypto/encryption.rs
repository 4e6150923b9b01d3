//! AES-256-GCM encryption for small secrets.
//!
//! Payloads are encoded as a single base64 blob of
//! `nonce (12 bytes) || ciphertext || tag (16 bytes)` so they can be stored
//! in one column. Decryption fails closed: a tag mismatch produces
//! [`CommonError::Decryption`], never corrupted plaintext.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CommonError, CommonResult};

/// Length in bytes of the symmetric key.
pub const KEY_LEN: usize = 32;

/// Length in bytes of the AES-GCM nonce.
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM encryption service with a fixed key.
///
/// The key is injected through the constructor so tests can run with fixed
/// keys; it is never read from a hidden global.
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionService").field("key", &"[REDACTED]").finish()
    }
}

impl EncryptionService {
    /// Create a new encryption service from a raw 32-byte key.
    pub fn new(key: &[u8]) -> CommonResult<Self> {
        if key.len() != KEY_LEN {
            return Err(CommonError::InvalidKey(format!(
                "encryption key must be exactly {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| CommonError::InvalidKey(format!("failed to initialize cipher: {e}")))?;

        Ok(Self { cipher })
    }

    /// Create a service from a 64-character hex-encoded key.
    pub fn from_hex_key(hex_key: &str) -> CommonResult<Self> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|e| CommonError::InvalidKey(format!("key is not valid hex: {e}")))?;
        Self::new(&bytes)
    }

    /// Generate a random 32-byte symmetric key.
    #[must_use]
    pub fn generate_key() -> Vec<u8> {
        let mut key = vec![0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt bytes into a base64 `nonce || ciphertext || tag` blob.
    ///
    /// A fresh random nonce is generated for every call.
    pub fn encrypt_to_blob(&self, plaintext: &[u8]) -> CommonResult<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| CommonError::Encryption(e.to_string()))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(payload))
    }

    /// Decrypt a blob produced by [`Self::encrypt_to_blob`].
    ///
    /// Fails with [`CommonError::Decryption`] on malformed payloads and on
    /// tag verification failure.
    pub fn decrypt_blob(&self, blob: &str) -> CommonResult<Vec<u8>> {
        let payload = BASE64
            .decode(blob)
            .map_err(|e| CommonError::Decryption(format!("invalid base64 payload: {e}")))?;

        // Minimum payload: nonce plus the 16-byte GCM tag.
        if payload.len() < NONCE_LEN + 16 {
            return Err(CommonError::Decryption("payload too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = payload.split_at(NONCE_LEN);

        self.cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CommonError::Decryption("authentication tag mismatch".to_string()))
    }

    /// Decrypt a blob into a UTF-8 string.
    pub fn decrypt_blob_to_string(&self, blob: &str) -> CommonResult<String> {
        let bytes = self.decrypt_blob(blob)?;
        String::from_utf8(bytes)
            .map_err(|_| CommonError::Decryption("plaintext is not valid UTF-8".to_string()))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for crypto::encryption.
    use super::*;

    fn service() -> EncryptionService {
        EncryptionService::new(&EncryptionService::generate_key()).unwrap()
    }

    #[test]
    fn generate_key_has_correct_length() {
        assert_eq!(EncryptionService::generate_key().len(), KEY_LEN);
    }

    #[test]
    fn new_service_rejects_invalid_key_size() {
        assert!(EncryptionService::new(&[0u8; 16]).is_err());
    }

    #[test]
    fn from_hex_key_rejects_non_hex() {
        let result = EncryptionService::from_hex_key("not-hex-at-all");
        assert!(matches!(result, Err(CommonError::InvalidKey(_))));
    }

    #[test]
    fn from_hex_key_accepts_64_hex_chars() {
        let hex_key = hex::encode(EncryptionService::generate_key());
        assert!(EncryptionService::from_hex_key(&hex_key).is_ok());
    }

    #[test]
    fn encrypt_and_decrypt_round_trip() {
        let service = service();
        let plaintext = b"hello world";

        let blob = service.encrypt_to_blob(plaintext).unwrap();
        let decrypted = service.decrypt_blob(&blob).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn each_encryption_uses_a_fresh_nonce() {
        let service = service();
        let a = service.encrypt_to_blob(b"same input").unwrap();
        let b = service.encrypt_to_blob(b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn decrypt_with_wrong_key_fails_closed() {
        let blob = service().encrypt_to_blob(b"secret").unwrap();
        let other = service();

        let result = other.decrypt_blob(&blob);
        assert!(matches!(result, Err(CommonError::Decryption(_))));
    }

    #[test]
    fn tampered_ciphertext_fails_closed() {
        let service = service();
        let blob = service.encrypt_to_blob(b"secret").unwrap();

        let mut payload = BASE64.decode(&blob).unwrap();
        let last = payload.len() - 1;
        payload[last] ^= 0x01;
        let tampered = BASE64.encode(payload);

        let result = service.decrypt_blob(&tampered);
        assert!(matches!(result, Err(CommonError::Decryption(_))));
    }

    #[test]
    fn truncated_payload_fails_closed() {
        let result = service().decrypt_blob(&BASE64.encode([0u8; 8]));
        assert!(matches!(result, Err(CommonError::Decryption(_))));
    }

    #[test]
    fn decrypt_to_string_rejects_binary_plaintext() {
        let service = service();
        let blob = service.encrypt_to_blob(&[0xff, 0xfe, 0x80]).unwrap();
        assert!(matches!(service.decrypt_blob_to_string(&blob), Err(CommonError::Decryption(_))));
    }
}
