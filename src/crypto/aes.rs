//! AES-256-GCM encryption for SMTP credentials at rest
//!
//! Ciphertext is stored as `base64(nonce):base64(ciphertext || tag)` with a
//! fresh 96-bit nonce per call, so encrypting the same password twice yields
//! different output.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE as BASE64_URL},
    Engine,
};
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;

const NONCE_LEN: usize = 12;

/// Encryption key for AES-256-GCM
#[derive(Clone)]
pub struct EncryptionKey {
    key: [u8; 32],
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(***)")
    }
}

/// Encryption error types
#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("Invalid key: must be exactly 32 bytes (256 bits)")]
    InvalidKeyLength,

    #[error("Invalid base64 encoding: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed: invalid ciphertext or wrong key")]
    DecryptionFailed,

    #[error("Invalid ciphertext format")]
    InvalidCiphertextFormat,
}

impl EncryptionKey {
    /// Create a new encryption key from a 32-byte array
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Create encryption key from a base64-encoded string (standard or URL-safe alphabet)
    pub fn from_base64(encoded: &str) -> Result<Self, EncryptionError> {
        let encoded = encoded.trim();
        let bytes = BASE64
            .decode(encoded)
            .or_else(|_| BASE64_URL.decode(encoded))?;
        if bytes.len() != 32 {
            return Err(EncryptionError::InvalidKeyLength);
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }

    /// Derive a key as SHA-256 of an application secret.
    ///
    /// The same secret always yields the same key, so ciphertexts survive restarts.
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self { key }
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

/// Encrypt plaintext using AES-256-GCM
pub fn encrypt(key: &EncryptionKey, plaintext: &str) -> Result<String, EncryptionError> {
    let cipher =
        Aes256Gcm::new_from_slice(&key.key).map_err(|_| EncryptionError::EncryptionFailed)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| EncryptionError::EncryptionFailed)?;

    Ok(format!(
        "{}:{}",
        BASE64.encode(nonce_bytes),
        BASE64.encode(&ciphertext)
    ))
}

/// Decrypt ciphertext that was encrypted with [encrypt]
pub fn decrypt(key: &EncryptionKey, encrypted: &str) -> Result<String, EncryptionError> {
    let (nonce_b64, ciphertext_b64) = encrypted
        .trim()
        .split_once(':')
        .ok_or(EncryptionError::InvalidCiphertextFormat)?;
    if ciphertext_b64.contains(':') {
        return Err(EncryptionError::InvalidCiphertextFormat);
    }

    let nonce_bytes = BASE64.decode(nonce_b64)?;
    if nonce_bytes.len() != NONCE_LEN {
        return Err(EncryptionError::InvalidCiphertextFormat);
    }

    let ciphertext = BASE64.decode(ciphertext_b64)?;

    let cipher =
        Aes256Gcm::new_from_slice(&key.key).map_err(|_| EncryptionError::DecryptionFailed)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
        .map_err(|_| EncryptionError::DecryptionFailed)?;

    String::from_utf8(plaintext).map_err(|_| EncryptionError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> EncryptionKey {
        EncryptionKey::new([
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b,
            0x1c, 0x1d, 0x1e, 0x1f,
        ])
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let encrypted = encrypt(&key, "app-password-123").unwrap();
        assert_eq!(decrypt(&key, &encrypted).unwrap(), "app-password-123");
    }

    #[test]
    fn test_encrypt_is_not_deterministic() {
        let key = test_key();
        let first = encrypt(&key, "same-password").unwrap();
        let second = encrypt(&key, "same-password").unwrap();
        assert_ne!(first, second);
        assert_eq!(decrypt(&key, &first).unwrap(), decrypt(&key, &second).unwrap());
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let encrypted = encrypt(&test_key(), "secret").unwrap();
        let other = EncryptionKey::from_secret("another-deployment");
        assert!(matches!(
            decrypt(&other, &encrypted),
            Err(EncryptionError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_decrypt_tampered_ciphertext_fails() {
        let key = test_key();
        let encrypted = encrypt(&key, "secret").unwrap();
        let (nonce, ciphertext) = encrypted.split_once(':').unwrap();
        let mut bytes = BASE64.decode(ciphertext).unwrap();
        bytes[0] ^= 0xff;
        let tampered = format!("{}:{}", nonce, BASE64.encode(bytes));
        assert!(matches!(
            decrypt(&key, &tampered),
            Err(EncryptionError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_decrypt_malformed_input() {
        let key = test_key();
        assert!(matches!(
            decrypt(&key, "no-separator"),
            Err(EncryptionError::InvalidCiphertextFormat)
        ));
        assert!(matches!(
            decrypt(&key, "a:b:c"),
            Err(EncryptionError::InvalidCiphertextFormat)
        ));
        assert!(matches!(
            decrypt(&key, "!!!:???"),
            Err(EncryptionError::Base64Error(_))
        ));
        // Valid base64 but a 3-byte nonce
        assert!(matches!(
            decrypt(&key, "YWJj:YWJj"),
            Err(EncryptionError::InvalidCiphertextFormat)
        ));
    }

    #[test]
    fn test_decrypt_truncated_ciphertext_fails() {
        let key = test_key();
        let encrypted = encrypt(&key, "secret").unwrap();
        let (nonce, _) = encrypted.split_once(':').unwrap();
        let truncated = format!("{}:{}", nonce, BASE64.encode([1u8, 2, 3]));
        assert!(decrypt(&key, &truncated).is_err());
    }

    #[test]
    fn test_empty_and_unicode_plaintext() {
        let key = test_key();
        for plaintext in ["", "pässwörd-密码-🔑"] {
            let encrypted = encrypt(&key, plaintext).unwrap();
            assert_eq!(decrypt(&key, &encrypted).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_key_from_base64() {
        let encoded = BASE64.encode([7u8; 32]);
        let key = EncryptionKey::from_base64(&encoded).unwrap();
        assert_eq!(key.as_bytes(), &[7u8; 32]);

        let url_safe = BASE64_URL.encode([0xfbu8; 32]);
        let key = EncryptionKey::from_base64(&url_safe).unwrap();
        assert_eq!(key.as_bytes(), &[0xfbu8; 32]);
    }

    #[test]
    fn test_key_from_base64_wrong_length() {
        let encoded = BASE64.encode([7u8; 16]);
        assert!(matches!(
            EncryptionKey::from_base64(&encoded),
            Err(EncryptionError::InvalidKeyLength)
        ));
    }

    #[test]
    fn test_key_from_secret_is_stable() {
        let a = EncryptionKey::from_secret("quicknotify-secret");
        let b = EncryptionKey::from_secret("quicknotify-secret");
        let c = EncryptionKey::from_secret("other-secret");
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), c.as_bytes());

        let encrypted = encrypt(&a, "password").unwrap();
        assert_eq!(decrypt(&b, &encrypted).unwrap(), "password");
    }

    #[test]
    fn test_key_debug_is_redacted() {
        assert_eq!(format!("{:?}", test_key()), "EncryptionKey(***)");
    }
}
