//! Credential vault: owns the key and turns stored profiles into usable credentials

use super::aes::{self, EncryptionError, EncryptionKey};
use crate::config::VaultConfig;
use crate::domain::{SmtpCredentials, SmtpProfile};
use anyhow::Context;
use secrecy::Secret;

/// Encrypts SMTP passwords for storage and decrypts them for a single exchange.
///
/// Built once at startup and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CredentialVault {
    key: EncryptionKey,
}

impl CredentialVault {
    pub fn new(key: EncryptionKey) -> Self {
        Self { key }
    }

    /// Explicit `CRYPTO_KEY` first, otherwise SHA-256 of `SECRET_KEY`
    pub fn from_config(config: &VaultConfig) -> anyhow::Result<Self> {
        if let Some(encoded) = &config.crypto_key {
            let key = EncryptionKey::from_base64(encoded).context("Invalid CRYPTO_KEY")?;
            return Ok(Self::new(key));
        }
        let secret = config
            .secret_key
            .as_deref()
            .context("SECRET_KEY is required when CRYPTO_KEY is not set")?;
        Ok(Self::new(EncryptionKey::from_secret(secret)))
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        aes::encrypt(&self.key, plaintext)
    }

    pub fn decrypt(&self, ciphertext: &str) -> Result<String, EncryptionError> {
        aes::decrypt(&self.key, ciphertext)
    }

    /// Decrypted copy of the profile's connection parameters.
    ///
    /// The profile itself is left untouched.
    pub fn unlock(&self, profile: &SmtpProfile) -> Result<SmtpCredentials, EncryptionError> {
        let ciphertext = profile
            .encrypted_password
            .as_deref()
            .ok_or(EncryptionError::InvalidCiphertextFormat)?;
        let password = self.decrypt(ciphertext)?;

        Ok(SmtpCredentials {
            host: profile.host.clone(),
            port: profile.port,
            security: profile.security,
            sender_email: profile.sender_email.clone(),
            sender_name: profile.sender_name.clone(),
            password: Secret::new(password),
            timeout: profile.timeout(),
        })
    }
}
