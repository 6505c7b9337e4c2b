//! Cryptographic utilities for QuickNotify Core

pub mod aes;
pub mod vault;

pub use aes::{decrypt, encrypt, EncryptionError, EncryptionKey};
pub use vault::CredentialVault;
