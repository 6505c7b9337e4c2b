//! Configuration management for QuickNotify Core

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential vault key material
    pub vault: VaultConfig,
    /// Defaults applied to newly created SMTP profiles
    pub smtp_defaults: SmtpDefaults,
    /// Logging and metrics configuration
    pub telemetry: TelemetryConfig,
}

/// Key material for the credential vault.
///
/// `crypto_key` wins when present; otherwise the key is derived from `secret_key`.
#[derive(Clone)]
pub struct VaultConfig {
    pub crypto_key: Option<String>,
    pub secret_key: Option<String>,
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("crypto_key", &self.crypto_key.as_ref().map(|_| "***"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SmtpDefaults {
    pub timeout_secs: u64,
    pub retry_count: u32,
}

impl Default for SmtpDefaults {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry_count: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "json" or "pretty"
    pub log_format: String,
    pub metrics_enabled: bool,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            service_name: "quicknotify-core".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let crypto_key = env::var("CRYPTO_KEY").ok().filter(|v| !v.trim().is_empty());
        let secret_key = env::var("SECRET_KEY").ok().filter(|v| !v.trim().is_empty());
        if crypto_key.is_none() && secret_key.is_none() {
            anyhow::bail!("SECRET_KEY is required when CRYPTO_KEY is not set");
        }

        Ok(Self {
            vault: VaultConfig {
                crypto_key,
                secret_key,
            },
            smtp_defaults: SmtpDefaults {
                timeout_secs: env::var("SMTP_DEFAULT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("Invalid SMTP_DEFAULT_TIMEOUT_SECS")?,
                retry_count: env::var("SMTP_DEFAULT_RETRY_COUNT")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .context("Invalid SMTP_DEFAULT_RETRY_COUNT")?,
            },
            telemetry: TelemetryConfig {
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
                metrics_enabled: env::var("METRICS_ENABLED")
                    .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                    .unwrap_or(false),
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "quicknotify-core".to_string()),
            },
        })
    }
}
