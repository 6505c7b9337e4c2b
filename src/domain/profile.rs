//! SMTP profile domain types

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use validator::Validate;

/// How the connection to the SMTP server is secured
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecurityMode {
    /// Plaintext session, AUTH is sent unencrypted. Only for trusted relays.
    None,
    /// Plaintext greeting, then a mandatory STARTTLS upgrade before AUTH
    #[default]
    Starttls,
    /// TLS from the first byte (SMTPS)
    ImplicitTls,
}

impl SecurityMode {
    /// Conventional port for this mode
    pub fn default_port(&self) -> u16 {
        match self {
            Self::None => 25,
            Self::Starttls => 587,
            Self::ImplicitTls => 465,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Starttls => "starttls",
            Self::ImplicitTls => "implicit_tls",
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The stored outbound mail profile. One per deployment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SmtpProfile {
    pub host: String,
    pub port: u16,
    pub security: SecurityMode,
    pub sender_email: String,
    pub sender_name: Option<String>,
    /// Vault ciphertext, never plaintext
    pub encrypted_password: Option<String>,
    pub timeout_secs: u64,
    /// Stored for operators; the engine never retries on its own
    pub retry_count: u32,
    #[serde(default)]
    pub default_recipients: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl SmtpProfile {
    /// Names of required fields that are missing or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.trim().is_empty() {
            missing.push("host");
        }
        if self.port == 0 {
            missing.push("port");
        }
        if self.sender_email.trim().is_empty() {
            missing.push("sender_email");
        }
        if self
            .encrypted_password
            .as_deref()
            .map_or(true, |p| p.trim().is_empty())
        {
            missing.push("password");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Input for replacing the SMTP profile
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 255))]
    pub host: String,

    #[validate(range(min = 1))]
    pub port: u16,

    #[serde(default)]
    pub security: SecurityMode,

    #[validate(email)]
    pub sender_email: String,

    #[validate(length(max = 255))]
    pub sender_name: Option<String>,

    /// Plaintext password; encrypted before it is stored
    #[validate(length(min = 1, max = 1024))]
    pub password: String,

    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: Option<u64>,

    #[validate(range(max = 10))]
    pub retry_count: Option<u32>,

    #[serde(default)]
    pub default_recipients: Vec<String>,
}

/// Profile as shown to callers: the password is reduced to a flag
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProfileView {
    pub host: String,
    pub port: u16,
    pub security: SecurityMode,
    pub sender_email: String,
    pub sender_name: Option<String>,
    pub has_password: bool,
    pub timeout_secs: u64,
    pub retry_count: u32,
    pub default_recipients: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SmtpProfile> for ProfileView {
    fn from(profile: &SmtpProfile) -> Self {
        Self {
            host: profile.host.clone(),
            port: profile.port,
            security: profile.security,
            sender_email: profile.sender_email.clone(),
            sender_name: profile.sender_name.clone(),
            has_password: profile
                .encrypted_password
                .as_deref()
                .is_some_and(|p| !p.is_empty()),
            timeout_secs: profile.timeout_secs,
            retry_count: profile.retry_count,
            default_recipients: profile.default_recipients.clone(),
            updated_at: profile.updated_at,
        }
    }
}

/// Decrypted connection parameters for a single SMTP exchange.
///
/// Built from a profile by the vault and dropped after use.
#[derive(Debug)]
pub struct SmtpCredentials {
    pub host: String,
    pub port: u16,
    pub security: SecurityMode,
    pub sender_email: String,
    pub sender_name: Option<String>,
    pub password: SecretString,
    pub timeout: Duration,
}
