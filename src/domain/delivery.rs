//! Send requests, outgoing messages and the delivery result envelope

use super::record::{DeliveryRecord, TemplateVariables, TriggerSource};
use super::template::TemplateRef;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidateEmail};

/// Reject any address in `addresses` that is not a plain email address
pub fn validate_addresses(field: &str, addresses: &[String]) -> Result<(), AppError> {
    match addresses
        .iter()
        .find(|a| !a.trim().to_string().validate_email())
    {
        Some(bad) => Err(AppError::Validation(format!(
            "{}: invalid email address '{}'",
            field, bad
        ))),
        None => Ok(()),
    }
}

/// A fully resolved message ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub is_markdown: bool,
}

impl OutgoingMessage {
    /// Every envelope recipient: to, then cc, then bcc
    pub fn envelope_recipients(&self) -> impl Iterator<Item = &String> {
        self.to.iter().chain(self.cc.iter()).chain(self.bcc.iter())
    }

    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

/// Send literal content
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendRequest {
    #[validate(length(min = 1, message = "At least one recipient is required"))]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub is_markdown: bool,
    #[serde(default)]
    pub trigger_source: TriggerSource,
}

/// Send a stored template rendered with the given variables
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TemplateSendRequest {
    pub template: TemplateRef,
    #[serde(default)]
    pub variables: TemplateVariables,
    #[validate(length(min = 1, message = "At least one recipient is required"))]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    #[serde(default)]
    pub bcc: Vec<String>,
    #[serde(default)]
    pub is_markdown: bool,
    #[serde(default)]
    pub trigger_source: TriggerSource,
}

/// Why a transport exchange failed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Authentication,
    Timeout,
    Protocol,
    InvalidMessage,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Timeout => "timeout",
            Self::Protocol => "protocol",
            Self::InvalidMessage => "invalid_message",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform outcome of a probe, send or retry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryResult {
    pub success: bool,
    pub message: String,
    /// Whole seconds spent in the SMTP exchange
    pub duration_seconds: i64,
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl DeliveryResult {
    pub fn delivered(message: impl Into<String>, duration_seconds: i64) -> Self {
        Self {
            success: true,
            message: message.into(),
            duration_seconds,
            sent_at: Some(Utc::now()),
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>, duration_seconds: i64) -> Self {
        Self {
            success: false,
            message: message.into(),
            duration_seconds,
            sent_at: None,
            failure: Some(kind),
        }
    }

    /// Envelope for a request that never reached the transport
    pub fn rejected(error: &AppError) -> Self {
        Self {
            success: false,
            message: error.public_message(),
            duration_seconds: 0,
            sent_at: None,
            failure: None,
        }
    }
}

/// Result of a send or retry together with the persisted record
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub result: DeliveryResult,
    pub record: DeliveryRecord,
}
