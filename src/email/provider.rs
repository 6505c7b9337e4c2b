//! Mail transport trait and failure classification

use crate::domain::{DeliveryResult, FailureKind, OutgoingMessage, SmtpCredentials};
use async_trait::async_trait;
use thiserror::Error;

/// SMTP reply codes that mean the server rejected our credentials
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// Why an SMTP exchange failed. Never leaves the transport: it is folded into a [`DeliveryResult`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("SMTP authentication failed: {0}")]
    Authentication(String),

    #[error("SMTP connection timed out: {0}")]
    Timeout(String),

    #[error("SMTP protocol error: {0}")]
    Protocol(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

impl TransportError {
    /// Sort a failed exchange into one of the failure classes
    pub fn classify(timed_out: bool, status: Option<&str>, detail: &str) -> Self {
        let lower = detail.to_lowercase();
        if status.is_some_and(|code| AUTH_FAILURE_CODES.contains(&code))
            || lower.contains("authentication")
        {
            return Self::Authentication(detail.to_string());
        }
        if timed_out || lower.contains("timed out") || lower.contains("timeout") {
            return Self::Timeout(detail.to_string());
        }
        Self::Protocol(detail.to_string())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Authentication(_) => FailureKind::Authentication,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Protocol(_) => FailureKind::Protocol,
            Self::InvalidMessage(_) => FailureKind::InvalidMessage,
        }
    }

    pub fn into_result(self, duration_seconds: i64) -> DeliveryResult {
        DeliveryResult::failed(self.kind(), self.to_string(), duration_seconds)
    }
}

/// Something that can open an SMTP session and hand a message to it.
///
/// Implementations keep no state between calls and never return an error:
/// every failure is reported as an unsuccessful [`DeliveryResult`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Connect, negotiate security, authenticate and disconnect without sending
    async fn probe(&self, credentials: &SmtpCredentials) -> DeliveryResult;

    /// Connect, authenticate and transmit one message to every envelope recipient
    async fn deliver(
        &self,
        credentials: &SmtpCredentials,
        message: &OutgoingMessage,
    ) -> DeliveryResult;

    /// Short name used in logs
    fn transport_name(&self) -> &'static str;
}
