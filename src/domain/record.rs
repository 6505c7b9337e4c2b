//! Delivery record domain types

use super::delivery::{DeliveryResult, OutgoingMessage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Values applied to template placeholders, keyed by variable name
pub type TemplateVariables = BTreeMap<String, serde_json::Value>;

/// Lifecycle status of a delivery record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a send request came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSource {
    #[default]
    Web,
    Cli,
    Api,
}

impl TriggerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Cli => "cli",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status, error and sent timestamp derived from a transport result.
/// `error` is set only on failure, `sent_at` only on success.
fn resolved_fields(
    result: &DeliveryResult,
) -> (DeliveryStatus, Option<String>, Option<DateTime<Utc>>) {
    if result.success {
        (
            DeliveryStatus::Success,
            None,
            Some(result.sent_at.unwrap_or_else(Utc::now)),
        )
    } else {
        (DeliveryStatus::Failed, Some(result.message.clone()), None)
    }
}

/// A record that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewDeliveryRecord {
    pub template_name: Option<String>,
    pub recipients: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub content: String,
    pub is_markdown: bool,
    pub trigger_source: TriggerSource,
    pub variables: TemplateVariables,
    pub status: DeliveryStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
}

impl NewDeliveryRecord {
    /// Pending record for the given message
    pub fn pending(
        message: &OutgoingMessage,
        template_name: Option<String>,
        variables: TemplateVariables,
        trigger_source: TriggerSource,
    ) -> Self {
        Self {
            template_name,
            recipients: message.to.clone(),
            cc: message.cc.clone(),
            bcc: message.bcc.clone(),
            subject: message.subject.clone(),
            content: message.body.clone(),
            is_markdown: message.is_markdown,
            trigger_source,
            variables,
            status: DeliveryStatus::Pending,
            error: None,
            created_at: Utc::now(),
            sent_at: None,
            duration_seconds: 0,
        }
    }

    /// Move out of pending according to the transport result
    pub fn resolve(&mut self, result: &DeliveryResult) {
        let (status, error, sent_at) = resolved_fields(result);
        self.status = status;
        self.error = error;
        self.sent_at = sent_at;
        self.duration_seconds = result.duration_seconds;
    }
}

/// A stored record of one delivery and its retries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryRecord {
    pub id: i64,
    pub template_name: Option<String>,
    pub recipients: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub content: String,
    pub is_markdown: bool,
    pub trigger_source: TriggerSource,
    pub variables: TemplateVariables,
    pub status: DeliveryStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
    /// 1 for the original send, incremented by each retry
    pub attempts: u32,
}

impl DeliveryRecord {
    /// Build the stored form of a new record
    pub fn from_new(id: i64, new: &NewDeliveryRecord) -> Self {
        Self {
            id,
            template_name: new.template_name.clone(),
            recipients: new.recipients.clone(),
            cc: new.cc.clone(),
            bcc: new.bcc.clone(),
            subject: new.subject.clone(),
            content: new.content.clone(),
            is_markdown: new.is_markdown,
            trigger_source: new.trigger_source,
            variables: new.variables.clone(),
            status: new.status,
            error: new.error.clone(),
            created_at: new.created_at,
            sent_at: new.sent_at,
            duration_seconds: new.duration_seconds,
            attempts: 1,
        }
    }

    /// The stored message, exactly as it was first sent
    pub fn message(&self) -> OutgoingMessage {
        OutgoingMessage {
            to: self.recipients.clone(),
            cc: self.cc.clone(),
            bcc: self.bcc.clone(),
            subject: self.subject.clone(),
            body: self.content.clone(),
            is_markdown: self.is_markdown,
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.status == DeliveryStatus::Success
    }

    /// Apply the result of a retry attempt
    pub fn apply_retry(&mut self, result: &DeliveryResult) {
        let (status, error, sent_at) = resolved_fields(result);
        self.status = status;
        self.error = error;
        self.sent_at = sent_at;
        self.duration_seconds = result.duration_seconds;
        self.attempts += 1;
    }
}

/// Filter for listing delivery records
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecordQuery {
    pub status: Option<DeliveryStatus>,
    pub template_name: Option<String>,
    pub trigger_source: Option<TriggerSource>,
    /// Matches any of to, cc or bcc
    pub recipient: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for DeliveryRecordQuery {
    fn default() -> Self {
        Self {
            status: None,
            template_name: None,
            trigger_source: None,
            recipient: None,
            created_after: None,
            created_before: None,
            offset: 0,
            limit: 50,
        }
    }
}

impl DeliveryRecordQuery {
    pub fn matches(&self, record: &DeliveryRecord) -> bool {
        if self.status.is_some_and(|s| s != record.status) {
            return false;
        }
        if self.trigger_source.is_some_and(|t| t != record.trigger_source) {
            return false;
        }
        if let Some(name) = &self.template_name {
            if record.template_name.as_deref() != Some(name.as_str()) {
                return false;
            }
        }
        if let Some(address) = &self.recipient {
            let found = record
                .recipients
                .iter()
                .chain(record.cc.iter())
                .chain(record.bcc.iter())
                .any(|r| r.eq_ignore_ascii_case(address));
            if !found {
                return false;
            }
        }
        if self.created_after.is_some_and(|t| record.created_at < t) {
            return false;
        }
        if self.created_before.is_some_and(|t| record.created_at >= t) {
            return false;
        }
        true
    }
}
