//! Common test utilities
//!
//! In-memory repositories and a scripted transport so the delivery engine can
//! be exercised end to end without a database or an SMTP server.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quicknotify_core::config::SmtpDefaults;
use quicknotify_core::crypto::{CredentialVault, EncryptionKey};
use quicknotify_core::domain::{
    DeliveryRecord, DeliveryRecordQuery, DeliveryResult, MessageTemplate, NewDeliveryRecord,
    NewTemplate, OutgoingMessage, SmtpCredentials, SmtpProfile, TemplateQuery,
};
use quicknotify_core::email::MailTransport;
use quicknotify_core::error::{AppError, Result};
use quicknotify_core::repository::{
    DeliveryRecordRepository, ProfileRepository, TemplateRepository,
};
use quicknotify_core::service::{DeliveryService, ProfileService, TemplateService};
use secrecy::ExposeSecret;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================================================
// Profile
// ============================================================================

pub struct TestProfileRepository {
    profile: RwLock<Option<SmtpProfile>>,
}

impl TestProfileRepository {
    pub fn new() -> Self {
        Self {
            profile: RwLock::new(None),
        }
    }

    pub async fn stored(&self) -> Option<SmtpProfile> {
        self.profile.read().await.clone()
    }
}

impl Default for TestProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileRepository for TestProfileRepository {
    async fn get(&self) -> Result<Option<SmtpProfile>> {
        Ok(self.profile.read().await.clone())
    }

    async fn save(&self, profile: &SmtpProfile) -> Result<()> {
        *self.profile.write().await = Some(profile.clone());
        Ok(())
    }
}

// ============================================================================
// Templates
// ============================================================================

pub struct TestTemplateRepository {
    templates: RwLock<Vec<MessageTemplate>>,
    next_id: RwLock<i64>,
}

impl TestTemplateRepository {
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(vec![]),
            next_id: RwLock::new(1),
        }
    }

    pub async fn get(&self, id: i64) -> Option<MessageTemplate> {
        self.templates
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }
}

impl Default for TestTemplateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateRepository for TestTemplateRepository {
    async fn create(&self, input: &NewTemplate) -> Result<MessageTemplate> {
        let mut next_id = self.next_id.write().await;
        let now = Utc::now();
        let template = MessageTemplate {
            id: *next_id,
            name: input.name.clone(),
            subject: input.subject.clone(),
            body: input.body.clone(),
            variables: input.variables.clone(),
            created_at: now,
            updated_at: now,
            last_used_at: None,
        };
        *next_id += 1;
        self.templates.write().await.push(template.clone());
        Ok(template)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<MessageTemplate>> {
        Ok(self.get(id).await)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<MessageTemplate>> {
        let templates = self.templates.read().await;
        Ok(templates.iter().find(|t| t.name == name).cloned())
    }

    async fn list(&self, query: &TemplateQuery) -> Result<Vec<MessageTemplate>> {
        let templates = self.templates.read().await;
        Ok(templates
            .iter()
            .filter(|t| query.matches(t))
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, query: &TemplateQuery) -> Result<i64> {
        let templates = self.templates.read().await;
        Ok(templates.iter().filter(|t| query.matches(t)).count() as i64)
    }

    async fn update(&self, template: &MessageTemplate) -> Result<MessageTemplate> {
        let mut templates = self.templates.write().await;
        let slot = templates
            .iter_mut()
            .find(|t| t.id == template.id)
            .ok_or_else(|| AppError::TemplateNotFound(format!("#{}", template.id)))?;
        *slot = template.clone();
        Ok(template.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.templates.write().await.retain(|t| t.id != id);
        Ok(())
    }

    async fn touch_last_used(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        let mut templates = self.templates.write().await;
        if let Some(template) = templates.iter_mut().find(|t| t.id == id) {
            template.last_used_at = Some(at);
        }
        Ok(())
    }
}

// ============================================================================
// Delivery records
// ============================================================================

pub struct TestDeliveryRecordRepository {
    records: RwLock<Vec<DeliveryRecord>>,
}

impl TestDeliveryRecordRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(vec![]),
        }
    }

    pub async fn all(&self) -> Vec<DeliveryRecord> {
        self.records.read().await.clone()
    }
}

impl Default for TestDeliveryRecordRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeliveryRecordRepository for TestDeliveryRecordRepository {
    async fn create(&self, record: &NewDeliveryRecord) -> Result<DeliveryRecord> {
        let mut records = self.records.write().await;
        let stored = DeliveryRecord::from_new(records.len() as i64 + 1, record);
        records.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<DeliveryRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn update(&self, record: &DeliveryRecord) -> Result<()> {
        let mut records = self.records.write().await;
        let slot = records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or(AppError::RecordNotFound(record.id))?;
        *slot = record.clone();
        Ok(())
    }

    async fn find(&self, query: &DeliveryRecordQuery) -> Result<Vec<DeliveryRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| query.matches(r))
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, query: &DeliveryRecordQuery) -> Result<i64> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| query.matches(r)).count() as i64)
    }
}

// ============================================================================
// Transport
// ============================================================================

/// What the transport saw on one call
#[derive(Debug, Clone)]
pub struct TransportCall {
    pub host: String,
    pub password: String,
    pub message: Option<OutgoingMessage>,
}

/// Replays queued results in order; succeeds once the queue is empty
pub struct ScriptedTransport {
    results: RwLock<VecDeque<DeliveryResult>>,
    calls: RwLock<Vec<TransportCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            results: RwLock::new(VecDeque::new()),
            calls: RwLock::new(vec![]),
        }
    }

    pub async fn push_result(&self, result: DeliveryResult) {
        self.results.write().await.push_back(result);
    }

    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.read().await.clone()
    }

    async fn next_result(&self, fallback: DeliveryResult) -> DeliveryResult {
        self.results.write().await.pop_front().unwrap_or(fallback)
    }

    async fn log(&self, credentials: &SmtpCredentials, message: Option<&OutgoingMessage>) {
        self.calls.write().await.push(TransportCall {
            host: credentials.host.clone(),
            password: credentials.password.expose_secret().clone(),
            message: message.cloned(),
        });
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for ScriptedTransport {
    async fn probe(&self, credentials: &SmtpCredentials) -> DeliveryResult {
        self.log(credentials, None).await;
        self.next_result(DeliveryResult::delivered("SMTP connection successful", 0))
            .await
    }

    async fn deliver(
        &self,
        credentials: &SmtpCredentials,
        message: &OutgoingMessage,
    ) -> DeliveryResult {
        self.log(credentials, Some(message)).await;
        let fallback = DeliveryResult::delivered(
            format!("Email sent to {} recipient(s)", message.recipient_count()),
            0,
        );
        self.next_result(fallback).await
    }

    fn transport_name(&self) -> &'static str {
        "scripted"
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub type TestDeliveryService =
    DeliveryService<TestProfileRepository, TestTemplateRepository, TestDeliveryRecordRepository>;

/// Everything a test needs, sharing one set of in-memory stores
pub struct TestEngine {
    pub profiles: Arc<TestProfileRepository>,
    pub templates: Arc<TestTemplateRepository>,
    pub records: Arc<TestDeliveryRecordRepository>,
    pub transport: Arc<ScriptedTransport>,
    pub vault: Arc<CredentialVault>,
    pub profile_service: ProfileService<TestProfileRepository>,
    pub template_service: Arc<TemplateService<TestTemplateRepository>>,
    pub delivery_service: TestDeliveryService,
}

impl TestEngine {
    pub fn new() -> Self {
        let profiles = Arc::new(TestProfileRepository::new());
        let templates = Arc::new(TestTemplateRepository::new());
        let records = Arc::new(TestDeliveryRecordRepository::new());
        let transport = Arc::new(ScriptedTransport::new());
        let vault = Arc::new(CredentialVault::new(EncryptionKey::from_secret(
            "integration-secret",
        )));

        let profile_service =
            ProfileService::new(profiles.clone(), vault.clone(), SmtpDefaults::default());
        let template_service = Arc::new(TemplateService::new(templates.clone()));
        let delivery_service = DeliveryService::new(
            profiles.clone(),
            template_service.clone(),
            records.clone(),
            vault.clone(),
            transport.clone(),
        );

        Self {
            profiles,
            templates,
            records,
            transport,
            vault,
            profile_service,
            template_service,
            delivery_service,
        }
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}
