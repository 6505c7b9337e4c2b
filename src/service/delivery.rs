//! Delivery orchestration: profile -> vault -> transport -> delivery record

use crate::crypto::CredentialVault;
use crate::domain::{
    validate_addresses, DeliveryRecord, DeliveryRecordQuery, DeliveryResult, NewDeliveryRecord,
    OutgoingMessage, SendOutcome, SendRequest, SmtpCredentials, SmtpProfile, TemplateSendRequest,
    TemplateVariables, TriggerSource,
};
use crate::email::{MailTransport, TemplateEngine};
use crate::error::{AppError, Result};
use crate::repository::{DeliveryRecordRepository, ProfileRepository, TemplateRepository};
use crate::service::TemplateService;
use crate::telemetry::metrics;
use std::sync::Arc;
use validator::Validate;

fn trimmed(addresses: &[String]) -> Vec<String> {
    addresses.iter().map(|a| a.trim().to_string()).collect()
}

fn validate_recipients(to: &[String], cc: &[String], bcc: &[String]) -> Result<()> {
    validate_addresses("recipients", to)?;
    validate_addresses("cc", cc)?;
    validate_addresses("bcc", bcc)
}

/// Sends messages through the configured SMTP profile and records every attempt.
///
/// Request-level problems (validation, missing profile or template, unreadable
/// credential) are returned as errors and leave no record. Once the transport
/// has been called, the attempt is always recorded, whatever its outcome.
pub struct DeliveryService<P, T, D>
where
    P: ProfileRepository,
    T: TemplateRepository,
    D: DeliveryRecordRepository,
{
    profiles: Arc<P>,
    templates: Arc<TemplateService<T>>,
    records: Arc<D>,
    vault: Arc<CredentialVault>,
    transport: Arc<dyn MailTransport>,
}

impl<P, T, D> DeliveryService<P, T, D>
where
    P: ProfileRepository,
    T: TemplateRepository,
    D: DeliveryRecordRepository,
{
    pub fn new(
        profiles: Arc<P>,
        templates: Arc<TemplateService<T>>,
        records: Arc<D>,
        vault: Arc<CredentialVault>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            profiles,
            templates,
            records,
            vault,
            transport,
        }
    }

    /// Probe the stored profile without sending anything
    pub async fn test_connection(&self) -> Result<DeliveryResult> {
        let profile = self.load_profile().await?;
        self.probe_profile(&profile).await
    }

    /// Probe an arbitrary profile, e.g. one about to be saved
    pub async fn probe_profile(&self, profile: &SmtpProfile) -> Result<DeliveryResult> {
        let credentials = self.unlock(profile)?;
        let result = self.transport.probe(&credentials).await;
        metrics::record_probe(&result);

        if result.success {
            tracing::info!(
                host = %profile.host,
                transport = self.transport.transport_name(),
                "SMTP connection test passed"
            );
        } else {
            tracing::warn!(
                host = %profile.host,
                transport = self.transport.transport_name(),
                error = %result.message,
                "SMTP connection test failed"
            );
        }
        Ok(result)
    }

    /// Send literal content
    pub async fn send(&self, request: SendRequest) -> Result<SendOutcome> {
        request.validate()?;
        validate_recipients(&request.recipients, &request.cc, &request.bcc)?;

        let message = OutgoingMessage {
            to: trimmed(&request.recipients),
            cc: trimmed(&request.cc),
            bcc: trimmed(&request.bcc),
            subject: request.subject,
            body: request.content,
            is_markdown: request.is_markdown,
        };

        self.deliver_new(
            message,
            None,
            TemplateVariables::new(),
            request.trigger_source,
        )
        .await
    }

    /// Render a stored template with the request variables and send it
    pub async fn send_from_template(&self, request: TemplateSendRequest) -> Result<SendOutcome> {
        request.validate()?;
        validate_recipients(&request.recipients, &request.cc, &request.bcc)?;

        let template = self.templates.resolve(&request.template).await?;
        let rendered = TemplateEngine::from_variables(&request.variables)
            .render_message(&template.subject, &template.body);

        let message = OutgoingMessage {
            to: trimmed(&request.recipients),
            cc: trimmed(&request.cc),
            bcc: trimmed(&request.bcc),
            subject: rendered.subject,
            body: rendered.body,
            is_markdown: request.is_markdown,
        };

        let outcome = self
            .deliver_new(
                message,
                Some(template.name.clone()),
                request.variables,
                request.trigger_source,
            )
            .await?;

        if let Err(e) = self.templates.mark_used(template.id).await {
            tracing::warn!(template_id = template.id, error = %e, "Failed to update template last_used");
        }

        Ok(outcome)
    }

    /// Resend a failed record's stored content and update it in place
    pub async fn retry(&self, record_id: i64) -> Result<SendOutcome> {
        let mut record = self
            .records
            .find_by_id(record_id)
            .await?
            .ok_or(AppError::RecordNotFound(record_id))?;

        if record.is_delivered() {
            return Err(AppError::AlreadyDelivered(record_id));
        }

        let profile = self.load_profile().await?;
        let credentials = self.unlock(&profile)?;

        let result = self
            .transport
            .deliver(&credentials, &record.message())
            .await;
        drop(credentials);

        let previous = record.status;
        record.apply_retry(&result);
        metrics::record_retry(&result);
        self.records.update(&record).await?;

        tracing::info!(
            record_id,
            from = %previous,
            to = %record.status,
            attempts = record.attempts,
            "Delivery retried"
        );

        Ok(SendOutcome { result, record })
    }

    pub async fn get_record(&self, record_id: i64) -> Result<DeliveryRecord> {
        self.records
            .find_by_id(record_id)
            .await?
            .ok_or(AppError::RecordNotFound(record_id))
    }

    /// One page of delivery history and the total number matching the query
    pub async fn list_records(
        &self,
        query: &DeliveryRecordQuery,
    ) -> Result<(Vec<DeliveryRecord>, i64)> {
        let records = self.records.find(query).await?;
        let total = self.records.count(query).await?;
        Ok((records, total))
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    async fn load_profile(&self) -> Result<SmtpProfile> {
        self.profiles.get().await?.ok_or(AppError::ConfigMissing)
    }

    fn unlock(&self, profile: &SmtpProfile) -> Result<SmtpCredentials> {
        let missing = profile.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::ConfigIncomplete(missing.join(", ")));
        }

        self.vault.unlock(profile).map_err(|e| {
            tracing::error!(error = %e, "Failed to decrypt SMTP password");
            AppError::Credential
        })
    }

    async fn deliver_new(
        &self,
        message: OutgoingMessage,
        template_name: Option<String>,
        variables: TemplateVariables,
        trigger_source: TriggerSource,
    ) -> Result<SendOutcome> {
        let profile = self.load_profile().await?;
        let credentials = self.unlock(&profile)?;

        let mut pending =
            NewDeliveryRecord::pending(&message, template_name, variables, trigger_source);

        let result = self.transport.deliver(&credentials, &message).await;
        drop(credentials);

        pending.resolve(&result);
        metrics::record_delivery(trigger_source, &result);
        let record = self.records.create(&pending).await?;

        if result.success {
            tracing::info!(
                record_id = record.id,
                recipients = message.recipient_count(),
                template = record.template_name.as_deref().unwrap_or("-"),
                trigger = %trigger_source,
                duration_seconds = result.duration_seconds,
                "Delivery succeeded"
            );
        } else {
            tracing::warn!(
                record_id = record.id,
                template = record.template_name.as_deref().unwrap_or("-"),
                trigger = %trigger_source,
                error = %result.message,
                "Delivery failed"
            );
        }

        Ok(SendOutcome { result, record })
    }
}
