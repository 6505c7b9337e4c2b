//! SMTP profile service

use crate::config::SmtpDefaults;
use crate::crypto::CredentialVault;
use crate::domain::{validate_addresses, ProfileView, SmtpProfile, UpdateProfileInput};
use crate::error::{AppError, Result};
use crate::repository::ProfileRepository;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

/// Reads and replaces the singleton SMTP profile
pub struct ProfileService<R: ProfileRepository> {
    repo: Arc<R>,
    vault: Arc<CredentialVault>,
    defaults: SmtpDefaults,
}

impl<R: ProfileRepository> ProfileService<R> {
    pub fn new(repo: Arc<R>, vault: Arc<CredentialVault>, defaults: SmtpDefaults) -> Self {
        Self {
            repo,
            vault,
            defaults,
        }
    }

    /// The stored profile with the password masked
    pub async fn get_profile(&self) -> Result<Option<ProfileView>> {
        let profile = self.repo.get().await?;
        Ok(profile.as_ref().map(ProfileView::from))
    }

    /// Validate the input, encrypt the password and replace the stored profile
    pub async fn update_profile(&self, input: UpdateProfileInput) -> Result<ProfileView> {
        input.validate()?;
        validate_addresses("default_recipients", &input.default_recipients)?;

        let encrypted_password = self.vault.encrypt(&input.password).map_err(|e| {
            tracing::error!("Failed to encrypt SMTP password: {}", e);
            AppError::Internal(anyhow::anyhow!("Failed to encrypt SMTP password"))
        })?;

        let profile = SmtpProfile {
            host: input.host.trim().to_string(),
            port: input.port,
            security: input.security,
            sender_email: input.sender_email.trim().to_string(),
            sender_name: input
                .sender_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            encrypted_password: Some(encrypted_password),
            timeout_secs: input.timeout_secs.unwrap_or(self.defaults.timeout_secs),
            retry_count: input.retry_count.unwrap_or(self.defaults.retry_count),
            default_recipients: input
                .default_recipients
                .iter()
                .map(|r| r.trim().to_string())
                .collect(),
            updated_at: Utc::now(),
        };

        self.repo.save(&profile).await?;

        tracing::info!(
            host = %profile.host,
            port = profile.port,
            security = %profile.security,
            sender = %profile.sender_email,
            "SMTP profile updated"
        );

        Ok(ProfileView::from(&profile))
    }
}
