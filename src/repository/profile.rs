//! SMTP profile repository

use crate::domain::SmtpProfile;
use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// The stored profile, if one has been saved
    async fn get(&self) -> Result<Option<SmtpProfile>>;

    /// Replace the stored profile
    async fn save(&self, profile: &SmtpProfile) -> Result<()>;
}
