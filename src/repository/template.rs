//! Message template repository

use crate::domain::{MessageTemplate, NewTemplate, TemplateQuery};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, input: &NewTemplate) -> Result<MessageTemplate>;
    async fn find_by_id(&self, id: i64) -> Result<Option<MessageTemplate>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<MessageTemplate>>;
    async fn list(&self, query: &TemplateQuery) -> Result<Vec<MessageTemplate>>;
    async fn count(&self, query: &TemplateQuery) -> Result<i64>;
    async fn update(&self, template: &MessageTemplate) -> Result<MessageTemplate>;
    async fn delete(&self, id: i64) -> Result<()>;

    /// Set the last-used timestamp without touching `updated_at`
    async fn touch_last_used(&self, id: i64, at: DateTime<Utc>) -> Result<()>;
}
