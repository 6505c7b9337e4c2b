//! Delivery record repository

use crate::domain::{DeliveryRecord, DeliveryRecordQuery, NewDeliveryRecord};
use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryRecordRepository: Send + Sync {
    /// Store a new record and return it with its assigned id
    async fn create(&self, record: &NewDeliveryRecord) -> Result<DeliveryRecord>;

    async fn find_by_id(&self, id: i64) -> Result<Option<DeliveryRecord>>;

    /// Overwrite an existing record in place
    async fn update(&self, record: &DeliveryRecord) -> Result<()>;

    /// Records matching the query, newest first
    async fn find(&self, query: &DeliveryRecordQuery) -> Result<Vec<DeliveryRecord>>;

    async fn count(&self, query: &DeliveryRecordQuery) -> Result<i64>;
}
