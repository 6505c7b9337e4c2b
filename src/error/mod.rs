//! Unified error handling for QuickNotify Core

use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
///
/// Transport failures are not represented here: they are folded into a
/// [`DeliveryResult`](crate::domain::DeliveryResult) and recorded.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("SMTP configuration not configured yet")]
    ConfigMissing,

    #[error("SMTP configuration is incomplete: {0}")]
    ConfigIncomplete(String),

    #[error("Error decrypting SMTP password")]
    Credential,

    #[error("Delivery record {0} was already sent successfully")]
    AlreadyDelivered(i64),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Delivery record not found: {0}")]
    RecordNotFound(i64),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable code for callers that render errors
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ConfigMissing => "config_missing",
            AppError::ConfigIncomplete(_) => "config_incomplete",
            AppError::Credential => "credential_error",
            AppError::AlreadyDelivered(_) => "already_delivered",
            AppError::TemplateNotFound(_) => "template_not_found",
            AppError::RecordNotFound(_) => "record_not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Validation(_) => "validation",
            AppError::Storage(_) => "storage_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Message safe to show to a caller. Storage and internal details are logged, not returned.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                "A storage error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
