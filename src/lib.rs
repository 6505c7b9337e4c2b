//! QuickNotify Core - Notification Delivery Engine
//!
//! This crate holds the delivery engine behind QuickNotify: the encrypted
//! SMTP credential vault, template rendering, the lettre-based SMTP transport
//! and the delivery orchestrator that records every send attempt.

pub mod config;
pub mod crypto;
pub mod domain;
pub mod email;
pub mod error;
pub mod repository;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
