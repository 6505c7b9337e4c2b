//! Outbound email: transport, templates and Markdown rendering
//!
//! - SMTP transport over plaintext, STARTTLS or implicit TLS (using lettre)
//! - `{{variable}}` template substitution
//! - Markdown bodies sent as multipart/alternative with an HTML part

pub mod markdown;
pub mod provider;
pub mod smtp;
pub mod templates;

pub use provider::{MailTransport, TransportError};
pub use smtp::SmtpMailTransport;
pub use templates::{extract_variables, template_variables, TemplateEngine};
